use foundation::math::{GeoAnchor, GeoCoordinateError, MapProjection, Vec3};
use gpu::TransformDescriptor;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-model orientation and unit calibration.
///
/// Neither value is derived from geometry: they are measured once for a given
/// model file and supplied as configuration.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCalibration {
    /// Radians about X, Y, Z (applied in that order).
    pub rotation: Vec3,
    /// Model units per meter multiplier.
    pub scale_constant: f64,
}

/// Descriptor placing a model at `anchor` on the map.
///
/// Projection and units-per-meter come from the map collaborator unchanged;
/// an out-of-range anchor surfaces as its `GeoCoordinateError`.
pub fn compute_transform(
    projection: &dyn MapProjection,
    anchor: GeoAnchor,
    model_rotation: Vec3,
    model_scale_constant: f64,
) -> Result<TransformDescriptor, GeoCoordinateError> {
    let translate = projection.project(&anchor)?;
    let units_per_meter = projection.units_per_meter(&anchor)?;
    Ok(TransformDescriptor {
        translate,
        rotate: model_rotation,
        scale: units_per_meter * model_scale_constant,
    })
}

/// Anchor plus calibration with the derived descriptor cached.
///
/// The descriptor is only recomputed when the anchor (or its altitude)
/// changes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OverlayPlacement {
    anchor: GeoAnchor,
    calibration: ModelCalibration,
    transform: TransformDescriptor,
}

impl OverlayPlacement {
    pub fn new(
        projection: &dyn MapProjection,
        anchor: GeoAnchor,
        calibration: ModelCalibration,
    ) -> Result<Self, GeoCoordinateError> {
        let transform = compute_transform(
            projection,
            anchor,
            calibration.rotation,
            calibration.scale_constant,
        )?;
        debug!(
            lng = anchor.longitude,
            lat = anchor.latitude,
            alt_m = anchor.altitude_meters,
            scale = transform.scale,
            "overlay placement computed"
        );
        Ok(Self {
            anchor,
            calibration,
            transform,
        })
    }

    pub fn anchor(&self) -> GeoAnchor {
        self.anchor
    }

    pub fn calibration(&self) -> ModelCalibration {
        self.calibration
    }

    pub fn transform(&self) -> &TransformDescriptor {
        &self.transform
    }

    /// Move the anchor. Returns `true` if the descriptor was recomputed.
    ///
    /// On error the previous placement is kept.
    pub fn set_anchor(
        &mut self,
        projection: &dyn MapProjection,
        anchor: GeoAnchor,
    ) -> Result<bool, GeoCoordinateError> {
        if anchor == self.anchor {
            return Ok(false);
        }
        *self = Self::new(projection, anchor, self.calibration)?;
        Ok(true)
    }
}
