use std::f64::consts::PI;

use super::{GeoAnchor, GeoCoordinateError, Vec3};

/// Mean earth radius used by MapLibre/Mapbox for mercator units (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;
/// Equatorial circumference matching [`EARTH_RADIUS_M`].
pub const EARTH_CIRCUMFERENCE_M: f64 = 2.0 * PI * EARTH_RADIUS_M;

/// Geographic → projected conversion owned by the host map.
///
/// Implementations are authoritative: callers consume these values and never
/// re-derive them.
pub trait MapProjection {
    /// Position of `anchor` (including altitude) in projected units.
    fn project(&self, anchor: &GeoAnchor) -> Result<Vec3, GeoCoordinateError>;

    /// Projected units covered by one meter at `anchor`.
    fn units_per_meter(&self, anchor: &GeoAnchor) -> Result<f64, GeoCoordinateError>;
}

/// Normalized Web Mercator: the world spans `[0, 1]` on x and y, y grows
/// southwards and z is altitude in the same units at that latitude.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct WebMercator;

impl WebMercator {
    pub fn x_from_lng(lng: f64) -> f64 {
        (180.0 + lng) / 360.0
    }

    pub fn y_from_lat(lat: f64) -> f64 {
        (180.0 - (180.0 / PI) * (PI / 4.0 + lat * PI / 360.0).tan().ln()) / 360.0
    }

    pub fn circumference_at_latitude(lat: f64) -> f64 {
        EARTH_CIRCUMFERENCE_M * (lat * PI / 180.0).cos()
    }
}

impl MapProjection for WebMercator {
    fn project(&self, anchor: &GeoAnchor) -> Result<Vec3, GeoCoordinateError> {
        anchor.validate()?;
        Ok(Vec3::new(
            Self::x_from_lng(anchor.longitude),
            Self::y_from_lat(anchor.latitude),
            anchor.altitude_meters / Self::circumference_at_latitude(anchor.latitude),
        ))
    }

    fn units_per_meter(&self, anchor: &GeoAnchor) -> Result<f64, GeoCoordinateError> {
        anchor.validate()?;
        Ok(1.0 / Self::circumference_at_latitude(anchor.latitude))
    }
}

#[cfg(test)]
mod tests {
    use super::{EARTH_CIRCUMFERENCE_M, MapProjection, WebMercator};
    use crate::math::{GeoAnchor, GeoCoordinateError};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn null_island_is_the_center() {
        let p = WebMercator.project(&GeoAnchor::new(0.0, 0.0, 0.0)).unwrap();
        assert_close(p.x, 0.5, 1e-15);
        assert_close(p.y, 0.5, 1e-15);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn altitude_uses_local_units_per_meter() {
        let anchor = GeoAnchor::new(-75.602267, 6.206761, 20.0);
        let p = WebMercator.project(&anchor).unwrap();
        let upm = WebMercator.units_per_meter(&anchor).unwrap();
        assert_close(p.z, 20.0 * upm, 1e-20);
        assert!(upm > 1.0 / EARTH_CIRCUMFERENCE_M);
    }

    #[test]
    fn north_is_smaller_y() {
        let south = WebMercator.project(&GeoAnchor::new(0.0, -10.0, 0.0)).unwrap();
        let north = WebMercator.project(&GeoAnchor::new(0.0, 10.0, 0.0)).unwrap();
        assert!(north.y < south.y);
    }

    #[test]
    fn rejects_poles() {
        let err = WebMercator
            .units_per_meter(&GeoAnchor::new(0.0, 90.0, 0.0))
            .unwrap_err();
        assert_eq!(err, GeoCoordinateError::LatitudeOutOfRange(90.0));
    }
}
