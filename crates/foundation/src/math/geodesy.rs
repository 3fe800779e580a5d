use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest latitude Web Mercator can represent (degrees).
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_129;

/// Fixed real-world placement of an overlaid model.
///
/// Degrees for longitude/latitude, meters above the ground for altitude.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoAnchor {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default, rename = "altitude_m")]
    pub altitude_meters: f64,
}

impl GeoAnchor {
    pub fn new(longitude: f64, latitude: f64, altitude_meters: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude_meters,
        }
    }

    pub fn with_altitude(self, altitude_meters: f64) -> Self {
        Self {
            altitude_meters,
            ..self
        }
    }

    /// Checks the ranges a projected map can place content at.
    pub fn validate(&self) -> Result<(), GeoCoordinateError> {
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(GeoCoordinateError::LongitudeOutOfRange(self.longitude));
        }
        if !self.latitude.is_finite() || self.latitude.abs() > MAX_MERCATOR_LATITUDE {
            return Err(GeoCoordinateError::LatitudeOutOfRange(self.latitude));
        }
        if !self.altitude_meters.is_finite() {
            return Err(GeoCoordinateError::InvalidAltitude(self.altitude_meters));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoCoordinateError {
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("latitude {0} is outside the projectable range ±85.051129")]
    LatitudeOutOfRange(f64),
    #[error("altitude {0} is not a finite number of meters")]
    InvalidAltitude(f64),
}

#[cfg(test)]
mod tests {
    use super::{GeoAnchor, GeoCoordinateError};

    #[test]
    fn accepts_ordinary_anchor() {
        assert!(GeoAnchor::new(-75.602267, 6.206761, 20.0).validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            GeoAnchor::new(181.0, 0.0, 0.0).validate(),
            Err(GeoCoordinateError::LongitudeOutOfRange(181.0))
        );
        assert_eq!(
            GeoAnchor::new(0.0, 89.0, 0.0).validate(),
            Err(GeoCoordinateError::LatitudeOutOfRange(89.0))
        );
        assert!(matches!(
            GeoAnchor::new(0.0, 0.0, f64::NAN).validate(),
            Err(GeoCoordinateError::InvalidAltitude(_))
        ));
    }
}
