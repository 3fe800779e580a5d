use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use foundation::math::{GeoAnchor, Vec3};
use layers::{DEFAULT_MARKER_LAYER_ID, DEFAULT_OVERLAY_LAYER_ID, ModelCalibration};
use scene::camera::DEFAULT_REST_THRESHOLD;
use serde::{Deserialize, Serialize};
use streaming::VisibilityBudget;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub overlay_id: String,
    pub marker_id: String,
    /// Popup markup shown when hovering the marker.
    pub marker_description: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            overlay_id: DEFAULT_OVERLAY_LAYER_ID.to_string(),
            marker_id: DEFAULT_MARKER_LAYER_ID.to_string(),
            marker_description: String::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Speed below which the viewport camera counts as resting.
    pub rest_threshold: f64,
    /// Delay between a finished load and framing the scene.
    pub fit_delay_ms: u64,
    pub fit_padding: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            rest_threshold: DEFAULT_REST_THRESHOLD,
            fit_delay_ms: 50,
            fit_padding: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub anchor: GeoAnchor,
    pub calibration: ModelCalibration,
    #[serde(default)]
    pub layers: LayerConfig,
    #[serde(default)]
    pub streaming: VisibilityBudget,
    #[serde(default)]
    pub camera: CameraConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            anchor: GeoAnchor::new(-75.602267, 6.206761, 20.0),
            calibration: ModelCalibration {
                rotation: Vec3::new(FRAC_PI_2, 0.75, 0.0),
                scale_constant: 100.0,
            },
            layers: LayerConfig::default(),
            streaming: VisibilityBudget::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks everything except the anchor range, which the map projection
    /// decides when the viewer starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.calibration.scale_constant;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "calibration.scale_constant must be positive, got {scale}"
            )));
        }
        let threshold = self.streaming.distance_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "streaming.distance_threshold must be positive, got {threshold}"
            )));
        }
        if self.streaming.max_hidden_duration_ms > self.streaming.max_evicted_duration_ms {
            return Err(ConfigError::Invalid(
                "streaming.max_hidden_duration_ms exceeds max_evicted_duration_ms".to_string(),
            ));
        }
        if self.camera.rest_threshold < 0.0 || self.camera.fit_padding < 0.0 {
            return Err(ConfigError::Invalid(
                "camera thresholds must not be negative".to_string(),
            ));
        }
        if self.layers.overlay_id.is_empty() || self.layers.overlay_id == self.layers.marker_id {
            return Err(ConfigError::Invalid(
                "layer ids must be non-empty and distinct".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ViewerConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn minimal_json_fills_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{
                "anchor": { "longitude": -75.602267, "latitude": 6.206761, "altitude_m": 20 },
                "calibration": { "rotation": { "x": 1.5707963267948966, "y": 0.75, "z": 0.0 }, "scale_constant": 100 }
            }"#,
        )
        .unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{
                "anchor": { "longitude": 0, "latitude": 0 },
                "calibration": { "rotation": { "x": 0, "y": 0, "z": 0 }, "scale_constant": 1 },
                "streaming": { "distance_threshold": 5 },
                "camera": { "fit_delay_ms": 10 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.anchor.altitude_meters, 0.0);
        assert_eq!(config.streaming.distance_threshold, 5.0);
        assert_eq!(config.streaming.max_hidden_duration_ms, 1_000);
        assert_eq!(config.camera.fit_delay_ms, 10);
        assert_eq!(config.camera.fit_padding, 0.8);
        assert_eq!(config.layers.overlay_id, "3dmodel");
    }

    #[test]
    fn rejects_non_positive_scale() {
        let mut config = ViewerConfig::default();
        config.calibration.scale_constant = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn anchor_range_is_left_to_the_projection() {
        let mut config = ViewerConfig::default();
        config.anchor.latitude = 89.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            ViewerConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            ViewerConfig::from_path("/nonexistent/viewer.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
