use gpu::RepaintHost;
use serde::{Deserialize, Serialize};

use crate::layer::LayerId;

/// Longitude/latitude pair in degrees, as the map reports pointer positions.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Events the host map delivers to the core.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Style finished loading; custom layers may be added now.
    StyleReady,
    /// A repaint is in progress; `matrix` is the map's column-major
    /// projection matrix for this frame.
    FrameReady { matrix: [f64; 16] },
    Click { layer: LayerId, at: LngLat },
    Hover { layer: LayerId, at: LngLat },
    Leave { layer: LayerId },
}

/// The parts of the host map the core drives.
pub trait MapHost: RepaintHost {
    /// Register a custom 3D layer under `id`.
    fn add_overlay_layer(&mut self, id: &LayerId);
}
