use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::layer::{Layer, LayerId};
use crate::map::LngLat;

/// Layer id of the clickable model marker unless configured otherwise.
pub const DEFAULT_MARKER_LAYER_ID: &str = "mymodel";

/// Popup shown while the pointer is over the marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub at: LngLat,
    /// Markup handed to the host unchanged.
    pub description: String,
}

/// Point marker at the model's anchor with a hover popup.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayer {
    id: LayerId,
    position: LngLat,
    description: String,
    popup: Option<Popup>,
}

impl MarkerLayer {
    pub fn new(id: LayerId, position: LngLat, description: impl Into<String>) -> Self {
        Self {
            id,
            position,
            description: description.into(),
            popup: None,
        }
    }

    pub fn position(&self) -> LngLat {
        self.position
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Show the popup over the copy of the marker nearest to `cursor`.
    ///
    /// With the map zoomed out far enough several world copies are visible;
    /// the marker longitude is shifted by whole turns until it lies within
    /// 180° of the pointer.
    pub fn on_hover(&mut self, cursor: LngLat) -> Option<&Popup> {
        if self.description.is_empty() {
            return None;
        }
        let mut lng = self.position.lng;
        while (cursor.lng - lng).abs() > 180.0 {
            lng += if cursor.lng > lng { 360.0 } else { -360.0 };
        }
        trace!(lng, lat = self.position.lat, "marker popup shown");
        self.popup = Some(Popup {
            at: LngLat::new(lng, self.position.lat),
            description: self.description.clone(),
        });
        self.popup.as_ref()
    }

    pub fn on_leave(&mut self) {
        self.popup = None;
    }
}

impl Layer for MarkerLayer {
    fn id(&self) -> &LayerId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MARKER_LAYER_ID, MarkerLayer};
    use crate::layer::LayerId;
    use crate::map::LngLat;
    use pretty_assertions::assert_eq;

    fn marker() -> MarkerLayer {
        MarkerLayer::new(
            LayerId::from(DEFAULT_MARKER_LAYER_ID),
            LngLat::new(-75.602267, 6.206761),
            "<p>Name: Project A</p>",
        )
    }

    #[test]
    fn hover_near_marker_uses_its_position() {
        let mut m = marker();
        let popup = m.on_hover(LngLat::new(-75.0, 6.0)).unwrap().clone();
        assert_eq!(popup.at, m.position());
        assert_eq!(popup.description, "<p>Name: Project A</p>");
    }

    #[test]
    fn hover_over_world_copy_wraps_longitude() {
        let mut m = marker();
        let east = m.on_hover(LngLat::new(284.0, 6.0)).unwrap().at;
        assert!((east.lng - (-75.602267 + 360.0)).abs() < 1e-9);

        let west = m.on_hover(LngLat::new(-436.0, 6.0)).unwrap().at;
        assert!((west.lng - (-75.602267 - 360.0)).abs() < 1e-9);
    }

    #[test]
    fn leave_hides_popup() {
        let mut m = marker();
        m.on_hover(LngLat::new(-75.0, 6.0));
        m.on_leave();
        assert_eq!(m.popup(), None);
    }

    #[test]
    fn empty_description_never_shows() {
        let mut m = MarkerLayer::new(LayerId::from("m"), LngLat::new(0.0, 0.0), "");
        assert!(m.on_hover(LngLat::new(0.0, 0.0)).is_none());
    }
}
