use foundation::math::{GeoAnchor, GeoCoordinateError, MapProjection, Mat4};
use gpu::{Overlay, OverlayFrameState, RenderError, RepaintHost, SurfaceRenderer};
use tracing::trace;

use crate::anchor::OverlayPlacement;
use crate::layer::{Layer, LayerId};

/// Layer id the overlay registers under unless configured otherwise.
pub const DEFAULT_OVERLAY_LAYER_ID: &str = "3dmodel";

/// Custom 3D map layer that draws the georeferenced model.
///
/// The map calls `on_add` once when the layer is integrated and `render` on
/// every repaint with its current projection matrix.
#[derive(Debug)]
pub struct ModelOverlayLayer<R> {
    id: LayerId,
    placement: OverlayPlacement,
    overlay: Overlay<R>,
    frame_index: u64,
}

impl<R: SurfaceRenderer> ModelOverlayLayer<R> {
    pub fn new(id: LayerId, placement: OverlayPlacement) -> Self {
        Self {
            id,
            placement,
            overlay: Overlay::new(),
            frame_index: 0,
        }
    }

    pub fn placement(&self) -> &OverlayPlacement {
        &self.placement
    }

    pub fn overlay(&self) -> &Overlay<R> {
        &self.overlay
    }

    pub fn is_added(&self) -> bool {
        self.overlay.is_attached()
    }

    pub fn on_add(&mut self, renderer: R) -> Result<(), RenderError> {
        self.overlay.attach(renderer)
    }

    pub fn set_anchor(
        &mut self,
        projection: &dyn MapProjection,
        anchor: GeoAnchor,
    ) -> Result<bool, GeoCoordinateError> {
        self.placement.set_anchor(projection, anchor)
    }

    /// Draw one frame. `matrix` is the host's column-major projection.
    pub fn render<H: RepaintHost + ?Sized>(
        &mut self,
        matrix: &[f64; 16],
        host: &mut H,
    ) -> Result<OverlayFrameState, RenderError> {
        let frame = OverlayFrameState::build(
            self.frame_index,
            Mat4::from_cols_array(matrix),
            self.placement.transform(),
        );
        self.frame_index += 1;
        trace!(frame = frame.index, "compositing overlay frame");
        self.overlay.render(frame.combined, host)?;
        Ok(frame)
    }
}

impl<R> Layer for ModelOverlayLayer<R> {
    fn id(&self) -> &LayerId {
        &self.id
    }
}
