use foundation::ids::FragmentId;
use foundation::math::MapProjection;
use foundation::time::TimeMs;
use gpu::SurfaceRenderer;
use layers::{
    Layer, LayerId, LngLat, MapEvent, MapHost, MarkerLayer, ModelOverlayLayer, OverlayPlacement,
    Popup,
};
use runtime::EventBus;
use scene::camera::RestDetector;
use scene::{Model, World};
use streaming::VisibilityChanges;
use tracing::{debug, info, warn};

use crate::bridge::{FitSettings, ModelLifecycleBridge};
use crate::collaborators::{ModelLoader, Services};
use crate::config::ViewerConfig;
use crate::error::ViewerError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Map,
    Model,
}

/// Completions reported by collaborators, processed by [`Viewer::pump`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    ModelLoaded(Model),
    FragmentsDisposed(Vec<FragmentId>),
    FragmentReloaded(FragmentId),
}

/// What one [`Viewer::tick`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Set when the viewport camera came to rest this tick.
    pub rest: Option<VisibilityChanges>,
    pub aging: VisibilityChanges,
    pub fitted: bool,
}

/// Map overlay and 3D viewport wired together.
#[derive(Debug)]
pub struct Viewer<R> {
    mode: ViewMode,
    overlay: ModelOverlayLayer<R>,
    overlay_in_style: bool,
    marker: MarkerLayer,
    bridge: ModelLifecycleBridge,
    rest: RestDetector,
    events: EventBus<ViewerEvent>,
}

impl<R: SurfaceRenderer> Viewer<R> {
    /// Fails if the configured anchor cannot be placed on the map.
    pub fn new(config: &ViewerConfig, projection: &dyn MapProjection) -> Result<Self, ViewerError> {
        config.validate()?;
        let placement = OverlayPlacement::new(projection, config.anchor, config.calibration)?;
        let overlay = ModelOverlayLayer::new(LayerId::new(config.layers.overlay_id.as_str()), placement);
        let marker = MarkerLayer::new(
            LayerId::new(config.layers.marker_id.as_str()),
            LngLat::new(config.anchor.longitude, config.anchor.latitude),
            config.layers.marker_description.as_str(),
        );
        let fit = FitSettings {
            delay_ms: config.camera.fit_delay_ms,
            padding: config.camera.fit_padding,
        };

        Ok(Self {
            mode: ViewMode::Map,
            overlay,
            overlay_in_style: false,
            marker,
            bridge: ModelLifecycleBridge::new(config.streaming, fit),
            rest: RestDetector::new(config.camera.rest_threshold),
            events: EventBus::new(),
        })
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn overlay(&self) -> &ModelOverlayLayer<R> {
        &self.overlay
    }

    pub fn world(&self) -> &World {
        self.bridge.world()
    }

    pub fn bridge(&self) -> &ModelLifecycleBridge {
        &self.bridge
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.marker.popup()
    }

    /// Hand over the renderer bound to the map's context once the host has
    /// integrated the overlay layer.
    pub fn attach_renderer(&mut self, renderer: R) -> Result<(), ViewerError> {
        self.overlay.on_add(renderer)?;
        Ok(())
    }

    /// Queue a collaborator completion for the next [`Viewer::pump`].
    pub fn notify(&mut self, at: TimeMs, event: ViewerEvent) {
        self.events.emit(at, event);
    }

    pub fn handle_map_event(
        &mut self,
        event: &MapEvent,
        now: TimeMs,
        host: &mut dyn MapHost,
        services: &mut Services<'_>,
    ) -> Result<(), ViewerError> {
        match event {
            MapEvent::StyleReady => {
                if !self.overlay_in_style {
                    host.add_overlay_layer(self.overlay.id());
                    self.overlay_in_style = true;
                    info!(layer = %self.overlay.id(), "overlay layer added to map style");
                }
            }
            MapEvent::FrameReady { matrix } => {
                if self.overlay.is_added() {
                    self.overlay.render(matrix, host)?;
                }
            }
            MapEvent::Click { layer, .. } if layer == self.marker.id() => {
                self.load_from_source(now, services)?;
            }
            MapEvent::Hover { layer, at } if layer == self.marker.id() => {
                self.marker.on_hover(*at);
            }
            MapEvent::Leave { layer } if layer == self.marker.id() => {
                self.marker.on_leave();
            }
            MapEvent::Click { .. } | MapEvent::Hover { .. } | MapEvent::Leave { .. } => {}
        }
        Ok(())
    }

    /// Fetch the model, load it and switch to the 3D view.
    ///
    /// Nothing changes if fetching or parsing fails.
    pub fn load_from_source(
        &mut self,
        now: TimeMs,
        services: &mut Services<'_>,
    ) -> Result<(), ViewerError> {
        let bytes = services.source.fetch().inspect_err(|e| {
            warn!(error = %e, "model fetch failed");
        })?;
        self.load_bytes(&bytes, now, services.loader)
    }

    pub fn load_bytes(
        &mut self,
        bytes: &[u8],
        now: TimeMs,
        loader: &mut dyn ModelLoader,
    ) -> Result<(), ViewerError> {
        let model = loader.load(bytes).inspect_err(|e| {
            warn!(error = %e, bytes = bytes.len(), "model load failed");
        })?;
        self.events.emit(now, ViewerEvent::ModelLoaded(model));
        self.set_mode(ViewMode::Model, loader);
        Ok(())
    }

    /// Switch between the map and the 3D viewport. Returns the new mode.
    pub fn toggle_view(&mut self, loader: &mut dyn ModelLoader) -> ViewMode {
        let next = match self.mode {
            ViewMode::Map => ViewMode::Model,
            ViewMode::Model => ViewMode::Map,
        };
        self.set_mode(next, loader);
        next
    }

    fn set_mode(&mut self, mode: ViewMode, loader: &mut dyn ModelLoader) {
        if self.mode == mode {
            return;
        }
        if mode == ViewMode::Map {
            // Models are reloaded on every visit to the 3D view.
            let dropped = self
                .events
                .drain()
                .into_iter()
                .filter(|e| matches!(e.event, ViewerEvent::ModelLoaded(_)))
                .count();
            self.bridge.dispose_all(loader);
            self.rest = RestDetector::new(self.rest.rest_threshold());
            if dropped > 0 {
                debug!(dropped, "discarded pending loads on leaving the 3D view");
            }
        }
        info!(from = ?self.mode, to = ?mode, "view mode changed");
        self.mode = mode;
    }

    /// Process queued collaborator completions in emission order.
    pub fn pump(&mut self, services: &mut Services<'_>) -> usize {
        let events = self.events.drain();
        let count = events.len();
        for envelope in events {
            match envelope.event {
                ViewerEvent::ModelLoaded(model) => {
                    self.bridge.on_model_loaded(&model, envelope.at, services.indexer);
                }
                ViewerEvent::FragmentsDisposed(ids) => {
                    self.bridge.on_model_disposed(&ids);
                }
                ViewerEvent::FragmentReloaded(id) => {
                    self.bridge.on_reloaded(id, envelope.at);
                }
            }
        }
        count
    }

    /// Advance the viewport clock: pending events, camera rest, deferred fit
    /// and fragment aging.
    pub fn tick(&mut self, now: TimeMs, services: &mut Services<'_>) -> TickReport {
        self.pump(services);

        let mut report = TickReport::default();
        if self.mode == ViewMode::Model && self.rest.update(services.camera.position(), now) {
            report.rest = Some(self.bridge.on_camera_rest(
                services.camera.position(),
                now,
                services.reloader,
            ));
        }
        report.fitted = self.bridge.fire_due(now, services.camera);
        report.aging = self.bridge.tick(now, services.reloader);
        report
    }
}
