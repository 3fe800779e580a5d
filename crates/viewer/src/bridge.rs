use foundation::ids::{FragmentId, ModelId};
use foundation::math::Vec3;
use foundation::time::TimeMs;
use runtime::{TimerId, Timers};
use scene::camera::fit_bounds;
use scene::components::Visibility;
use scene::{Model, World};
use streaming::{Culler, MeshState, VisibilityBudget, VisibilityChanges};
use tracing::{debug, info, warn};

use crate::collaborators::{Indexer, ModelLoader, TileReloader, ViewportCamera};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FitSettings {
    pub delay_ms: u64,
    pub padding: f64,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            delay_ms: 50,
            padding: 0.8,
        }
    }
}

/// Keeps the scene, the culler and the deferred camera fit consistent with
/// what the loader reports.
#[derive(Debug)]
pub struct ModelLifecycleBridge {
    world: World,
    culler: Culler,
    fit: FitSettings,
    timers: Timers<ModelId>,
    pending_fit: Option<TimerId>,
}

impl ModelLifecycleBridge {
    pub fn new(budget: VisibilityBudget, fit: FitSettings) -> Self {
        Self {
            world: World::new(),
            culler: Culler::new(budget),
            fit,
            timers: Timers::new(),
            pending_fit: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn culler(&self) -> &Culler {
        &self.culler
    }

    pub fn has_pending_fit(&self) -> bool {
        self.pending_fit.is_some()
    }

    /// Register a freshly loaded model.
    ///
    /// Indexing failures are logged and otherwise ignored; the geometry is
    /// registered either way. Returns the registered fragment ids.
    pub fn on_model_loaded(
        &mut self,
        model: &Model,
        now: TimeMs,
        indexer: &mut dyn Indexer,
    ) -> Vec<FragmentId> {
        if model.has_properties {
            let indexed = indexer
                .process(model)
                .and_then(|()| indexer.classify(model));
            if let Err(e) = indexed {
                warn!(model = %model.id, error = %e, "model indexing failed");
            }
        }

        let added = self.world.add_model(model);
        for id in &added {
            self.culler.retrack(*id, now);
        }

        if let Some(stale) = self.pending_fit.take() {
            self.timers.cancel(stale);
        }
        self.pending_fit = Some(self.timers.schedule(now, self.fit.delay_ms, model.id));

        info!(
            model = %model.id,
            name = %model.name,
            fragments = added.len(),
            "model registered"
        );
        added
    }

    /// Drop disposed fragments from the scene. Unknown ids are ignored.
    ///
    /// Returns how many meshes were actually removed.
    pub fn on_model_disposed(&mut self, ids: &[FragmentId]) -> usize {
        let mut removed = 0;
        for id in ids {
            if self.world.remove_mesh(*id).is_some() {
                removed += 1;
            }
            self.culler.untrack(*id);
        }
        if removed > 0 {
            debug!(removed, "fragments disposed");
        }
        removed
    }

    /// Dispose every resident group through the loader.
    pub fn dispose_all(&mut self, loader: &mut dyn ModelLoader) -> Vec<FragmentId> {
        if let Some(fit) = self.pending_fit.take() {
            self.timers.cancel(fit);
        }

        let mut disposed = Vec::new();
        for model in self.world.group_ids() {
            let mut ids = loader.dispose_group(model);
            self.on_model_disposed(&ids);
            // Whatever the loader did not report is still ours to drop.
            for id in self.world.remove_group(model) {
                self.culler.untrack(id);
                ids.push(id);
            }
            disposed.extend(ids);
        }
        info!(fragments = disposed.len(), "all models disposed");
        disposed
    }

    /// Run the camera fit if its delay has elapsed. Returns `true` if it ran.
    pub fn fire_due(&mut self, now: TimeMs, camera: &mut dyn ViewportCamera) -> bool {
        let due = self.timers.drain_due(now);
        let Some((id, model)) = due.last() else {
            return false;
        };
        if self.pending_fit == Some(*id) {
            self.pending_fit = None;
        }
        match fit_bounds(&self.world, self.fit.padding) {
            Some(request) => {
                debug!(model = %model, padding = request.padding, "fitting camera");
                camera.fit_to_bounds(&request);
                true
            }
            None => false,
        }
    }

    /// Re-evaluate streaming visibility for a camera that just came to rest.
    pub fn on_camera_rest(
        &mut self,
        camera: Vec3,
        now: TimeMs,
        reloader: &mut dyn TileReloader,
    ) -> VisibilityChanges {
        let changes = self.culler.mark_camera_rest(&self.world, camera, now);
        self.apply(&changes, reloader);
        changes
    }

    /// Age hidden fragments.
    pub fn tick(&mut self, now: TimeMs, reloader: &mut dyn TileReloader) -> VisibilityChanges {
        let changes = self.culler.tick(now);
        self.apply(&changes, reloader);
        changes
    }

    /// The reloader has geometry for `id` back in place.
    pub fn on_reloaded(&mut self, id: FragmentId, now: TimeMs) -> bool {
        if !self.world.contains(id) {
            return false;
        }
        self.culler.mark_reloaded(id, now) && self.world.set_visibility(id, Visibility::visible())
    }

    fn apply(&mut self, changes: &VisibilityChanges, reloader: &mut dyn TileReloader) {
        for id in &changes.shown {
            self.world.set_visibility(*id, Visibility::visible());
        }
        for id in changes.hidden.iter().chain(&changes.unloaded).chain(&changes.evicted) {
            self.world.set_visibility(*id, Visibility::hidden());
        }
        for id in &changes.unloaded {
            reloader.release(*id, MeshState::Unloaded);
        }
        for id in &changes.evicted {
            reloader.release(*id, MeshState::Evicted);
        }
        for request in &changes.reloads {
            reloader.request_reload(*request);
        }
    }
}
