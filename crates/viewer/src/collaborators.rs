//! Host-side services the viewer drives but does not implement.

use foundation::ids::{FragmentId, ModelId};
use foundation::math::Vec3;
use scene::Model;
use scene::camera::FitRequest;
use streaming::{MeshState, ReloadRequest};

use crate::error::{IndexingError, LoadError};

/// Parses model bytes into fragments and owns their GPU resources.
pub trait ModelLoader {
    fn load(&mut self, bytes: &[u8]) -> Result<Model, LoadError>;

    /// Release every resource of `model`; returns the fragments that went away.
    fn dispose_group(&mut self, model: ModelId) -> Vec<FragmentId>;
}

/// Where model bytes come from (file, URL, embedded asset).
pub trait ModelSource {
    fn fetch(&mut self) -> Result<Vec<u8>, LoadError>;
}

/// Semantic property indexing of a loaded model.
pub trait Indexer {
    fn process(&mut self, model: &Model) -> Result<(), IndexingError>;
    fn classify(&mut self, model: &Model) -> Result<(), IndexingError>;
}

pub trait ViewportCamera {
    fn position(&self) -> Vec3;
    fn fit_to_bounds(&mut self, request: &FitRequest);
}

/// Brings streamed geometry back, or lets it go.
pub trait TileReloader {
    fn request_reload(&mut self, request: ReloadRequest);

    /// `state` is `Unloaded` (GPU data may go) or `Evicted` (memory may go).
    fn release(&mut self, _id: FragmentId, _state: MeshState) {}
}

/// Everything the viewer calls out to while handling one event.
pub struct Services<'a> {
    pub source: &'a mut dyn ModelSource,
    pub loader: &'a mut dyn ModelLoader,
    pub indexer: &'a mut dyn Indexer,
    pub camera: &'a mut dyn ViewportCamera,
    pub reloader: &'a mut dyn TileReloader,
}
