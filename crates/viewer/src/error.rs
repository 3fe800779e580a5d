use foundation::math::GeoCoordinateError;
use gpu::RenderError;
use thiserror::Error;

use crate::config::ConfigError;

/// Fetching or parsing a model failed. The viewer state is left unchanged.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model fetch failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("model parse failed: {0}")]
    Parse(String),
}

/// Property indexing or classification failed; the geometry is still usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("indexing failed: {0}")]
pub struct IndexingError(pub String);

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Geo(#[from] GeoCoordinateError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
