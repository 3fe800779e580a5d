pub mod app;
pub mod bridge;
pub mod collaborators;
pub mod config;
pub mod error;

pub use app::*;
pub use bridge::*;
pub use collaborators::*;
pub use config::*;
pub use error::*;
