pub mod camera;
pub mod components;
pub mod model;
pub mod world;

pub use model::*;
pub use world::*;
