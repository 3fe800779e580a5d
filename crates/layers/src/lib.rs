pub mod anchor;
pub mod layer;
pub mod map;
pub mod marker;
pub mod overlay_layer;

pub use anchor::*;
pub use layer::*;
pub use map::*;
pub use marker::*;
pub use overlay_layer::*;
