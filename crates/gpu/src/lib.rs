pub mod compositor;
pub mod overlay;

pub use compositor::*;
pub use overlay::*;
