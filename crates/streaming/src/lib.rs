pub mod culler;
pub mod residency;

pub use culler::*;
pub use residency::*;
