mod observer;
mod viewpoint;

pub use observer::*;
pub use viewpoint::*;
