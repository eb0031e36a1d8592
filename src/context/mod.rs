mod backend;
mod culling;
pub mod graphics;

pub use backend::*;
pub use culling::*;
pub use graphics::{GraphicsContext, WgpuBackend};
