pub mod backend;
pub mod context;
pub mod mesh;
pub mod scene_pipeline;
pub mod target;
pub mod vertex3;
pub mod view_projection;

pub use backend::*;
pub use context::*;
pub use mesh::*;
pub use scene_pipeline::*;
pub use target::*;
pub use vertex3::*;
pub use view_projection::*;
