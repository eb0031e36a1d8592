mod config;
mod error;
mod normal;
mod orchestrator;
mod slots;
mod target_cache;

pub use config::*;
pub use error::*;
pub use normal::{euler_zxy, raw_normal, resolve_plane};
pub use orchestrator::*;
pub use slots::*;
pub use target_cache::*;
