pub mod alg;
pub mod camera;
pub mod config;
pub mod context;
pub mod material;
pub mod probe;
pub mod transform;
pub mod util;
pub mod world;

#[cfg(test)]
mod testing;
