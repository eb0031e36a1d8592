mod oblique;
mod plane;
mod reflect;

pub use oblique::oblique_clip_projection;
pub use plane::Plane;
pub use reflect::{reflect_direction, reflect_point, reflection_matrix};
