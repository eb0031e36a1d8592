use cgmath::{Deg, InnerSpace, Vector3};
use slotmap::{new_key_type, SlotMap};

use crate::camera::Camera;
use crate::material::Material;
use crate::transform::Transform;

new_key_type! {
    /// Stable identity of a viewing camera. Per-observer probe state is
    /// keyed by this, never by the camera value itself.
    pub struct CameraId;
    pub struct SurfaceId;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Cube { half_extent: f32 },
    /// Unit quad in the local XY plane facing +Z, scaled.
    Quad { half_width: f32, half_height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub axis: Vector3<f32>,
    pub degrees_per_second: f32,
}

pub struct Surface {
    pub name: String,
    pub transform: Transform,
    pub shape: Shape,
    pub material: Option<Material>,
    pub spin: Option<Spin>,
}

impl Surface {
    pub fn new(
        name: impl Into<String>,
        transform: Transform,
        shape: Shape,
    ) -> Self {
        Self {
            name: name.into(),
            transform,
            shape,
            material: None,
            spin: None,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_spin(mut self, spin: Spin) -> Self {
        self.spin = Some(spin);
        self
    }
}

pub struct World {
    pub cameras: SlotMap<CameraId, Camera>,
    pub surfaces: SlotMap<SurfaceId, Surface>,
}

impl World {
    pub fn new() -> Self {
        Self {
            cameras: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
        }
    }

    pub fn add_camera(&mut self, camera: Camera) -> CameraId {
        self.cameras.insert(camera)
    }

    pub fn add_surface(&mut self, surface: Surface) -> SurfaceId {
        self.surfaces.insert(surface)
    }

    pub fn surface_by_name(&self, name: &str) -> Option<SurfaceId> {
        self.surfaces
            .iter()
            .find(|(_, s)| s.name == name)
            .map(|(id, _)| id)
    }

    pub fn active_cameras(&self) -> impl Iterator<Item = CameraId> + '_ {
        self.cameras
            .iter()
            .filter(|(_, c)| c.enabled)
            .map(|(id, _)| id)
    }

    pub fn update(&mut self, dt: f32) {
        for (_, surface) in self.surfaces.iter_mut() {
            if let Some(spin) = surface.spin {
                if spin.axis.magnitude2() > 0.0 {
                    surface.transform.rotate_about(
                        spin.axis.normalize(),
                        Deg(spin.degrees_per_second * dt),
                    );
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::approx_eq_vec3;

    #[test]
    fn spinning_surfaces_rotate() {
        let mut world = World::new();
        let id = world.add_surface(
            Surface::new(
                "stage",
                Transform::default(),
                Shape::Cube { half_extent: 1.0 },
            )
            .with_spin(Spin {
                axis: Vector3::unit_y(),
                degrees_per_second: 90.0,
            }),
        );
        world.update(1.0);
        let forward = world.surfaces[id].transform.forward();
        assert!(approx_eq_vec3(forward, Vector3::unit_x(), 1e-5));
        assert_eq!(world.surface_by_name("stage"), Some(id));
    }
}
