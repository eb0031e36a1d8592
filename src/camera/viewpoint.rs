use cgmath::{InnerSpace, Matrix4, Vector3};

use super::{view_from_basis, Basis, Lens, ObserverPose};
use crate::alg::{
    oblique_clip_projection, reflect_direction, reflect_point, Plane,
};
use crate::util::try_normalize;

/// The virtual camera behind a mirror. Recomputed every frame.
///
/// The basis is left-handed (`right = up x forward`), so `view` contains
/// the reflection and rendering through it flips triangle winding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirroredPose {
    pub position: Vector3<f32>,
    pub basis: Basis,
    pub view: Matrix4<f32>,
    /// The observer's projection with its near plane replaced by the
    /// mirror plane.
    pub projection: Matrix4<f32>,
    pub lens: Lens,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl MirroredPose {
    pub fn orthographic(&self) -> bool {
        matches!(self.lens, Lens::Orthographic { .. })
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection * self.view
    }
}

/// Mirrors `observer` across `plane`.
pub fn build_mirrored_pose(
    observer: &ObserverPose,
    plane: &Plane,
) -> MirroredPose {
    let position = reflect_point(observer.position, plane);
    let basis = mirrored_basis(&observer.basis, plane);
    let view = view_from_basis(position, &basis);

    let clip_plane = plane.transformed(&view).to_vec4();
    let projection = oblique_clip_projection(&observer.projection, clip_plane);

    MirroredPose {
        position,
        basis,
        view,
        projection,
        lens: observer.lens,
        aspect: observer.aspect,
        near: observer.near,
        far: observer.far,
    }
}

fn mirrored_basis(basis: &Basis, plane: &Plane) -> Basis {
    let forward = reflect_direction(basis.forward, plane);
    let up = reflect_direction(basis.up, plane);

    let forward = try_normalize(forward).unwrap_or_else(|| -Vector3::unit_z());
    // Gram-Schmidt so accumulated error in the observer basis does not
    // skew the view.
    let up = try_normalize(up - forward * up.dot(forward))
        .or_else(|| try_normalize(any_perpendicular(forward)))
        .unwrap_or_else(Vector3::unit_y);
    let right = up.cross(forward);

    Basis { forward, up, right }
}

fn any_perpendicular(v: Vector3<f32>) -> Vector3<f32> {
    if v.x.abs() < 0.9 {
        v.cross(Vector3::unit_x())
    } else {
        v.cross(Vector3::unit_y())
    }
}
