use cgmath::{
    prelude::{One, Zero},
    Deg, Matrix4, Quaternion, Rotation, Rotation3, Vector3,
};

// Rigid transforms only. Mirror planes and cameras never carry scale, and
// keeping it out means plane normals never need the inverse transpose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl Transform {
    pub fn new(position: Vector3<f32>, rotation: Quaternion<f32>) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: Quaternion::one(),
        }
    }

    /// Local +Z.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_z())
    }

    /// Local +Y.
    pub fn up(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_y())
    }

    /// Local +X.
    pub fn right(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_x())
    }

    pub fn rotate_about(&mut self, axis: Vector3<f32>, angle: Deg<f32>) {
        self.rotation =
            Quaternion::from_axis_angle(axis, angle) * self.rotation;
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position) * Matrix4::from(self.rotation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Quaternion::one(),
        }
    }
}

/// Per-object transform as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ModelTransform {
    pub model: Matrix4<f32>,
}

unsafe impl bytemuck::Pod for ModelTransform {}
unsafe impl bytemuck::Zeroable for ModelTransform {}

impl From<&Transform> for ModelTransform {
    fn from(t: &Transform) -> Self {
        Self {
            model: t.to_matrix(),
        }
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            model: Matrix4::one(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::approx_eq_vec3;

    #[test]
    fn basis_follows_rotation() {
        let mut t = Transform::default();
        t.rotate_about(Vector3::unit_y(), Deg(90.0));
        assert!(approx_eq_vec3(t.forward(), Vector3::unit_x(), 1e-6));
        assert!(approx_eq_vec3(t.right(), -Vector3::unit_z(), 1e-6));
        assert!(approx_eq_vec3(t.up(), Vector3::unit_y(), 1e-6));
    }
}
