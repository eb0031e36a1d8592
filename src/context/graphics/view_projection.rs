use cgmath::{Matrix4, One, Vector3, Vector4, Zero};

use crate::camera::{MirroredPose, ObserverPose, Skybox};

/// Maps OpenGL clip space (z in [-1, 1]) to wgpu's (z in [0, 1]).
pub fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.0,
        0.0, 0.0, 0.5, 1.0,
    );
    m
}

/// Per-pass camera uniform.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ViewProjection {
    view_proj: Matrix4<f32>,
    eye: Vector4<f32>,
    /// Target size in pixels, then its reciprocal.
    viewport: Vector4<f32>,
    zenith: Vector4<f32>,
    horizon: Vector4<f32>,
}

unsafe impl bytemuck::Pod for ViewProjection {}
unsafe impl bytemuck::Zeroable for ViewProjection {}

impl ViewProjection {
    fn new(
        gl_view_proj: Matrix4<f32>,
        eye: Vector3<f32>,
        size: (u32, u32),
    ) -> Self {
        let (w, h) = (size.0.max(1) as f32, size.1.max(1) as f32);
        Self {
            view_proj: opengl_to_wgpu_matrix() * gl_view_proj,
            eye: eye.extend(1.0),
            viewport: Vector4::new(w, h, 1.0 / w, 1.0 / h),
            zenith: Vector4::zero(),
            horizon: Vector4::zero(),
        }
    }

    pub fn for_observer(pose: &ObserverPose) -> Self {
        Self::new(
            pose.projection * pose.view_matrix(),
            pose.position,
            (pose.pixel_width, pose.pixel_height),
        )
    }

    pub fn for_probe(pose: &MirroredPose, size: (u32, u32)) -> Self {
        Self::new(pose.view_proj(), pose.position, size)
    }

    pub fn with_sky(mut self, skybox: &Skybox) -> Self {
        self.zenith = skybox.zenith.into();
        self.horizon = skybox.horizon.into();
        self
    }

    pub fn world_to_screen(&self, world: Vector4<f32>) -> Vector4<f32> {
        self.view_proj * world
    }
}

impl Default for ViewProjection {
    fn default() -> Self {
        Self {
            view_proj: Matrix4::one(),
            eye: Vector4::unit_w(),
            viewport: Vector4::new(1.0, 1.0, 1.0, 1.0),
            zenith: Vector4::zero(),
            horizon: Vector4::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, Lens};
    use crate::transform::Transform;

    #[test]
    fn depth_is_remapped_to_unit_range() {
        let m = opengl_to_wgpu_matrix();
        let near = m * Vector4::new(0.3, -0.2, -1.0, 1.0);
        let far = m * Vector4::new(0.3, -0.2, 1.0, 1.0);
        assert_eq!(near, Vector4::new(0.3, -0.2, 0.0, 1.0));
        assert_eq!(far, Vector4::new(0.3, -0.2, 1.0, 1.0));
    }

    #[test]
    fn observer_points_land_inside_the_depth_range() {
        let camera = Camera::new(
            Transform::default(),
            Lens::Perspective { fovy_deg: 60.0 },
            (640, 480),
        );
        let vp = ViewProjection::for_observer(&camera.pose());
        assert_eq!(
            vp.viewport,
            Vector4::new(640.0, 480.0, 1.0 / 640.0, 1.0 / 480.0)
        );

        let clip = vp.world_to_screen(Vector4::new(0.0, 0.0, 10.0, 1.0));
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
        assert!((clip.x / clip.w).abs() < 1e-6);
    }
}
