use cgmath::{ortho, perspective, Deg, InnerSpace, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraKind {
    Game,
    /// Editor scene view.
    SceneView,
    /// Preview thumbnails and similar.
    Preview,
    /// Owned by a mirror probe.
    Reflection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lens {
    Perspective { fovy_deg: f32 },
    /// `size` is half the vertical extent, in world units.
    Orthographic { size: f32 },
}

impl Lens {
    /// OpenGL-convention projection (clip z in [-1, 1]).
    pub fn projection(&self, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
        match *self {
            Lens::Perspective { fovy_deg } => {
                perspective(Deg(fovy_deg), aspect, near, far)
            }
            Lens::Orthographic { size } => {
                let half_w = size * aspect;
                ortho(-half_w, half_w, -size, size, near, far)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClearMode {
    Skybox,
    Color([f32; 4]),
    DepthOnly,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Skybox {
    pub zenith: [f32; 4],
    pub horizon: [f32; 4],
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub transform: Transform,
    pub lens: Lens,
    pub near: f32,
    pub far: f32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub kind: CameraKind,
    pub clear: ClearMode,
    pub skybox: Option<Skybox>,
    pub enabled: bool,
}

impl Camera {
    pub fn new(transform: Transform, lens: Lens, size: (u32, u32)) -> Self {
        Self {
            transform,
            lens,
            near: 0.3,
            far: 1000.0,
            pixel_width: size.0,
            pixel_height: size.1,
            kind: CameraKind::Game,
            clear: ClearMode::Color([0.0, 0.0, 0.0, 1.0]),
            skybox: None,
            enabled: true,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.pixel_width as f32 / self.pixel_height.max(1) as f32
    }

    /// Snapshot of everything a probe reads from this camera in one frame.
    pub fn pose(&self) -> ObserverPose {
        let aspect = self.aspect();
        let forward = self.transform.forward();
        let up = self.transform.up();
        ObserverPose {
            position: self.transform.position,
            basis: Basis {
                forward,
                up,
                right: forward.cross(up),
            },
            projection: self.lens.projection(aspect, self.near, self.far),
            lens: self.lens,
            aspect,
            near: self.near,
            far: self.far,
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
        }
    }
}

/// Right-handed camera basis: the camera looks along `forward`, and
/// `right = forward x up`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub forward: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverPose {
    pub position: Vector3<f32>,
    pub basis: Basis,
    pub projection: Matrix4<f32>,
    pub lens: Lens,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl ObserverPose {
    pub fn orthographic(&self) -> bool {
        matches!(self.lens, Lens::Orthographic { .. })
    }

    pub fn ortho_size(&self) -> Option<f32> {
        match self.lens {
            Lens::Orthographic { size } => Some(size),
            Lens::Perspective { .. } => None,
        }
    }

    /// The same pose with a different far plane; the projection is rebuilt
    /// from the lens.
    pub fn with_far(mut self, far: f32) -> Self {
        self.far = far;
        self.projection = self.lens.projection(self.aspect, self.near, far);
        self
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        view_from_basis(self.position, &self.basis)
    }
}

/// World-to-view matrix for a camera at `position` looking along
/// `basis.forward`. The basis may be left-handed (mirrored cameras); the
/// matrix then includes the reflection.
pub fn view_from_basis(position: Vector3<f32>, basis: &Basis) -> Matrix4<f32> {
    let r = basis.right;
    let u = basis.up;
    let f = basis.forward;

    #[rustfmt::skip]
    let view = Matrix4::new(
        r.x, u.x, -f.x, 0.0,
        r.y, u.y, -f.y, 0.0,
        r.z, u.z, -f.z, 0.0,
        -r.dot(position), -u.dot(position), f.dot(position), 1.0,
    );
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{approx_eq_mat4, approx_eq_vec3};
    use cgmath::{
        EuclideanSpace, Point3, Quaternion, Rotation3, Transform as _, Zero,
    };

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let mut transform =
            Transform::from_position(Vector3::new(1.0, 2.0, 3.0));
        transform.rotation = Quaternion::from_angle_y(Deg(30.0));
        let camera = Camera::new(
            transform,
            Lens::Perspective { fovy_deg: 60.0 },
            (800, 600),
        );
        let pose = camera.pose();
        let view = pose.view_matrix();

        let eye = view.transform_point(Point3::new(1.0, 2.0, 3.0));
        assert!(approx_eq_vec3(eye.to_vec(), Vector3::zero(), 1e-5));

        let ahead = view.transform_point(Point3::from_vec(
            pose.position + pose.basis.forward,
        ));
        assert!(approx_eq_vec3(ahead.to_vec(), -Vector3::unit_z(), 1e-5));
        assert!(approx_eq_vec3(
            view.transform_vector(pose.basis.up),
            Vector3::unit_y(),
            1e-5
        ));
        assert!(approx_eq_mat4(
            &(view * camera.transform.to_matrix()),
            &(Matrix4::from_angle_y(Deg(180.0))),
            1e-5
        ));
    }

    #[test]
    fn right_completes_basis() {
        let camera = Camera::new(
            Transform::default(),
            Lens::Perspective { fovy_deg: 60.0 },
            (640, 480),
        );
        let pose = camera.pose();
        assert!(approx_eq_vec3(pose.basis.right, -Vector3::unit_x(), 1e-6));
        assert!((pose.aspect - 4.0 / 3.0).abs() < 1e-6);
        assert!(!pose.orthographic());
    }

    #[test]
    fn far_override_rebuilds_projection() {
        let camera = Camera::new(
            Transform::default(),
            Lens::Orthographic { size: 5.0 },
            (100, 100),
        );
        let pose = camera.pose().with_far(50.0);
        assert_eq!(pose.far, 50.0);
        assert_eq!(pose.projection, ortho(-5.0, 5.0, -5.0, 5.0, 0.3, 50.0));
        assert_eq!(pose.ortho_size(), Some(5.0));
    }
}
