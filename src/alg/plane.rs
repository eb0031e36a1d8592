use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};

use crate::util::try_normalize;

/// An oriented plane in world space, stored as a unit normal and a point
/// on the plane. The side the normal points into is the "front".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f32>,
    pub point: Vector3<f32>,
}

impl Plane {
    /// Builds a plane, renormalizing `normal`. Returns None for a normal
    /// with no usable direction.
    pub fn new(normal: Vector3<f32>, point: Vector3<f32>) -> Option<Self> {
        try_normalize(normal).map(|normal| Self { normal, point })
    }

    /// Like `new`, but substitutes world up for a degenerate normal.
    /// The flag reports whether the substitution happened.
    pub fn new_or_up(
        normal: Vector3<f32>,
        point: Vector3<f32>,
    ) -> (Self, bool) {
        match Self::new(normal, point) {
            Some(plane) => (plane, false),
            None => (
                Self {
                    normal: Vector3::unit_y(),
                    point,
                },
                true,
            ),
        }
    }

    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    pub fn set_normal(&mut self, normal: Vector3<f32>) -> bool {
        match try_normalize(normal) {
            Some(n) => {
                self.normal = n;
                true
            }
            None => false,
        }
    }

    /// `d` in `dot(n, x) + d = 0`.
    pub fn distance(&self) -> f32 {
        -self.normal.dot(self.point)
    }

    pub fn signed_distance(&self, p: Vector3<f32>) -> f32 {
        self.normal.dot(p - self.point)
    }

    /// The plane as `(a, b, c, d)`, so `dot(plane, (x, 1)) = 0` on it.
    pub fn to_vec4(&self) -> Vector4<f32> {
        self.normal.extend(self.distance())
    }

    /// Re-expresses the plane in the space `m` maps into. `m` must be a
    /// rigid transform (rotation, reflection, translation).
    pub fn transformed(&self, m: &Matrix4<f32>) -> Self {
        let point = (m * self.point.extend(1.0)).truncate();
        let normal = (m * self.normal.extend(0.0)).truncate();
        let (plane, _) = Self::new_or_up(normal, point);
        plane
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vector3::unit_y(),
            point: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::approx_eq_vec3;

    #[test]
    fn normal_is_renormalized() {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 2.0), Vector3::unit_x())
            .unwrap();
        assert!((plane.normal().magnitude() - 1.0).abs() < 1e-6);

        let mut plane = plane;
        assert!(plane.set_normal(Vector3::new(3.0, 4.0, 0.0)));
        assert!(approx_eq_vec3(
            plane.normal(),
            Vector3::new(0.6, 0.8, 0.0),
            1e-6
        ));
        assert!(!plane.set_normal(Vector3::new(0.0, 0.0, 0.0)));
        assert!(approx_eq_vec3(
            plane.normal(),
            Vector3::new(0.6, 0.8, 0.0),
            1e-6
        ));
    }

    #[test]
    fn degenerate_normal_falls_back_to_up() {
        let (plane, substituted) =
            Plane::new_or_up(Vector3::new(0.0, 0.0, 0.0), Vector3::unit_z());
        assert!(substituted);
        assert_eq!(plane.normal(), Vector3::unit_y());
        assert_eq!(plane.point, Vector3::unit_z());
    }

    #[test]
    fn distance_form_matches_point_form() {
        let plane =
            Plane::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(4.0, 2.0, 1.0))
                .unwrap();
        assert!((plane.distance() + 2.0).abs() < 1e-6);
        assert!((plane.signed_distance(Vector3::new(0.0, 5.0, 0.0)) - 3.0).abs()
            < 1e-6);
        let v = plane.to_vec4();
        assert!((v.dot(Vector4::new(9.0, 2.0, -3.0, 1.0))).abs() < 1e-6);
    }
}
