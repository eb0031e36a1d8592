use cgmath::{Deg, Quaternion, Rotation, Rotation3, Vector3};

use super::{Axis, NormalSource};
use crate::alg::Plane;
use crate::transform::Transform;

fn world_axis(axis: Axis) -> Vector3<f32> {
    match axis {
        Axis::Forward => Vector3::unit_z(),
        Axis::Up => Vector3::unit_y(),
        Axis::Right => Vector3::unit_x(),
    }
}

fn local_axis(axis: Axis, transform: &Transform) -> Vector3<f32> {
    match axis {
        Axis::Forward => transform.forward(),
        Axis::Up => transform.up(),
        Axis::Right => transform.right(),
    }
}

fn clamp_angle(deg: f32) -> f32 {
    deg.max(-180.0).min(180.0)
}

/// Rotation applied about Z first, then X, then Y.
pub fn euler_zxy(x: f32, y: f32, z: f32) -> Quaternion<f32> {
    Quaternion::from_angle_y(Deg(clamp_angle(y)))
        * Quaternion::from_angle_x(Deg(clamp_angle(x)))
        * Quaternion::from_angle_z(Deg(clamp_angle(z)))
}

/// The raw (not yet normalized) normal `source` describes for a surface
/// at `transform`.
pub fn raw_normal(
    source: &NormalSource,
    transform: &Transform,
) -> Vector3<f32> {
    match *source {
        NormalSource::TransformAxis(axis) => local_axis(axis, transform),
        NormalSource::AnglesDeg { x, y, z, axis } => {
            euler_zxy(x, y, z).rotate_vector(world_axis(axis))
        }
        NormalSource::RawVector { x, y, z } => Vector3::new(x, y, z),
    }
}

/// The mirror plane through the surface's origin. The flag is set when the
/// configured normal had no direction and world up was used instead.
pub fn resolve_plane(
    source: &NormalSource,
    transform: &Transform,
) -> (Plane, bool) {
    Plane::new_or_up(raw_normal(source, transform), transform.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::approx_eq_vec3;

    fn turned() -> Transform {
        let mut t = Transform::from_position(Vector3::new(0.0, 1.0, 2.0));
        t.rotate_about(Vector3::unit_y(), Deg(90.0));
        t
    }

    #[test]
    fn transform_axis_follows_surface() {
        let t = turned();
        let (plane, degenerate) =
            resolve_plane(&NormalSource::TransformAxis(Axis::Forward), &t);
        assert!(!degenerate);
        assert!(approx_eq_vec3(plane.normal(), Vector3::unit_x(), 1e-5));
        assert_eq!(plane.point, t.position);

        let (plane, _) =
            resolve_plane(&NormalSource::TransformAxis(Axis::Up), &t);
        assert!(approx_eq_vec3(plane.normal(), Vector3::unit_y(), 1e-5));

        let (plane, _) =
            resolve_plane(&NormalSource::TransformAxis(Axis::Right), &t);
        assert!(approx_eq_vec3(plane.normal(), -Vector3::unit_z(), 1e-5));
    }

    #[test]
    fn angles_rotate_a_world_axis() {
        // Up rotated -90 degrees about Z points along +X, regardless of
        // how the surface itself is turned.
        let source = NormalSource::AnglesDeg {
            x: 0.0,
            y: 0.0,
            z: -90.0,
            axis: Axis::Up,
        };
        let (plane, _) = resolve_plane(&source, &turned());
        assert!(approx_eq_vec3(plane.normal(), Vector3::unit_x(), 1e-5));
    }

    #[test]
    fn angle_order_is_z_then_x_then_y() {
        // Forward about Z does nothing, X by -90 lifts it to +Y, Y then
        // leaves +Y alone.
        let q = euler_zxy(-90.0, 45.0, 30.0);
        let v = q.rotate_vector(Vector3::unit_z());
        assert!(approx_eq_vec3(v, Vector3::unit_y(), 1e-5));
    }

    #[test]
    fn angles_are_clamped() {
        let a = euler_zxy(0.0, 270.0, 0.0).rotate_vector(Vector3::unit_z());
        let b = euler_zxy(0.0, 180.0, 0.0).rotate_vector(Vector3::unit_z());
        assert!(approx_eq_vec3(a, b, 1e-6));
    }

    #[test]
    fn raw_vector_is_normalized() {
        let source = NormalSource::RawVector {
            x: 0.0,
            y: 0.0,
            z: -4.0,
        };
        let (plane, degenerate) = resolve_plane(&source, &Transform::default());
        assert!(!degenerate);
        assert!(approx_eq_vec3(plane.normal(), -Vector3::unit_z(), 1e-6));
    }

    #[test]
    fn zero_vector_falls_back_to_up() {
        let source = NormalSource::RawVector {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        };
        let (plane, degenerate) = resolve_plane(&source, &Transform::default());
        assert!(degenerate);
        assert_eq!(plane.normal(), Vector3::unit_y());
    }
}
