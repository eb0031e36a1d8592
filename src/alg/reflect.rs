use cgmath::{InnerSpace, Matrix4, Vector3};

use super::Plane;

pub fn reflect_point(p: Vector3<f32>, plane: &Plane) -> Vector3<f32> {
    let n = plane.normal();
    p - n * (2.0 * (p - plane.point).dot(n))
}

pub fn reflect_direction(d: Vector3<f32>, plane: &Plane) -> Vector3<f32> {
    let n = plane.normal();
    d - n * (2.0 * d.dot(n))
}

/// The affine reflection across `plane` as one matrix: translate the plane
/// to the origin, apply the Householder reflection `I - 2nn^T`, translate
/// back.
pub fn reflection_matrix(plane: &Plane) -> Matrix4<f32> {
    let n = plane.normal();
    let d = plane.distance();
    let (x, y, z) = (-2.0 * n.x, -2.0 * n.y, -2.0 * n.z);

    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0 + x * n.x, y * n.x,       z * n.x,       0.0,
        x * n.y,       1.0 + y * n.y, z * n.y,       0.0,
        x * n.z,       y * n.z,       1.0 + z * n.z, 0.0,
        x * d,         y * d,         z * d,         1.0,
    );
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{approx_eq_mat4, approx_eq_vec3};
    use cgmath::{One, Transform};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_vec(rng: &mut StdRng, scale: f32) -> Vector3<f32> {
        Vector3::new(
            rng.gen_range(-scale..scale),
            rng.gen_range(-scale..scale),
            rng.gen_range(-scale..scale),
        )
    }

    fn random_plane(rng: &mut StdRng) -> Plane {
        loop {
            let normal = random_vec(rng, 1.0);
            if let Some(plane) = Plane::new(normal, random_vec(rng, 10.0)) {
                return plane;
            }
        }
    }

    #[test]
    fn point_reflection_is_an_involution() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..256 {
            let plane = random_plane(&mut rng);
            let x = random_vec(&mut rng, 50.0);
            let twice = reflect_point(reflect_point(x, &plane), &plane);
            assert!(approx_eq_vec3(twice, x, 1e-3), "{:?} vs {:?}", twice, x);
        }
    }

    #[test]
    fn midpoint_lies_on_plane() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..256 {
            let plane = random_plane(&mut rng);
            let x = random_vec(&mut rng, 50.0);
            let r = reflect_point(x, &plane);

            let midpoint = (x + r) * 0.5;
            assert!(plane.signed_distance(midpoint).abs() < 1e-3);

            // x - r is parallel to the normal
            let offset = x - r;
            assert!(offset.cross(plane.normal()).magnitude() < 1e-3);
        }
    }

    #[test]
    fn direction_reflection_keeps_length() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..64 {
            let plane = random_plane(&mut rng);
            let d = random_vec(&mut rng, 4.0);
            let r = reflect_direction(d, &plane);
            assert!((r.magnitude() - d.magnitude()).abs() < 1e-4);
            let n = plane.normal();
            assert!((r.dot(n) + d.dot(n)).abs() < 1e-4);
        }
    }

    #[test]
    fn reflection_matrix_squared_is_identity() {
        let mut rng = StdRng::seed_from_u64(19);
        for _ in 0..64 {
            let plane = random_plane(&mut rng);
            let m = reflection_matrix(&plane);
            assert!(approx_eq_mat4(&(m * m), &Matrix4::one(), 1e-5));
        }
    }

    #[test]
    fn matrix_and_point_forms_agree() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..128 {
            let plane = random_plane(&mut rng);
            let m = reflection_matrix(&plane);
            let x = random_vec(&mut rng, 20.0);
            let by_matrix =
                m.transform_point(cgmath::Point3::new(x.x, x.y, x.z));
            let by_point = reflect_point(x, &plane);
            assert!(approx_eq_vec3(
                Vector3::new(by_matrix.x, by_matrix.y, by_matrix.z),
                by_point,
                1e-3
            ));
            let d = random_vec(&mut rng, 1.0);
            assert!(approx_eq_vec3(
                m.transform_vector(d),
                reflect_direction(d, &plane),
                1e-5
            ));
        }
    }

    #[test]
    fn mirror_at_origin_facing_z() {
        let plane =
            Plane::new(Vector3::unit_z(), Vector3::new(0.0, 0.0, 0.0)).unwrap();
        let r = reflect_point(Vector3::new(1.0, 2.0, 3.0), &plane);
        assert!(approx_eq_vec3(r, Vector3::new(1.0, 2.0, -3.0), 1e-6));
    }
}
