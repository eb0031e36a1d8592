use cgmath::{InnerSpace, Matrix4, Vector3};

pub const EPSILON: f32 = 1e-6;

// Sign that treats zero (of either sign) as positive. The oblique clip
// solve needs a corner in a definite octant, so 0 must not map to 0.
pub fn sign(f: f32) -> f32 {
    if f >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

// Normalizes `v`, or returns None for vectors too short to carry a
// direction.
pub fn try_normalize(v: Vector3<f32>) -> Option<Vector3<f32>> {
    let mag2 = v.magnitude2();
    if mag2 <= EPSILON * EPSILON || !mag2.is_finite() {
        None
    } else {
        Some(v / mag2.sqrt())
    }
}

pub fn approx_eq_vec3(
    a: Vector3<f32>,
    b: Vector3<f32>,
    tolerance: f32,
) -> bool {
    (a - b).magnitude() <= tolerance
}

pub fn approx_eq_mat4(
    a: &Matrix4<f32>,
    b: &Matrix4<f32>,
    tolerance: f32,
) -> bool {
    (0..4).all(|c| (0..4).all(|r| (a[c][r] - b[c][r]).abs() <= tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_of_zero_is_positive() {
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(-0.0), 1.0);
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(2.0), 1.0);
    }

    #[test]
    fn zero_vector_has_no_direction() {
        assert!(try_normalize(Vector3::new(0.0, 0.0, 0.0)).is_none());
        let n = try_normalize(Vector3::new(0.0, 3.0, 4.0)).unwrap();
        assert!(approx_eq_vec3(n, Vector3::new(0.0, 0.6, 0.8), 1e-6));
    }
}
