use cgmath::{InnerSpace, Matrix, Matrix4, SquareMatrix, Vector4};

use crate::util::{sign, EPSILON};

/// Replaces the near plane of `projection` with `clip_plane`, given in the
/// view space of the camera that owns `projection` as `(a, b, c, d)`.
///
/// The z row is rewritten so the clip plane maps onto the near boundary of
/// clip space (`z = -w`) while the far plane is bent as little as possible:
/// the corner `q` of the view frustum opposite the plane is found by
/// unprojecting `(sign(a), sign(b), 1, 1)`, and the new row is
/// `clip_plane * 2 / dot(clip_plane, q) - w_row`.
///
/// Works for both perspective and orthographic projections. When the
/// projection is singular or the plane passes through `q` the base
/// projection is returned unchanged.
pub fn oblique_clip_projection(
    projection: &Matrix4<f32>,
    clip_plane: Vector4<f32>,
) -> Matrix4<f32> {
    let inverse = match projection.invert() {
        Some(inverse) => inverse,
        None => return *projection,
    };

    let corner = Vector4::new(sign(clip_plane.x), sign(clip_plane.y), 1.0, 1.0);
    let q = inverse * corner;
    let denom = clip_plane.dot(q);
    if denom.abs() < EPSILON || !denom.is_finite() {
        return *projection;
    }

    let c = clip_plane * (2.0 / denom);
    let z_row = c - projection.row(3);

    let mut oblique = *projection;
    for col in 0..4 {
        oblique[col][2] = z_row[col];
    }
    oblique
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{ortho, perspective, Deg, Vector3};

    use crate::alg::Plane;

    fn base() -> Matrix4<f32> {
        perspective(Deg(60.0), 4.0 / 3.0, 0.3, 1000.0)
    }

    // A plane below and in front of a camera at the origin looking down
    // -z, tilted so it cuts the frustum obliquely. The camera sits on its
    // negative side.
    fn tilted_plane() -> Plane {
        Plane::new(Vector3::new(0.2, 0.3, -1.0), Vector3::new(0.0, 0.0, -6.0))
            .unwrap()
    }

    fn clip(m: &Matrix4<f32>, p: Vector3<f32>) -> Vector4<f32> {
        m * p.extend(1.0)
    }

    #[test]
    fn point_on_plane_maps_to_near_boundary() {
        let plane = tilted_plane();
        let oblique = oblique_clip_projection(&base(), plane.to_vec4());

        // Sample points on the plane around its anchor
        let n = plane.normal();
        let t = n.cross(Vector3::unit_y()).normalize();
        let b = n.cross(t);
        for &(u, v) in &[(0.0, 0.0), (1.0, 0.5), (-2.0, 1.5), (0.5, -1.0)] {
            let p = plane.point + t * u + b * v;
            assert!(plane.signed_distance(p).abs() < 1e-4);
            let c = clip(&oblique, p);
            assert!(
                (c.z + c.w).abs() < 1e-3 * c.w.abs().max(1.0),
                "z = {}, w = {}",
                c.z,
                c.w
            );
        }
    }

    #[test]
    fn geometry_behind_plane_is_clipped() {
        let plane = tilted_plane();
        let oblique = oblique_clip_projection(&base(), plane.to_vec4());

        let behind = plane.point - plane.normal() * 0.5;
        let c = clip(&oblique, behind);
        assert!(c.z < -c.w);

        let in_front = plane.point + plane.normal() * 0.5;
        let c = clip(&oblique, in_front);
        assert!(c.z >= -c.w);
    }

    #[test]
    fn only_the_z_row_changes() {
        let p = base();
        let oblique = oblique_clip_projection(&p, tilted_plane().to_vec4());
        for row in &[0, 1, 3] {
            assert_eq!(p.row(*row), oblique.row(*row));
        }
        assert_ne!(p.row(2), oblique.row(2));
    }

    #[test]
    fn orthographic_projection_is_supported() {
        let p = ortho(-4.0, 4.0, -3.0, 3.0, 0.3, 100.0);
        let plane = tilted_plane();
        let oblique = oblique_clip_projection(&p, plane.to_vec4());
        let c = clip(&oblique, plane.point);
        assert!((c.z + c.w).abs() < 1e-3);
    }

    #[test]
    fn degenerate_solve_keeps_base_projection() {
        let p = base();
        assert_eq!(
            oblique_clip_projection(&p, Vector4::new(0.0, 0.0, 0.0, 0.0)),
            p
        );

        let singular = Matrix4::from_value(0.0);
        assert_eq!(
            oblique_clip_projection(&singular, tilted_plane().to_vec4()),
            singular
        );
    }
}
