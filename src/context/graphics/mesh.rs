use cgmath::Vector3;

use super::Vertex3;
use crate::world::Shape;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Unit face directions paired with tangents `u`, `v` where `u x v` is the
/// face normal, so corners listed -u-v, +u-v, +u+v, -u+v wind
/// counter-clockwise seen from outside.
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
];

fn push_face(
    vertices: &mut Vec<Vertex3>,
    indices: &mut Vec<u16>,
    center: Vector3<f32>,
    u: Vector3<f32>,
    v: Vector3<f32>,
    normal: Vector3<f32>,
) {
    let base = vertices.len() as u16;
    for corner in [-u - v, u - v, u + v, -u + v].iter() {
        let p = center + *corner;
        vertices.push(Vertex3::new(p.into(), WHITE, normal.into()));
    }
    indices.extend_from_slice(&[
        base,
        base + 1,
        base + 2,
        base,
        base + 2,
        base + 3,
    ]);
}

/// Local-space triangle list for a surface shape.
pub fn shape_mesh(shape: &Shape) -> (Vec<Vertex3>, Vec<u16>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    match *shape {
        Shape::Cube { half_extent } => {
            for (n, u, v) in CUBE_FACES.iter() {
                let n = Vector3::from(*n);
                push_face(
                    &mut vertices,
                    &mut indices,
                    n * half_extent,
                    Vector3::from(*u) * half_extent,
                    Vector3::from(*v) * half_extent,
                    n,
                );
            }
        }
        Shape::Quad {
            half_width,
            half_height,
        } => {
            push_face(
                &mut vertices,
                &mut indices,
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::unit_x() * half_width,
                Vector3::unit_y() * half_height,
                Vector3::unit_z(),
            );
        }
    }

    (vertices, indices)
}
