//! Closed primitive meshes used as starting surfaces.

use glam::Vec3;
use std::collections::HashMap;

use crate::mesh::WingedMesh;

fn build(positions: &[Vec3], indices: &[u32]) -> WingedMesh {
    WingedMesh::from_triangles(positions, indices)
        .unwrap_or_else(|err| panic!("primitive mesh is invalid: {}", err))
}

fn scaled(positions: &[Vec3], radius: f32) -> Vec<Vec3> {
    positions.iter().map(|p| p.normalize() * radius).collect()
}

pub fn tetrahedron(radius: f32) -> WingedMesh {
    let positions = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
    ];
    let indices = [0, 1, 2, 0, 3, 1, 0, 2, 3, 1, 3, 2];
    build(&scaled(&positions, radius), &indices)
}

pub fn octahedron(radius: f32) -> WingedMesh {
    let positions = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
    #[rustfmt::skip]
    let indices = [
        0, 2, 4,  2, 1, 4,  1, 3, 4,  3, 0, 4,
        2, 0, 5,  1, 2, 5,  3, 1, 5,  0, 3, 5,
    ];
    build(&scaled(&positions, radius), &indices)
}

fn icosahedron_data() -> (Vec<Vec3>, Vec<u32>) {
    let t = (1.0 + 5.0_f32.sqrt()) * 0.5;
    let positions = vec![
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 11, 5,  0, 5, 1,  0, 1, 7,  0, 7, 10,  0, 10, 11,
        1, 5, 9,  5, 11, 4,  11, 10, 2,  10, 7, 6,  7, 1, 8,
        3, 9, 4,  3, 4, 2,  3, 2, 6,  3, 6, 8,  3, 8, 9,
        4, 9, 5,  2, 4, 11,  6, 2, 10,  8, 6, 7,  9, 8, 1,
    ];
    (positions, indices)
}

pub fn icosahedron(radius: f32) -> WingedMesh {
    let (positions, indices) = icosahedron_data();
    build(&scaled(&positions, radius), &indices)
}

/// Icosahedron refined `subdivisions` times, every vertex projected onto
/// the sphere of `radius`.
pub fn icosphere(subdivisions: u32, radius: f32) -> WingedMesh {
    let (positions, indices) = icosahedron_data();
    let mut positions: Vec<Vec3> = positions.iter().map(|p| p.normalize()).collect();
    let mut indices = indices;

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut next = Vec::with_capacity(indices.len() * 4);
        for tri in indices.chunks(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            let mut midpoint = |i: u32, j: u32| {
                *midpoints.entry((i.min(j), i.max(j))).or_insert_with(|| {
                    let mid = ((positions[i as usize] + positions[j as usize]) * 0.5).normalize();
                    positions.push(mid);
                    positions.len() as u32 - 1
                })
            };
            let ab = midpoint(a, b);
            let bc = midpoint(b, c);
            let ca = midpoint(c, a);
            next.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
        }
        indices = next;
    }

    build(&scaled(&positions, radius), &indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tetrahedron() {
        let mesh = tetrahedron(2.0);
        assert_eq!(mesh.face_count(), 4);
        for v in mesh.vertices() {
            assert!((v.position.length() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_icosahedron_counts() {
        let mesh = icosahedron(1.0);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.edge_count(), 30);
        assert_eq!(mesh.face_count(), 20);
    }

    #[test]
    fn test_icosphere_counts() {
        let mesh = icosphere(2, 1.0);
        assert_eq!(mesh.face_count(), 20 * 16);
        assert_eq!(mesh.vertex_count(), 10 * 16 + 2);
        assert_eq!(mesh.edge_count(), 30 * 16);
    }

    #[test]
    fn test_faces_point_outward() {
        let mesh = icosphere(1, 1.0);
        for face in mesh.face_ids() {
            let normal = mesh.face_normal(face);
            assert!(normal.dot(mesh.face_centroid(face)) > 0.0);
        }
    }
}
