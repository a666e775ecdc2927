//! Geometric and structural face queries.

use glam::Vec3;

use super::WingedMesh;
use crate::spatial::Aabb;
use crate::types::{EdgeId, FaceId, VertexId};

/// Radius of the circle inscribed in triangle `abc` (Heron).
pub fn incircle_radius(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let ab = a.distance(b);
    let bc = b.distance(c);
    let ca = c.distance(a);
    let s = (ab + bc + ca) * 0.5;
    if s <= 0.0 {
        return 0.0;
    }
    (((s - ab) * (s - bc) * (s - ca)) / s).max(0.0).sqrt()
}

impl WingedMesh {
    pub fn position(&self, vertex: VertexId) -> Vec3 {
        self.vertex(vertex).position
    }

    pub fn edge_length_sqr(&self, edge: EdgeId) -> f32 {
        let e = self.edge(edge);
        self.position(e.vertex1).distance_squared(self.position(e.vertex2))
    }

    pub fn edge_length(&self, edge: EdgeId) -> f32 {
        self.edge_length_sqr(edge).sqrt()
    }

    pub fn edge_midpoint(&self, edge: EdgeId) -> Vec3 {
        let e = self.edge(edge);
        (self.position(e.vertex1) + self.position(e.vertex2)) * 0.5
    }

    /// Boundary vertices of `face` in winding order.
    pub fn face_vertices(&self, face: FaceId) -> Vec<VertexId> {
        self.adjacent_vertices(face, false).collect()
    }

    pub fn face_positions(&self, face: FaceId) -> Vec<Vec3> {
        self.adjacent_vertices(face, false)
            .map(|v| self.position(v))
            .collect()
    }

    pub fn num_edges(&self, face: FaceId) -> usize {
        self.adjacent_edges(face, false).count()
    }

    pub fn is_triangle(&self, face: FaceId) -> bool {
        self.num_edges(face) == 3
    }

    fn assert_triangle(&self, face: FaceId) {
        let n = self.num_edges(face);
        assert!(n == 3, "face {:?} is not a triangle ({} edges)", face, n);
    }

    pub fn first_vertex(&self, face: FaceId) -> VertexId {
        self.edge(self.face(face).edge).first_vertex(face)
    }

    pub fn second_vertex(&self, face: FaceId) -> VertexId {
        self.edge(self.face(face).edge).second_vertex(face)
    }

    pub fn third_vertex(&self, face: FaceId) -> VertexId {
        let edge = self.edge(self.face(face).edge);
        self.edge(edge.successor(face)).second_vertex(face)
    }

    /// Corner positions of a triangle face.
    ///
    /// Panics if `face` is not a triangle.
    pub fn triangle(&self, face: FaceId) -> [Vec3; 3] {
        self.assert_triangle(face);
        [
            self.position(self.first_vertex(face)),
            self.position(self.second_vertex(face)),
            self.position(self.third_vertex(face)),
        ]
    }

    /// Unit normal from the first three vertices in winding order.
    ///
    /// Panics on a zero-area face.
    pub fn face_normal(&self, face: FaceId) -> Vec3 {
        let v1 = self.position(self.first_vertex(face));
        let v2 = self.position(self.second_vertex(face));
        let v3 = self.position(self.third_vertex(face));
        let cross = (v2 - v1).cross(v3 - v2);
        let length = cross.length();
        assert!(length > f32::EPSILON, "face {:?} has zero area", face);
        cross / length
    }

    /// Twice the area times the unit normal of the face polygon (Newell).
    pub fn face_area_vector(&self, face: FaceId) -> Vec3 {
        let positions = self.face_positions(face);
        let mut sum = Vec3::ZERO;
        for i in 0..positions.len() {
            let a = positions[i];
            let b = positions[(i + 1) % positions.len()];
            sum += a.cross(b);
        }
        sum
    }

    pub fn face_area(&self, face: FaceId) -> f32 {
        self.face_area_vector(face).length() * 0.5
    }

    pub fn face_centroid(&self, face: FaceId) -> Vec3 {
        let positions = self.face_positions(face);
        positions.iter().copied().sum::<Vec3>() / positions.len() as f32
    }

    pub fn face_aabb(&self, face: FaceId) -> Aabb {
        Aabb::from_points(self.face_positions(face))
    }

    /// Area-weighted average of the normals of the faces around `vertex`.
    ///
    /// Falls back to the cached normal when the weighted sum vanishes.
    pub fn interpolated_normal(&self, vertex: VertexId) -> Vec3 {
        let sum: Vec3 = self
            .vertex_faces(vertex)
            .map(|f| self.face_area_vector(f))
            .sum();
        let normal = sum.normalize_or_zero();
        if normal == Vec3::ZERO {
            self.vertex(vertex).normal
        } else {
            normal
        }
    }

    pub fn longest_edge(&self, face: FaceId) -> EdgeId {
        let mut best = self.face(face).edge;
        let mut best_length = self.edge_length_sqr(best);
        for edge in self.adjacent_edges(face, false) {
            let length = self.edge_length_sqr(edge);
            if length > best_length {
                best = edge;
                best_length = length;
            }
        }
        best
    }

    /// Radius of the inscribed circle (Heron).
    ///
    /// Panics if `face` is not a triangle.
    pub fn incircle_radius(&self, face: FaceId) -> f32 {
        let [a, b, c] = self.triangle(face);
        incircle_radius(a, b, c)
    }

    /// Boundary edge of `face` incident to `vertex`.
    ///
    /// Panics if `vertex` is not on the boundary of `face`.
    pub fn adjacent(&self, face: FaceId, vertex: VertexId) -> EdgeId {
        self.adjacent_edges(face, false)
            .find(|&e| self.edge(e).is_vertex(vertex))
            .unwrap_or_else(|| panic!("vertex {:?} is not adjacent to face {:?}", vertex, face))
    }

    /// First T-vertex on the boundary of `face`.
    pub fn t_vertex(&self, face: FaceId) -> Option<VertexId> {
        self.adjacent_vertices(face, false)
            .find(|&v| self.vertex(v).is_t_vertex())
    }

    /// First T-edge on the boundary of `face`.
    pub fn t_edge(&self, face: FaceId) -> Option<EdgeId> {
        self.adjacent_edges(face, false)
            .find(|&e| self.edge(e).is_t_edge)
    }

    /// Subdivision level of a face.
    ///
    /// A face bounded by a T-edge sits one level below that edge's first
    /// vertex. Otherwise the level is the smallest vertex level shared by at
    /// least two boundary vertices, or the highest level when none is shared.
    pub fn face_level(&self, face: FaceId) -> u32 {
        if let Some(t_edge) = self.t_edge(face) {
            return self.vertex(self.edge(t_edge).vertex1).level.saturating_sub(1);
        }

        let levels: Vec<u32> = self
            .adjacent_vertices(face, false)
            .map(|v| self.vertex(v).level)
            .collect();
        let mut threshold = 0;
        let mut highest = 0;
        loop {
            let Some(min) = levels.iter().copied().filter(|&l| l >= threshold).min() else {
                return highest;
            };
            if levels.iter().filter(|&&l| l == min).count() == 1 {
                highest = min;
                threshold = min.saturating_add(1);
            } else {
                return min;
            }
        }
    }

    /// Boundary vertex with the highest level (first one on ties).
    pub fn highest_level_vertex(&self, face: FaceId) -> VertexId {
        let mut best = self.first_vertex(face);
        for vertex in self.adjacent_vertices(face, false) {
            if self.vertex(vertex).level > self.vertex(best).level {
                best = vertex;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    const EPSILON: f32 = 1e-5;

    fn right_triangle_mesh() -> WingedMesh {
        // Closed "pillow": two triangles glued back to back
        let positions = [Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0)];
        WingedMesh::from_triangles(&positions, &[0, 1, 2, 0, 2, 1]).unwrap()
    }

    #[test]
    fn test_face_normal_follows_winding() {
        let mesh = right_triangle_mesh();
        let n0 = mesh.face_normal(FaceId(0));
        let n1 = mesh.face_normal(FaceId(1));
        assert!((n0 - Vec3::Z).length() < EPSILON);
        assert!((n1 + Vec3::Z).length() < EPSILON);
    }

    #[test]
    fn test_incircle_radius() {
        let mesh = right_triangle_mesh();
        // 3-4-5 triangle: r = area / s = 6 / 6
        assert!((mesh.incircle_radius(FaceId(0)) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_incircle_radius_of_points() {
        let r = incircle_radius(Vec3::ZERO, Vec3::X * 2.0, Vec3::new(1.0, 3.0_f32.sqrt(), 0.0));
        assert!((r - 1.0 / 3.0_f32.sqrt()).abs() < EPSILON);
        // Collinear points have no incircle
        assert_eq!(incircle_radius(Vec3::ZERO, Vec3::X, Vec3::X * 2.0), 0.0);
    }

    #[test]
    fn test_longest_edge() {
        let mesh = right_triangle_mesh();
        let longest = mesh.longest_edge(FaceId(0));
        assert!((mesh.edge_length(longest) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_first_second_third_vertex() {
        let mesh = right_triangle_mesh();
        let verts = mesh.face_vertices(FaceId(0));
        assert_eq!(mesh.first_vertex(FaceId(0)), verts[0]);
        assert_eq!(mesh.second_vertex(FaceId(0)), verts[1]);
        assert_eq!(mesh.third_vertex(FaceId(0)), verts[2]);
    }

    #[test]
    fn test_area_and_triangle() {
        let mesh = right_triangle_mesh();
        assert!((mesh.face_area(FaceId(0)) - 6.0).abs() < EPSILON);
        assert_eq!(mesh.triangle(FaceId(0)).len(), 3);
    }

    #[test]
    fn test_interpolated_normal_octahedron() {
        let mesh = primitives::octahedron(1.0);
        for vertex in mesh.vertices() {
            let n = mesh.interpolated_normal(vertex.id);
            assert!((n - vertex.position.normalize()).length() < EPSILON);
        }
    }

    #[test]
    fn test_adjacent_edge_for_vertex() {
        let mesh = primitives::tetrahedron(1.0);
        let v = mesh.first_vertex(FaceId(0));
        let e = mesh.adjacent(FaceId(0), v);
        assert!(mesh.edge(e).is_vertex(v));
        assert!(mesh.edge(e).is_face(FaceId(0)));
    }

    #[test]
    #[should_panic(expected = "is not adjacent to face")]
    fn test_adjacent_without_match_faults() {
        let mesh = primitives::octahedron(1.0);
        let outside = mesh
            .vertex_ids()
            .find(|&v| !mesh.face_vertices(FaceId(0)).contains(&v))
            .unwrap();
        mesh.adjacent(FaceId(0), outside);
    }

    #[test]
    fn test_face_level() {
        let mut mesh = primitives::tetrahedron(1.0);
        let verts = mesh.face_vertices(FaceId(0));
        assert_eq!(mesh.face_level(FaceId(0)), 0);

        // Levels (2, 2, 0): the single 0 is skipped, 2 is shared
        mesh.vertices[verts[0].index()].level = 2;
        mesh.vertices[verts[1].index()].level = 2;
        assert_eq!(mesh.face_level(FaceId(0)), 2);

        // Levels (3, 2, 0): no level is shared
        mesh.vertices[verts[0].index()].level = 3;
        assert_eq!(mesh.face_level(FaceId(0)), 3);
    }

    #[test]
    fn test_face_level_with_t_edge() {
        let mut mesh = primitives::tetrahedron(1.0);
        let e = mesh.face(FaceId(0)).edge;
        let v1 = mesh.edge(e).vertex1;
        mesh.vertices[v1.index()].level = 4;
        mesh.edges[e.index()].is_t_edge = true;
        assert_eq!(mesh.face_level(FaceId(0)), 3);
        assert_eq!(mesh.t_edge(FaceId(0)), Some(e));
    }

    #[test]
    fn test_highest_level_vertex() {
        let mut mesh = primitives::tetrahedron(1.0);
        let verts = mesh.face_vertices(FaceId(2));
        mesh.vertices[verts[1].index()].level = 1;
        assert_eq!(mesh.highest_level_vertex(FaceId(2)), verts[1]);
    }
}
