//! Face and vertex adjacency traversal.
//!
//! All iterators are cheap to clone and can be restarted. Face traversal
//! follows the successor links of the face; vertex traversal rotates around
//! the vertex through the predecessor links of each face leaving it.

use super::WingedMesh;
use crate::types::{EdgeId, FaceId, VertexId};

/// Boundary edges of a face
#[derive(Debug, Clone)]
pub struct AdjacentEdges<'a> {
    mesh: &'a WingedMesh,
    face: FaceId,
    start: EdgeId,
    next: Option<EdgeId>,
    skip_t: bool,
    steps: usize,
}

impl<'a> AdjacentEdges<'a> {
    fn new(mesh: &'a WingedMesh, face: FaceId, start: EdgeId, skip_t: bool) -> Self {
        assert!(
            mesh.edge(start).is_face(face),
            "start edge {:?} is not on face {:?}",
            start,
            face
        );
        Self {
            mesh,
            face,
            start,
            next: Some(start),
            skip_t,
            steps: 0,
        }
    }

    pub fn face(&self) -> FaceId {
        self.face
    }

    /// Rewind to the start edge.
    pub fn restart(&mut self) {
        self.next = Some(self.start);
        self.steps = 0;
    }
}

impl Iterator for AdjacentEdges<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        loop {
            let current = self.next?;
            self.steps += 1;
            assert!(
                self.steps <= self.mesh.edges.len(),
                "boundary of face {:?} does not close",
                self.face
            );
            let edge = self.mesh.edge(current);
            let successor = edge.successor(self.face);
            self.next = (successor != self.start).then_some(successor);
            if self.skip_t && edge.is_t_edge {
                continue;
            }
            return Some(current);
        }
    }
}

/// Boundary vertices of a face, each being the first vertex of a boundary edge
#[derive(Debug, Clone)]
pub struct AdjacentVertices<'a> {
    edges: AdjacentEdges<'a>,
    skip_t: bool,
}

impl AdjacentVertices<'_> {
    pub fn restart(&mut self) {
        self.edges.restart();
    }
}

impl Iterator for AdjacentVertices<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        loop {
            let edge_id = self.edges.next()?;
            let mesh = self.edges.mesh;
            let vertex = mesh.edge(edge_id).first_vertex(self.edges.face);
            if self.skip_t && mesh.vertex(vertex).is_t_vertex() {
                continue;
            }
            return Some(vertex);
        }
    }
}

/// Faces sharing a boundary edge with a face
#[derive(Debug, Clone)]
pub struct AdjacentFaces<'a> {
    edges: AdjacentEdges<'a>,
}

impl AdjacentFaces<'_> {
    pub fn restart(&mut self) {
        self.edges.restart();
    }
}

impl Iterator for AdjacentFaces<'_> {
    type Item = FaceId;

    fn next(&mut self) -> Option<FaceId> {
        let edge_id = self.edges.next()?;
        Some(self.edges.mesh.edge(edge_id).other_face(self.edges.face))
    }
}

/// Edges incident to a vertex, in rotation order
#[derive(Debug, Clone)]
pub struct VertexEdges<'a> {
    mesh: &'a WingedMesh,
    vertex: VertexId,
    start: EdgeId,
    next: Option<EdgeId>,
    steps: usize,
}

impl VertexEdges<'_> {
    pub fn restart(&mut self) {
        self.next = Some(self.start);
        self.steps = 0;
    }
}

impl Iterator for VertexEdges<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        let current = self.next?;
        self.steps += 1;
        assert!(
            self.steps <= self.mesh.edges.len(),
            "edge ring of vertex {:?} does not close",
            self.vertex
        );
        let edge = self.mesh.edge(current);
        let face = edge.face_leaving(self.vertex);
        let following = edge.predecessor(face);
        self.next = (following != self.start).then_some(following);
        Some(current)
    }
}

impl WingedMesh {
    /// Boundary edges of `face`, starting at its stored edge.
    pub fn adjacent_edges(&self, face: FaceId, skip_t: bool) -> AdjacentEdges<'_> {
        AdjacentEdges::new(self, face, self.face(face).edge, skip_t)
    }

    /// Boundary edges of `face`, starting at `start`.
    pub fn adjacent_edges_from(&self, face: FaceId, start: EdgeId, skip_t: bool) -> AdjacentEdges<'_> {
        AdjacentEdges::new(self, face, start, skip_t)
    }

    /// Boundary vertices of `face` in winding order.
    pub fn adjacent_vertices(&self, face: FaceId, skip_t: bool) -> AdjacentVertices<'_> {
        AdjacentVertices {
            edges: AdjacentEdges::new(self, face, self.face(face).edge, false),
            skip_t,
        }
    }

    pub fn adjacent_vertices_from(&self, face: FaceId, start: EdgeId, skip_t: bool) -> AdjacentVertices<'_> {
        AdjacentVertices {
            edges: AdjacentEdges::new(self, face, start, false),
            skip_t,
        }
    }

    /// Neighbouring faces of `face`; with `skip_t` the faces across T-edges
    /// are left out.
    pub fn adjacent_faces(&self, face: FaceId, skip_t: bool) -> AdjacentFaces<'_> {
        AdjacentFaces {
            edges: AdjacentEdges::new(self, face, self.face(face).edge, skip_t),
        }
    }

    pub fn adjacent_faces_from(&self, face: FaceId, start: EdgeId, skip_t: bool) -> AdjacentFaces<'_> {
        AdjacentFaces {
            edges: AdjacentEdges::new(self, face, start, skip_t),
        }
    }

    /// Edges incident to `vertex`.
    pub fn vertex_edges(&self, vertex: VertexId) -> VertexEdges<'_> {
        let start = self.vertex(vertex).edge;
        VertexEdges {
            mesh: self,
            vertex,
            start,
            next: Some(start),
            steps: 0,
        }
    }

    /// Faces around `vertex`, one per incident edge.
    pub fn vertex_faces(&self, vertex: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.vertex_edges(vertex)
            .map(move |e| self.edge(e).face_leaving(vertex))
    }

    /// Vertices connected to `vertex` by an edge.
    pub fn vertex_neighbors(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_edges(vertex)
            .map(move |e| self.edge(e).other_vertex(vertex))
    }

    pub fn valence(&self, vertex: VertexId) -> usize {
        self.vertex_edges(vertex).count()
    }

    /// The edge joining `a` and `b`, if any.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.vertex_edges(a).find(|&e| self.edge(e).other_vertex(a) == b)
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives;
    use crate::types::{FaceId, VertexId};

    #[test]
    fn test_adjacent_edges_close() {
        let mesh = primitives::icosahedron(1.0);
        for face in mesh.faces() {
            let edges: Vec<_> = mesh.adjacent_edges(face.id, false).collect();
            assert_eq!(edges.len(), 3);
            for e in edges {
                assert!(mesh.edge(e).is_face(face.id));
            }
        }
    }

    #[test]
    fn test_adjacent_edges_from_start() {
        let mesh = primitives::tetrahedron(1.0);
        let all: Vec<_> = mesh.adjacent_edges(FaceId(0), false).collect();
        let rotated: Vec<_> = mesh.adjacent_edges_from(FaceId(0), all[1], false).collect();
        assert_eq!(rotated, vec![all[1], all[2], all[0]]);
    }

    #[test]
    fn test_restart() {
        let mesh = primitives::tetrahedron(1.0);
        let mut iter = mesh.adjacent_vertices(FaceId(1), false);
        let first: Vec<_> = iter.by_ref().collect();
        assert!(iter.next().is_none());
        iter.restart();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_adjacent_faces_are_distinct_neighbours() {
        let mesh = primitives::octahedron(1.0);
        let neighbours: Vec<_> = mesh.adjacent_faces(FaceId(0), false).collect();
        assert_eq!(neighbours.len(), 3);
        assert!(!neighbours.contains(&FaceId(0)));
    }

    #[test]
    fn test_skip_t_edges() {
        let mut mesh = primitives::tetrahedron(1.0);
        let e = mesh.face(FaceId(0)).edge;
        mesh.edges[e.index()].is_t_edge = true;
        assert_eq!(mesh.adjacent_edges(FaceId(0), true).count(), 2);
        assert_eq!(mesh.adjacent_faces(FaceId(0), true).count(), 2);
    }

    #[test]
    fn test_vertex_ring() {
        let mesh = primitives::icosahedron(1.0);
        for v in 0..mesh.vertex_count() {
            let vertex = VertexId(v as u32);
            assert_eq!(mesh.valence(vertex), 5);
            let faces: Vec<_> = mesh.vertex_faces(vertex).collect();
            let mut unique = faces.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), 5);
        }
    }

    #[test]
    fn test_find_edge() {
        let mesh = primitives::tetrahedron(1.0);
        assert!(mesh.find_edge(VertexId(0), VertexId(1)).is_some());
        assert!(mesh.find_edge(VertexId(0), VertexId(0)).is_none());
    }

    #[test]
    #[should_panic]
    fn test_start_edge_not_on_face_faults() {
        let mesh = primitives::octahedron(1.0);
        // Find an edge that does not border face 0
        let foreign = mesh
            .edges()
            .iter()
            .find(|e| !e.is_face(FaceId(0)))
            .map(|e| e.id)
            .unwrap();
        let _ = mesh.adjacent_edges_from(FaceId(0), foreign, false);
    }
}
