//! Element accessors for WingedMesh.
//!
//! Lookups by id fault on an unknown id: ids are only ever produced by the
//! mesh itself, so a miss means a broken caller.

use super::WingedMesh;
use crate::types::{Edge, EdgeId, Face, FaceId, Vertex, VertexId};

impl WingedMesh {
    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get vertex by ID
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        self.vertices
            .get(id.index())
            .unwrap_or_else(|| panic!("unknown vertex {:?}", id))
    }

    /// Get edge by ID
    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.edges
            .get(id.index())
            .unwrap_or_else(|| panic!("unknown edge {:?}", id))
    }

    /// Get face by ID
    pub fn face(&self, id: FaceId) -> &Face {
        self.faces
            .get(id.index())
            .unwrap_or_else(|| panic!("unknown face {:?}", id))
    }

    /// Get all vertices
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Get all edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Get all faces
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.iter().map(|f| f.id)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().map(|e| e.id)
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().map(|v| v.id)
    }

    // ========================================================================
    // Mutable access (recorded while a capture is open)
    // ========================================================================

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        if let Some(capture) = self.capture.as_mut() {
            capture.record_vertex(&self.vertices, id);
        }
        &mut self.vertices[id.index()]
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        if let Some(capture) = self.capture.as_mut() {
            capture.record_edge(&self.edges, id);
        }
        &mut self.edges[id.index()]
    }

    pub(crate) fn face_mut(&mut self, id: FaceId) -> &mut Face {
        if let Some(capture) = self.capture.as_mut() {
            capture.record_face(&self.faces, id);
        }
        self.stale_faces.insert(id);
        &mut self.faces[id.index()]
    }

    /// Id the next pushed vertex will get.
    pub(crate) fn next_vertex_id(&self) -> VertexId {
        VertexId(self.vertices.len() as u32)
    }

    pub(crate) fn next_edge_id(&self) -> EdgeId {
        EdgeId(self.edges.len() as u32)
    }

    pub(crate) fn next_face_id(&self) -> FaceId {
        FaceId(self.faces.len() as u32)
    }

    pub(crate) fn push_vertex(&mut self, vertex: Vertex) -> VertexId {
        let id = self.next_vertex_id();
        debug_assert_eq!(vertex.id, id);
        self.vertices.push(vertex);
        id
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) -> EdgeId {
        let id = self.next_edge_id();
        debug_assert_eq!(edge.id, id);
        self.edges.push(edge);
        id
    }

    pub(crate) fn push_face(&mut self, face: Face) -> FaceId {
        let id = self.next_face_id();
        debug_assert_eq!(face.id, id);
        self.faces.push(face);
        self.stale_faces.insert(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives;
    use crate::types::{EdgeId, VertexId};

    #[test]
    fn test_ids_match_positions() {
        let mesh = primitives::icosahedron(1.0);
        for (i, v) in mesh.vertices().iter().enumerate() {
            assert_eq!(v.id.index(), i);
        }
        for (i, e) in mesh.edges().iter().enumerate() {
            assert_eq!(e.id.index(), i);
        }
        assert_eq!(mesh.face_ids().count(), 20);
    }

    #[test]
    #[should_panic(expected = "unknown vertex")]
    fn test_unknown_vertex_faults() {
        let mesh = primitives::tetrahedron(1.0);
        let _ = mesh.vertex(VertexId(99));
    }

    #[test]
    #[should_panic(expected = "unknown edge")]
    fn test_unknown_edge_faults() {
        let mesh = primitives::tetrahedron(1.0);
        let _ = mesh.edge(EdgeId(99));
    }
}
