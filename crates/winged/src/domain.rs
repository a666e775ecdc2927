//! Working set of faces touched by one edit.
//!
//! Faces are added as pending and only become part of the queryable set on
//! [`AffectedFaces::commit`]. This lets a pass iterate the committed faces
//! while collecting the faces it creates.

use std::collections::BTreeSet;

use crate::mesh::WingedMesh;
use crate::types::{EdgeId, FaceId, VertexId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffectedFaces {
    faces: BTreeSet<FaceId>,
    uncommitted: BTreeSet<FaceId>,
}

impl AffectedFaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a face as pending.
    pub fn insert(&mut self, face: FaceId) {
        if !self.faces.contains(&face) {
            self.uncommitted.insert(face);
        }
    }

    /// Add every committed and pending face of `other` as pending.
    pub fn insert_all(&mut self, other: &AffectedFaces) {
        for &face in other.faces.iter().chain(other.uncommitted.iter()) {
            self.insert(face);
        }
    }

    /// Move the pending faces into the committed set.
    pub fn commit(&mut self) {
        self.faces.append(&mut self.uncommitted);
    }

    /// Forget every face.
    pub fn reset(&mut self) {
        self.faces.clear();
        self.uncommitted.clear();
    }

    /// Committed faces.
    pub fn faces(&self) -> &BTreeSet<FaceId> {
        &self.faces
    }

    pub fn uncommitted(&self) -> &BTreeSet<FaceId> {
        &self.uncommitted
    }

    pub fn contains(&self, face: FaceId) -> bool {
        self.faces.contains(&face) || self.uncommitted.contains(&face)
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.uncommitted.is_empty()
    }

    /// Number of committed faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Boundary vertices of the committed faces.
    pub fn vertices(&self, mesh: &WingedMesh) -> BTreeSet<VertexId> {
        self.faces
            .iter()
            .flat_map(|&f| mesh.adjacent_vertices(f, false))
            .collect()
    }

    /// Boundary edges of the committed faces.
    pub fn edges(&self, mesh: &WingedMesh) -> BTreeSet<EdgeId> {
        self.faces
            .iter()
            .flat_map(|&f| mesh.adjacent_edges(f, false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn test_insert_then_commit() {
        let mut domain = AffectedFaces::new();
        domain.insert(FaceId(1));
        domain.insert(FaceId(2));
        assert!(domain.faces().is_empty());
        assert_eq!(domain.uncommitted().len(), 2);
        assert!(domain.contains(FaceId(1)));

        domain.commit();
        assert_eq!(domain.len(), 2);
        assert!(domain.uncommitted().is_empty());
    }

    #[test]
    fn test_insert_committed_face_is_ignored() {
        let mut domain = AffectedFaces::new();
        domain.insert(FaceId(4));
        domain.commit();
        domain.insert(FaceId(4));
        assert!(domain.uncommitted().is_empty());
    }

    #[test]
    fn test_insert_all_and_reset() {
        let mut a = AffectedFaces::new();
        a.insert(FaceId(0));
        a.commit();
        a.insert(FaceId(1));

        let mut b = AffectedFaces::new();
        b.insert_all(&a);
        b.commit();
        assert_eq!(b.len(), 2);

        b.reset();
        assert!(b.is_empty());
    }

    #[test]
    fn test_vertex_and_edge_views() {
        let mesh = primitives::octahedron(1.0);
        let mut domain = AffectedFaces::new();
        domain.insert(FaceId(0));
        domain.commit();
        assert_eq!(domain.vertices(&mesh).len(), 3);
        assert_eq!(domain.edges(&mesh).len(), 3);

        let neighbour = mesh.adjacent_faces(FaceId(0), false).next().unwrap();
        domain.insert(neighbour);
        domain.commit();
        assert_eq!(domain.vertices(&mesh).len(), 4);
        assert_eq!(domain.edges(&mesh).len(), 5);
    }
}
