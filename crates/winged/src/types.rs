//! Type definitions for the winged-edge mesh data structure.
//!
//! Elements live in flat arenas owned by [`WingedMesh`](crate::WingedMesh) and
//! refer to each other by id. Conventions for an edge `e = (vertex1, vertex2)`:
//!
//! - the **left** face walks `e` from `vertex1` to `vertex2`
//! - the **right** face walks `e` from `vertex2` to `vertex1`
//! - `*_successor` is the next edge of that face's boundary cycle,
//!   `*_predecessor` the previous one

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::spatial::NodeId;

/// Type-safe vertex identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// Type-safe edge identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

/// Type-safe face identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u32);

impl VertexId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FaceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A vertex in the winged-edge mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub position: Vec3,
    /// Cached normal, written back by the finalize step
    pub normal: Vec3,
    /// One incident edge (arbitrary choice)
    pub edge: EdgeId,
    /// Set while this vertex is an unresolved subdivision junction
    pub t_edge: Option<EdgeId>,
    /// Subdivision depth (0 for vertices of the original surface)
    pub level: u32,
}

impl Vertex {
    pub fn is_t_vertex(&self) -> bool {
        self.t_edge.is_some()
    }
}

/// An edge with its two faces and four wings
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub vertex1: VertexId,
    pub vertex2: VertexId,
    pub left_face: FaceId,
    pub right_face: FaceId,
    pub left_predecessor: EdgeId,
    pub left_successor: EdgeId,
    pub right_predecessor: EdgeId,
    pub right_successor: EdgeId,
    /// Marks a connector created by subdivision in a face outside the
    /// refinement working set
    pub is_t_edge: bool,
}

impl Edge {
    /// Whether `face` is one of the two faces of this edge.
    pub fn is_face(&self, face: FaceId) -> bool {
        self.left_face == face || self.right_face == face
    }

    pub fn is_vertex(&self, vertex: VertexId) -> bool {
        self.vertex1 == vertex || self.vertex2 == vertex
    }

    fn assert_face(&self, face: FaceId) {
        assert!(
            self.is_face(face),
            "edge {:?} is not adjacent to face {:?} (left {:?}, right {:?})",
            self.id,
            face,
            self.left_face,
            self.right_face
        );
    }

    /// First vertex of this edge when walking the boundary of `face`.
    pub fn first_vertex(&self, face: FaceId) -> VertexId {
        self.assert_face(face);
        if self.left_face == face { self.vertex1 } else { self.vertex2 }
    }

    /// Second vertex of this edge when walking the boundary of `face`.
    pub fn second_vertex(&self, face: FaceId) -> VertexId {
        self.assert_face(face);
        if self.left_face == face { self.vertex2 } else { self.vertex1 }
    }

    pub fn successor(&self, face: FaceId) -> EdgeId {
        self.assert_face(face);
        if self.left_face == face { self.left_successor } else { self.right_successor }
    }

    pub fn predecessor(&self, face: FaceId) -> EdgeId {
        self.assert_face(face);
        if self.left_face == face { self.left_predecessor } else { self.right_predecessor }
    }

    /// The face on the other side of `face`.
    pub fn other_face(&self, face: FaceId) -> FaceId {
        self.assert_face(face);
        if self.left_face == face { self.right_face } else { self.left_face }
    }

    /// The endpoint that is not `vertex`.
    pub fn other_vertex(&self, vertex: VertexId) -> VertexId {
        assert!(
            self.is_vertex(vertex),
            "edge {:?} is not incident to vertex {:?}",
            self.id,
            vertex
        );
        if self.vertex1 == vertex { self.vertex2 } else { self.vertex1 }
    }

    /// The face whose boundary walk leaves `vertex` along this edge.
    pub fn face_leaving(&self, vertex: VertexId) -> FaceId {
        if self.vertex1 == vertex {
            self.left_face
        } else {
            assert!(
                self.vertex2 == vertex,
                "edge {:?} is not incident to vertex {:?}",
                self.id,
                vertex
            );
            self.right_face
        }
    }

    /// Rewire the side belonging to `old_face` to a (possibly new) face and wings.
    pub(crate) fn set_side(&mut self, old_face: FaceId, face: FaceId, predecessor: EdgeId, successor: EdgeId) {
        self.assert_face(old_face);
        if self.left_face == old_face {
            self.left_face = face;
            self.left_predecessor = predecessor;
            self.left_successor = successor;
        } else {
            self.right_face = face;
            self.right_predecessor = predecessor;
            self.right_successor = successor;
        }
    }

    pub(crate) fn set_successor(&mut self, face: FaceId, successor: EdgeId) {
        self.assert_face(face);
        if self.left_face == face {
            self.left_successor = successor;
        } else {
            self.right_successor = successor;
        }
    }

    pub(crate) fn set_predecessor(&mut self, face: FaceId, predecessor: EdgeId) {
        self.assert_face(face);
        if self.left_face == face {
            self.left_predecessor = predecessor;
        } else {
            self.right_predecessor = predecessor;
        }
    }

    pub(crate) fn set_face(&mut self, old_face: FaceId, face: FaceId) {
        self.assert_face(old_face);
        if self.left_face == old_face {
            self.left_face = face;
        } else {
            self.right_face = face;
        }
    }
}

/// A face (polygon) in the mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub id: FaceId,
    /// One edge on the boundary of this face
    pub edge: EdgeId,
    /// Offset of this face's three indices in the render index buffer
    pub first_index_number: u32,
    /// Spatial index node currently holding this face
    pub index_node: Option<NodeId>,
}

/// Errors that can occur while building a winged-edge mesh
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Mesh has no triangles")]
    NoTriangles,
    #[error("Index count {0} is not divisible by 3")]
    IndexCount(usize),
    #[error("Vertex index {index} out of range ({len} positions)")]
    IndexOutOfRange { index: u32, len: usize },
    #[error("Triangle {0} is degenerate")]
    DegenerateTriangle(usize),
    #[error("Non-manifold edge between vertices {0} and {1}")]
    NonManifoldEdge(u32, u32),
    #[error("Vertex {0} joins more than one fan of faces")]
    NonManifoldVertex(u32),
    #[error("Open boundary edge between vertices {0} and {1}")]
    OpenBoundary(u32, u32),
    #[error("Invalid mesh topology: {0}")]
    InvalidTopology(String),
}
