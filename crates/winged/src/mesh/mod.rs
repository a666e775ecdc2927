//! Winged-edge mesh data structure
//!
//! Elements are stored in flat arenas and never removed: edits only append
//! new elements or rewire existing ones. This keeps ids stable for the whole
//! lifetime of the mesh, which the action history relies on.

mod adjacency;
mod buffers;
mod capture;
mod construction;
mod geometry;
mod intersection;
mod modification;
mod topology;
mod validation;

use std::collections::BTreeSet;

pub use adjacency::{AdjacentEdges, AdjacentFaces, AdjacentVertices, VertexEdges};
pub use buffers::{GpuVertex, MeshBuffers};
pub use capture::{MeshDelta, MeshState};
pub use geometry::incircle_radius;

use crate::spatial::FaceIndex;
use crate::types::{Edge, Face, FaceId, Vertex};

/// Winged-edge mesh
///
/// Owns all vertices, edges and faces plus the spatial index used by
/// [`WingedMesh::intersects`].
#[derive(Debug, Clone)]
pub struct WingedMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) faces: Vec<Face>,
    pub(crate) index: FaceIndex,
    /// Faces whose spatial index placement is out of date
    pub(crate) stale_faces: BTreeSet<FaceId>,
    pub(crate) capture: Option<capture::Capture>,
}
