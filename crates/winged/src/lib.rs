//! Winged-edge triangle meshes for freeform sculpting.
//!
//! This crate provides the mesh representation the carve pipeline edits:
//! - [`types`] - Vertex, edge and face records with their ids
//! - [`mesh`] - The [`WingedMesh`] arena with adjacency traversal, geometric
//!   face queries, topology edits and render buffer writes
//! - [`spatial`] - Face octree and sphere/triangle tests
//! - [`domain`] - [`AffectedFaces`], the working set of one edit
//! - [`primitives`] - Closed starting surfaces
//!
//! Edits are made reversible by wrapping them in
//! [`WingedMesh::begin_capture`] / [`WingedMesh::end_capture`], which yields
//! a [`MeshDelta`] that can revert or reapply them.

pub mod domain;
pub mod mesh;
pub mod primitives;
pub mod spatial;
pub mod types;

pub use domain::AffectedFaces;
pub use mesh::{
    incircle_radius, AdjacentEdges, AdjacentFaces, AdjacentVertices, GpuVertex, MeshBuffers,
    MeshDelta, MeshState, VertexEdges, WingedMesh,
};
pub use spatial::{Aabb, FaceIndex, IndexConfig, NodeId, Sphere};
pub use types::{Edge, EdgeId, Face, FaceId, MeshError, Vertex, VertexId};
