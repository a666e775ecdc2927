//! Construction methods for WingedMesh.

use glam::Vec3;
use std::collections::{BTreeSet, HashMap};

use super::WingedMesh;
use crate::spatial::{FaceIndex, IndexConfig};
use crate::types::{Edge, EdgeId, Face, FaceId, MeshError, Vertex, VertexId};

/// Placeholder for a face slot that has not been linked yet
const UNSET_FACE: FaceId = FaceId(u32::MAX);

impl WingedMesh {
    /// Build a winged mesh from an indexed triangle list.
    ///
    /// The surface must be a closed, consistently oriented 2-manifold: every
    /// edge is shared by exactly two triangles that walk it in opposite
    /// directions.
    pub fn from_triangles(positions: &[Vec3], indices: &[u32]) -> Result<Self, MeshError> {
        Self::from_triangles_with_config(positions, indices, IndexConfig::default())
    }

    /// Build a winged mesh with a custom spatial index configuration.
    pub fn from_triangles_with_config(
        positions: &[Vec3],
        indices: &[u32],
        index_config: IndexConfig,
    ) -> Result<Self, MeshError> {
        if indices.is_empty() {
            return Err(MeshError::NoTriangles);
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexCount(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                len: positions.len(),
            });
        }

        let mut edges: Vec<Edge> = Vec::new();
        let mut faces: Vec<Face> = Vec::new();
        let mut face_edges: Vec<[EdgeId; 3]> = Vec::new();
        let mut vertex_edge: Vec<Option<EdgeId>> = vec![None; positions.len()];
        // Undirected (min, max) vertex pair to edge
        let mut edge_map: HashMap<(u32, u32), EdgeId> = HashMap::new();

        for (tri_idx, tri) in indices.chunks(3).enumerate() {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            if a == b || b == c || a == c {
                return Err(MeshError::DegenerateTriangle(tri_idx));
            }
            let (pa, pb, pc) = (
                positions[a as usize],
                positions[b as usize],
                positions[c as usize],
            );
            if (pb - pa).cross(pc - pa).length_squared() <= f32::EPSILON * f32::EPSILON {
                return Err(MeshError::DegenerateTriangle(tri_idx));
            }

            let face_id = FaceId(faces.len() as u32);
            let mut ids = [EdgeId(0); 3];

            for (slot, (from, to)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
                let key = (from.min(to), from.max(to));
                let edge_id = match edge_map.get(&key) {
                    Some(&existing) => {
                        let edge = &mut edges[existing.index()];
                        if edge.right_face != UNSET_FACE {
                            return Err(MeshError::NonManifoldEdge(key.0, key.1));
                        }
                        if edge.vertex1 != VertexId(to) || edge.vertex2 != VertexId(from) {
                            return Err(MeshError::InvalidTopology(format!(
                                "triangle {} walks edge {}-{} in the same direction as its neighbour",
                                tri_idx, from, to
                            )));
                        }
                        edge.right_face = face_id;
                        existing
                    }
                    None => {
                        let id = EdgeId(edges.len() as u32);
                        edges.push(Edge {
                            id,
                            vertex1: VertexId(from),
                            vertex2: VertexId(to),
                            left_face: face_id,
                            right_face: UNSET_FACE,
                            // Wings are linked in the second pass
                            left_predecessor: id,
                            left_successor: id,
                            right_predecessor: id,
                            right_successor: id,
                            is_t_edge: false,
                        });
                        edge_map.insert(key, id);
                        id
                    }
                };
                ids[slot] = edge_id;
                vertex_edge[from as usize].get_or_insert(edge_id);
            }

            faces.push(Face {
                id: face_id,
                edge: ids[0],
                first_index_number: face_id.0 * 3,
                index_node: None,
            });
            face_edges.push(ids);
        }

        // Second pass: link the wings of every face cycle
        for (face_idx, ids) in face_edges.iter().enumerate() {
            let face_id = FaceId(face_idx as u32);
            for i in 0..3 {
                let predecessor = ids[(i + 2) % 3];
                let successor = ids[(i + 1) % 3];
                edges[ids[i].index()].set_side(face_id, face_id, predecessor, successor);
            }
        }

        if let Some(open) = edges.iter().find(|e| e.right_face == UNSET_FACE) {
            return Err(MeshError::OpenBoundary(open.vertex1.0, open.vertex2.0));
        }

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let edge = vertex_edge[i].ok_or_else(|| {
                    MeshError::InvalidTopology(format!("vertex {} is not used by any triangle", i))
                })?;
                Ok(Vertex {
                    id: VertexId(i as u32),
                    position,
                    normal: Vec3::ZERO,
                    edge,
                    t_edge: None,
                    level: 0,
                })
            })
            .collect::<Result<Vec<_>, MeshError>>()?;

        let mut mesh = Self {
            vertices,
            edges,
            faces,
            index: FaceIndex::new(index_config),
            stale_faces: BTreeSet::new(),
            capture: None,
        };

        mesh.validate()?;

        for i in 0..mesh.vertices.len() {
            let normal = mesh.interpolated_normal(VertexId(i as u32));
            mesh.vertices[i].normal = normal;
        }
        mesh.rebuild_index();

        tracing::debug!(
            "from_triangles: {} vertices, {} edges, {} faces",
            mesh.vertices.len(),
            mesh.edges.len(),
            mesh.faces.len()
        );

        Ok(mesh)
    }
}
