//! Validation methods for WingedMesh.
//!
//! Provides mesh validation including:
//! - Wing link consistency on both sides of every edge
//! - Closed boundary cycles for every face
//! - Closed edge rings for every vertex

use super::WingedMesh;
use crate::types::{EdgeId, FaceId, MeshError};

impl WingedMesh {
    /// Debug-only mesh connectivity check.
    ///
    /// Validates that:
    /// 1. Every vertex points at an edge incident to it
    /// 2. Every wing link exists, lies on the same face and chains to the
    ///    right endpoint
    /// 3. Every face points at an edge bordering it
    #[cfg(debug_assertions)]
    pub fn validate_connectivity(&self) -> Result<(), String> {
        for v in &self.vertices {
            let edge = self
                .edges
                .get(v.edge.index())
                .ok_or_else(|| format!("Vertex {:?}: missing edge {:?}", v.id, v.edge))?;
            if !edge.is_vertex(v.id) {
                return Err(format!(
                    "Vertex {:?}: edge {:?} does not touch it",
                    v.id, v.edge
                ));
            }
        }

        for e in &self.edges {
            if e.left_face == e.right_face {
                return Err(format!("Edge {:?}: both sides are face {:?}", e.id, e.left_face));
            }
            for (face, first, last, pred, succ) in [
                (e.left_face, e.vertex1, e.vertex2, e.left_predecessor, e.left_successor),
                (e.right_face, e.vertex2, e.vertex1, e.right_predecessor, e.right_successor),
            ] {
                if face.index() >= self.faces.len() {
                    return Err(format!("Edge {:?}: missing face {:?}", e.id, face));
                }
                let succ_edge = self
                    .edges
                    .get(succ.index())
                    .ok_or_else(|| format!("Edge {:?}: missing successor {:?}", e.id, succ))?;
                let pred_edge = self
                    .edges
                    .get(pred.index())
                    .ok_or_else(|| format!("Edge {:?}: missing predecessor {:?}", e.id, pred))?;
                if !succ_edge.is_face(face) || !pred_edge.is_face(face) {
                    return Err(format!(
                        "Edge {:?}: wings {:?}/{:?} are not on face {:?}",
                        e.id, pred, succ, face
                    ));
                }
                if succ_edge.first_vertex(face) != last || pred_edge.second_vertex(face) != first {
                    return Err(format!(
                        "Edge {:?}: wings {:?}/{:?} do not chain on face {:?}",
                        e.id, pred, succ, face
                    ));
                }
                if succ_edge.predecessor(face) != e.id || pred_edge.successor(face) != e.id {
                    return Err(format!(
                        "Edge {:?}: wings {:?}/{:?} do not link back on face {:?}",
                        e.id, pred, succ, face
                    ));
                }
            }
        }

        for f in &self.faces {
            let edge = self
                .edges
                .get(f.edge.index())
                .ok_or_else(|| format!("Face {:?}: missing edge {:?}", f.id, f.edge))?;
            if !edge.is_face(f.id) {
                return Err(format!("Face {:?}: edge {:?} does not border it", f.id, f.edge));
            }
        }

        Ok(())
    }

    /// Full winged-edge validation.
    ///
    /// Checks wing links, that every face boundary closes with at least three
    /// edges and that every vertex ring closes over all edges incident to the
    /// vertex. Safe to call in release builds.
    pub fn validate(&self) -> Result<(), MeshError> {
        #[cfg(debug_assertions)]
        self.validate_connectivity()
            .map_err(MeshError::InvalidTopology)?;

        for f in &self.faces {
            let count = self.boundary_length(f.id)?;
            if count < 3 {
                return Err(MeshError::InvalidTopology(format!(
                    "Face {:?} has only {} edges",
                    f.id, count
                )));
            }
        }

        let mut incident = vec![0usize; self.vertices.len()];
        for e in &self.edges {
            for vertex in [e.vertex1, e.vertex2] {
                if let Some(count) = incident.get_mut(vertex.index()) {
                    *count += 1;
                }
            }
        }

        for v in &self.vertices {
            let start = v.edge;
            let mut current = start;
            let mut steps = 0;
            loop {
                let edge = self.edges.get(current.index()).ok_or_else(|| {
                    MeshError::InvalidTopology(format!("Vertex {:?}: missing edge {:?}", v.id, current))
                })?;
                if !edge.is_vertex(v.id) {
                    return Err(MeshError::InvalidTopology(format!(
                        "Vertex {:?}: ring reaches edge {:?} not incident to it",
                        v.id, current
                    )));
                }
                let face = edge.face_leaving(v.id);
                current = edge.predecessor(face);
                steps += 1;
                if current == start {
                    break;
                }
                if steps > self.edges.len() {
                    return Err(MeshError::InvalidTopology(format!(
                        "Vertex {:?}: edge ring does not close",
                        v.id
                    )));
                }
            }
            // A ring shorter than the incident edge count leaves a second fan unseen
            if steps != incident[v.id.index()] {
                return Err(MeshError::NonManifoldVertex(v.id.0));
            }
        }

        Ok(())
    }

    /// Number of boundary edges of `face`, or an error if the cycle does not
    /// return to its start.
    fn boundary_length(&self, face: FaceId) -> Result<usize, MeshError> {
        let start = self.faces[face.index()].edge;
        let mut current: EdgeId = start;
        let mut count = 0;
        loop {
            let edge = self.edges.get(current.index()).ok_or_else(|| {
                MeshError::InvalidTopology(format!("Face {:?}: missing edge {:?}", face, current))
            })?;
            if !edge.is_face(face) {
                return Err(MeshError::InvalidTopology(format!(
                    "Face {:?}: boundary reaches edge {:?} not bordering it",
                    face, current
                )));
            }
            count += 1;
            current = edge.successor(face);
            if current == start {
                return Ok(count);
            }
            if count > self.edges.len() {
                return Err(MeshError::InvalidTopology(format!(
                    "Face {:?}: boundary does not close",
                    face
                )));
            }
        }
    }
}
