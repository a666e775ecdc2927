//! Recording reversible mesh edits.
//!
//! Between [`WingedMesh::begin_capture`] and [`WingedMesh::end_capture`] the
//! mesh remembers the first prior state of every element it hands out
//! mutably, plus the element counts at the start. The resulting
//! [`MeshDelta`] can move the mesh back and forth between the two states.

use std::collections::BTreeMap;

use super::WingedMesh;
use crate::types::{Edge, EdgeId, Face, FaceId, Vertex, VertexId};

/// Live recording state of an open capture
#[derive(Debug, Clone, Default)]
pub(crate) struct Capture {
    vertex_count: usize,
    edge_count: usize,
    face_count: usize,
    vertices: BTreeMap<VertexId, Vertex>,
    edges: BTreeMap<EdgeId, Edge>,
    faces: BTreeMap<FaceId, Face>,
}

impl Capture {
    pub(crate) fn record_vertex(&mut self, arena: &[Vertex], id: VertexId) {
        if id.index() < self.vertex_count {
            self.vertices
                .entry(id)
                .or_insert_with(|| arena[id.index()].clone());
        }
    }

    pub(crate) fn record_edge(&mut self, arena: &[Edge], id: EdgeId) {
        if id.index() < self.edge_count {
            self.edges
                .entry(id)
                .or_insert_with(|| arena[id.index()].clone());
        }
    }

    pub(crate) fn record_face(&mut self, arena: &[Face], id: FaceId) {
        if id.index() < self.face_count {
            self.faces
                .entry(id)
                .or_insert_with(|| arena[id.index()].clone());
        }
    }
}

/// Element records describing one side of a [`MeshDelta`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshState {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub face_count: usize,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub faces: Vec<Face>,
}

/// Prior and resulting state of every element touched by one edit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDelta {
    pub before: MeshState,
    pub after: MeshState,
}

impl MeshDelta {
    /// Whether the edit changed nothing.
    pub fn is_empty(&self) -> bool {
        self.before == self.after
    }

    /// Put the mesh back into the state it had before the edit.
    pub fn revert(&self, mesh: &mut WingedMesh) {
        mesh.apply_state(&self.before);
    }

    /// Put the mesh into the state it had after the edit.
    pub fn apply(&self, mesh: &mut WingedMesh) {
        mesh.apply_state(&self.after);
    }
}

impl WingedMesh {
    /// Start recording edits.
    ///
    /// Panics if a capture is already open.
    pub fn begin_capture(&mut self) {
        assert!(self.capture.is_none(), "mesh capture already open");
        self.capture = Some(Capture {
            vertex_count: self.vertices.len(),
            edge_count: self.edges.len(),
            face_count: self.faces.len(),
            ..Capture::default()
        });
    }

    /// Stop recording and return the delta of everything edited since
    /// [`begin_capture`](Self::begin_capture).
    ///
    /// Panics if no capture is open.
    pub fn end_capture(&mut self) -> MeshDelta {
        let capture = self.capture.take().unwrap_or_else(|| panic!("no mesh capture open"));

        let vertices_after = capture
            .vertices
            .keys()
            .map(|id| id.index())
            .chain(capture.vertex_count..self.vertices.len())
            .map(|i| self.vertices[i].clone())
            .collect();
        let edges_after = capture
            .edges
            .keys()
            .map(|id| id.index())
            .chain(capture.edge_count..self.edges.len())
            .map(|i| self.edges[i].clone())
            .collect();
        let faces_after = capture
            .faces
            .keys()
            .map(|id| id.index())
            .chain(capture.face_count..self.faces.len())
            .map(|i| self.faces[i].clone())
            .collect();

        MeshDelta {
            after: MeshState {
                vertex_count: self.vertices.len(),
                edge_count: self.edges.len(),
                face_count: self.faces.len(),
                vertices: vertices_after,
                edges: edges_after,
                faces: faces_after,
            },
            before: MeshState {
                vertex_count: capture.vertex_count,
                edge_count: capture.edge_count,
                face_count: capture.face_count,
                vertices: capture.vertices.into_values().collect(),
                edges: capture.edges.into_values().collect(),
                faces: capture.faces.into_values().collect(),
            },
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    fn apply_state(&mut self, state: &MeshState) {
        assert!(self.capture.is_none(), "cannot replay a delta while capturing");

        // Drop faces that do not exist in the target state
        for face in self.faces.iter().skip(state.face_count) {
            if let Some(node) = face.index_node {
                self.index.remove(face.id, node);
            }
            self.stale_faces.remove(&face.id);
        }
        self.vertices.truncate(state.vertex_count);
        self.edges.truncate(state.edge_count);
        self.faces.truncate(state.face_count);

        for vertex in &state.vertices {
            restore(&mut self.vertices, vertex.id.index(), vertex.clone());
        }
        for edge in &state.edges {
            restore(&mut self.edges, edge.id.index(), edge.clone());
        }
        for face in &state.faces {
            let mut face = face.clone();
            face.index_node = self.faces.get(face.id.index()).and_then(|f| f.index_node);
            self.stale_faces.insert(face.id);
            restore(&mut self.faces, face.id.index(), face);
        }

        for vertex in &state.vertices {
            let faces: Vec<FaceId> = self.vertex_faces(vertex.id).collect();
            self.stale_faces.extend(faces);
        }
    }
}

/// Overwrite slot `index`, or append when it is the next free slot.
fn restore<T>(arena: &mut Vec<T>, index: usize, value: T) {
    if index < arena.len() {
        arena[index] = value;
    } else {
        assert_eq!(index, arena.len(), "delta records are not contiguous");
        arena.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use glam::Vec3;

    #[test]
    fn test_capture_records_originals() {
        let mut mesh = primitives::octahedron(1.0);
        let original = mesh.vertex(VertexId(0)).position;

        mesh.begin_capture();
        mesh.set_position(VertexId(0), Vec3::new(2.0, 0.0, 0.0));
        mesh.set_position(VertexId(0), Vec3::new(3.0, 0.0, 0.0));
        let delta = mesh.end_capture();

        assert_eq!(delta.before.vertices.len(), 1);
        assert_eq!(delta.before.vertices[0].position, original);
        assert_eq!(delta.after.vertices[0].position, Vec3::new(3.0, 0.0, 0.0));
        assert!(!delta.is_empty());
    }

    #[test]
    fn test_revert_and_apply_subdivision() {
        let mut mesh = primitives::octahedron(1.0);
        let reference = mesh.clone();
        let edge = EdgeId(0);
        let left = mesh.edge(edge).left_face;

        mesh.begin_capture();
        let mid = mesh.edge_midpoint(edge);
        let (m, _) = mesh.insert_vertex_on_edge(edge, mid);
        mesh.realign_face(left);
        let delta = mesh.end_capture();
        let edited = mesh.clone();

        delta.revert(&mut mesh);
        assert_eq!(mesh.vertices(), reference.vertices());
        assert_eq!(mesh.edges(), reference.edges());
        assert_eq!(mesh.face_count(), reference.face_count());
        assert!(mesh.validate().is_ok());

        delta.apply(&mut mesh);
        assert_eq!(mesh.vertices(), edited.vertices());
        assert_eq!(mesh.edges(), edited.edges());
        assert_eq!(mesh.vertex(m).level, 1);
    }

    #[test]
    fn test_empty_capture() {
        let mut mesh = primitives::tetrahedron(1.0);
        mesh.begin_capture();
        let delta = mesh.end_capture();
        assert!(delta.is_empty());
        assert!(!mesh.is_capturing());
    }

    #[test]
    #[should_panic(expected = "already open")]
    fn test_nested_capture_faults() {
        let mut mesh = primitives::tetrahedron(1.0);
        mesh.begin_capture();
        mesh.begin_capture();
    }

    #[test]
    fn test_revert_keeps_index_consistent() {
        let mut mesh = primitives::icosphere(1, 1.0);
        mesh.begin_capture();
        let mid = mesh.edge_midpoint(EdgeId(3));
        let (_, new_edge) = mesh.insert_vertex_on_edge(EdgeId(3), mid);
        let left = mesh.edge(new_edge).left_face;
        mesh.realign_face(left);
        let right = mesh.edge(new_edge).right_face;
        mesh.realign_face(right);
        mesh.refresh_index();
        let delta = mesh.end_capture();

        delta.revert(&mut mesh);
        mesh.refresh_index();
        assert_eq!(mesh.index.len(), mesh.face_count());
    }
}
