//! Reversible mesh edits.
//!
//! Each [`Action`] owns exactly the state needed to undo and redo one edit.
//! Simple attribute edits store the old and new value; topology edits store
//! the [`MeshDelta`] recorded while they ran. An [`ActionUnit`] groups the
//! actions of one tool invocation and replays them as a whole.

pub mod history;

use glam::Vec3;
use tracing::trace;
use winged::{AffectedFaces, EdgeId, FaceId, MeshDelta, VertexId, WingedMesh};

pub use history::History;

/// Position change of one vertex
#[derive(Debug, Clone, PartialEq)]
pub struct MoveVertex {
    pub vertex: VertexId,
    pub from: Vec3,
    pub to: Vec3,
}

impl MoveVertex {
    pub fn run(mesh: &mut WingedMesh, vertex: VertexId, to: Vec3) -> Self {
        let from = mesh.position(vertex);
        mesh.set_position(vertex, to);
        Self { vertex, from, to }
    }
}

/// Normal write of one vertex
#[derive(Debug, Clone, PartialEq)]
pub struct WriteNormal {
    pub vertex: VertexId,
    pub from: Vec3,
    pub to: Vec3,
}

impl WriteNormal {
    /// Store the interpolated normal of `vertex`.
    pub fn run(mesh: &mut WingedMesh, vertex: VertexId) -> Self {
        let from = mesh.vertex(vertex).normal;
        let to = mesh.interpolated_normal(vertex);
        mesh.set_normal(vertex, to);
        Self { vertex, from, to }
    }
}

/// Midpoint split of one edge, both incident triangles split through the
/// new vertex
#[derive(Debug, Clone, PartialEq)]
pub struct SubdivideEdge {
    pub edge: EdgeId,
    pub vertex: VertexId,
    /// The four triangles around the new vertex
    pub faces: [FaceId; 4],
    pub delta: MeshDelta,
}

impl SubdivideEdge {
    /// Split `edge` at its midpoint.
    ///
    /// Connectors in faces outside `working` are marked as T-edges. The new
    /// vertex gets its interpolated normal right away.
    ///
    /// Panics if either incident face is not a triangle.
    pub fn run(mesh: &mut WingedMesh, edge: EdgeId, working: &AffectedFaces) -> Self {
        let (left, right) = (mesh.edge(edge).left_face, mesh.edge(edge).right_face);
        assert!(
            mesh.is_triangle(left) && mesh.is_triangle(right),
            "cannot subdivide edge {:?}: incident faces are not triangles",
            edge
        );

        mesh.begin_capture();
        let midpoint = mesh.edge_midpoint(edge);
        let (vertex, new_edge) = mesh.insert_vertex_on_edge(edge, midpoint);

        // Left face now walks v1 -> m -> v2 -> c
        let c = mesh
            .edge(mesh.edge(new_edge).left_successor)
            .second_vertex(left);
        let left_t = !working.contains(left);
        let (left_connector, left_split) = mesh.split_face(left, vertex, c, left_t);

        // Right face now walks v2 -> m -> v1 -> d
        let d = mesh
            .edge(mesh.edge(edge).right_successor)
            .second_vertex(right);
        let right_t = !working.contains(right);
        let (right_connector, right_split) = mesh.split_face(right, vertex, d, right_t);

        let t_edge = match (left_t, right_t) {
            (true, _) => Some(left_connector),
            (_, true) => Some(right_connector),
            _ => None,
        };
        mesh.set_t_edge(vertex, t_edge);
        let normal = mesh.interpolated_normal(vertex);
        mesh.set_normal(vertex, normal);
        let delta = mesh.end_capture();

        trace!(
            "subdivide_edge: {:?} -> vertex {:?}, t_edge={:?}",
            edge, vertex, t_edge
        );
        Self {
            edge,
            vertex,
            faces: [left, left_split, right, right_split],
            delta,
        }
    }
}

/// Quality-improving flip of one edge
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxEdge {
    pub edge: EdgeId,
    pub delta: MeshDelta,
}

impl RelaxEdge {
    pub fn run(mesh: &mut WingedMesh, edge: EdgeId) -> Self {
        mesh.begin_capture();
        mesh.flip_edge(edge);
        let delta = mesh.end_capture();
        Self { edge, delta }
    }
}

/// Simultaneous position change of a vertex set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothVertices {
    pub moves: Vec<MoveVertex>,
}

impl SmoothVertices {
    /// Move every vertex to its target position.
    pub fn run(mesh: &mut WingedMesh, targets: &[(VertexId, Vec3)]) -> Self {
        let moves = targets
            .iter()
            .map(|&(vertex, to)| MoveVertex::run(mesh, vertex, to))
            .collect();
        Self { moves }
    }
}

/// Re-triangulation of one face with its T markers cleared
#[derive(Debug, Clone, PartialEq)]
pub struct RealignFace {
    pub face: FaceId,
    /// `face` followed by the triangles split off it
    pub faces: Vec<FaceId>,
    pub delta: MeshDelta,
}

impl RealignFace {
    pub fn run(mesh: &mut WingedMesh, face: FaceId) -> Self {
        mesh.begin_capture();
        let faces = mesh.realign_face(face);
        let delta = mesh.end_capture();
        Self { face, faces, delta }
    }
}

/// A single reversible edit
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MoveVertex(MoveVertex),
    SubdivideEdge(SubdivideEdge),
    RelaxEdge(RelaxEdge),
    SmoothVertices(SmoothVertices),
    WriteNormal(WriteNormal),
    RealignFace(RealignFace),
}

impl Action {
    /// Reverse the effect of this action.
    pub fn undo(&self, mesh: &mut WingedMesh) {
        match self {
            Action::MoveVertex(a) => mesh.set_position(a.vertex, a.from),
            Action::SubdivideEdge(a) => a.delta.revert(mesh),
            Action::RelaxEdge(a) => a.delta.revert(mesh),
            Action::SmoothVertices(a) => {
                for m in a.moves.iter().rev() {
                    mesh.set_position(m.vertex, m.from);
                }
            }
            Action::WriteNormal(a) => mesh.set_normal(a.vertex, a.from),
            Action::RealignFace(a) => a.delta.revert(mesh),
        }
    }

    /// Reapply the effect of this action.
    pub fn redo(&self, mesh: &mut WingedMesh) {
        match self {
            Action::MoveVertex(a) => mesh.set_position(a.vertex, a.to),
            Action::SubdivideEdge(a) => a.delta.apply(mesh),
            Action::RelaxEdge(a) => a.delta.apply(mesh),
            Action::SmoothVertices(a) => {
                for m in &a.moves {
                    mesh.set_position(m.vertex, m.to);
                }
            }
            Action::WriteNormal(a) => mesh.set_normal(a.vertex, a.to),
            Action::RealignFace(a) => a.delta.apply(mesh),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::MoveVertex(_) => ActionKind::MoveVertex,
            Action::SubdivideEdge(_) => ActionKind::SubdivideEdge,
            Action::RelaxEdge(_) => ActionKind::RelaxEdge,
            Action::SmoothVertices(_) => ActionKind::SmoothVertices,
            Action::WriteNormal(_) => ActionKind::WriteNormal,
            Action::RealignFace(_) => ActionKind::RealignFace,
        }
    }
}

/// Discriminant of an [`Action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    MoveVertex,
    SubdivideEdge,
    RelaxEdge,
    SmoothVertices,
    WriteNormal,
    RealignFace,
}

macro_rules! impl_from_record {
    ($($record:ident),*) => {
        $(
            impl From<$record> for Action {
                fn from(record: $record) -> Self {
                    Action::$record(record)
                }
            }
        )*
    };
}

impl_from_record!(MoveVertex, SubdivideEdge, RelaxEdge, SmoothVertices, WriteNormal, RealignFace);

/// Ordered group of actions undone and redone as a whole
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionUnit {
    actions: Vec<Action>,
}

impl ActionUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already applied action.
    pub fn push(&mut self, action: impl Into<Action>) {
        self.actions.push(action.into());
    }

    /// Append every action of `other`, keeping their order.
    pub fn append(&mut self, other: ActionUnit) {
        self.actions.extend(other.actions);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of actions of the given kind.
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind() == kind).count()
    }

    /// Undo every action, last first.
    pub fn undo(&self, mesh: &mut WingedMesh) {
        for action in self.actions.iter().rev() {
            action.undo(mesh);
        }
        mesh.refresh_index();
    }

    /// Redo every action, first first.
    pub fn redo(&self, mesh: &mut WingedMesh) {
        for action in &self.actions {
            action.redo(mesh);
        }
        mesh.refresh_index();
    }
}
