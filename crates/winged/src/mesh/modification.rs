//! Mesh modification operations.
//!
//! Every mutation goes through the capture-aware accessors so that an open
//! capture sees the prior state of each touched element.

use glam::Vec3;
use std::collections::BTreeSet;
use tracing::{debug, trace};

use super::WingedMesh;
use crate::spatial::Aabb;
use crate::types::{Edge, EdgeId, Face, FaceId, Vertex, VertexId};

impl WingedMesh {
    // ========================================================================
    // Attribute edits
    // ========================================================================

    pub fn set_position(&mut self, vertex: VertexId, position: Vec3) {
        self.vertex_mut(vertex).position = position;
        let faces: Vec<FaceId> = self.vertex_faces(vertex).collect();
        self.stale_faces.extend(faces);
    }

    pub fn set_normal(&mut self, vertex: VertexId, normal: Vec3) {
        self.vertex_mut(vertex).normal = normal;
    }

    /// Mark `vertex` as an unresolved junction of `t_edge`, or clear the mark.
    pub fn set_t_edge(&mut self, vertex: VertexId, t_edge: Option<EdgeId>) {
        self.vertex_mut(vertex).t_edge = t_edge;
    }

    pub fn set_first_index_number(&mut self, face: FaceId, first_index_number: u32) {
        if self.face(face).first_index_number != first_index_number {
            self.face_mut(face).first_index_number = first_index_number;
        }
    }

    // ========================================================================
    // Topology edits
    // ========================================================================

    /// Insert a new vertex at `position` on `edge`.
    ///
    /// `edge = (v1, v2)` becomes `(v1, m)` and a new edge `(m, v2)` is added.
    /// Both incident faces gain one boundary edge. The new vertex starts out
    /// as a T-vertex one level above the deeper endpoint.
    pub fn insert_vertex_on_edge(&mut self, edge: EdgeId, position: Vec3) -> (VertexId, EdgeId) {
        let e = self.edge(edge).clone();
        let new_vertex = self.next_vertex_id();
        let new_edge = self.next_edge_id();
        let level = self.vertex(e.vertex1).level.max(self.vertex(e.vertex2).level) + 1;
        let normal = self.vertex(e.vertex1).normal;

        // Left face walks v1 -> m -> v2, right face walks v2 -> m -> v1
        self.push_edge(Edge {
            id: new_edge,
            vertex1: new_vertex,
            vertex2: e.vertex2,
            left_face: e.left_face,
            right_face: e.right_face,
            left_predecessor: edge,
            left_successor: e.left_successor,
            right_predecessor: e.right_predecessor,
            right_successor: edge,
            is_t_edge: false,
        });
        self.push_vertex(Vertex {
            id: new_vertex,
            position,
            normal,
            edge: new_edge,
            t_edge: Some(new_edge),
            level,
        });

        self.edge_mut(e.left_successor).set_predecessor(e.left_face, new_edge);
        self.edge_mut(e.right_predecessor).set_successor(e.right_face, new_edge);
        {
            let old = self.edge_mut(edge);
            old.vertex2 = new_vertex;
            old.left_successor = new_edge;
            old.right_predecessor = new_edge;
        }
        if self.vertex(e.vertex2).edge == edge {
            self.vertex_mut(e.vertex2).edge = new_edge;
        }

        trace!(
            "insert_vertex_on_edge: {:?} split at {:?} (level {})",
            edge, new_vertex, level
        );
        (new_vertex, new_edge)
    }

    /// Split `face` by a new edge from `u` to `w`.
    ///
    /// `face` keeps the part walking `u -> w -> ... -> u`, the new face gets
    /// `w -> u -> ... -> w`. Panics if `u` and `w` are not distinct,
    /// non-consecutive boundary vertices of `face`.
    pub fn split_face(&mut self, face: FaceId, u: VertexId, w: VertexId, is_t_edge: bool) -> (EdgeId, FaceId) {
        let leaving = |mesh: &Self, vertex: VertexId| {
            mesh.adjacent_edges(face, false)
                .find(|&e| mesh.edge(e).first_vertex(face) == vertex)
                .unwrap_or_else(|| panic!("vertex {:?} is not on face {:?}", vertex, face))
        };
        let s_u = leaving(self, u);
        let s_w = leaving(self, w);
        assert!(
            u != w && self.edge(s_u).second_vertex(face) != w && self.edge(s_w).second_vertex(face) != u,
            "cannot split face {:?} between {:?} and {:?}",
            face,
            u,
            w
        );
        let p_u = self.edge(s_u).predecessor(face);
        let p_w = self.edge(s_w).predecessor(face);

        // Edges moving to the new face: s_u .. p_w
        let moved: Vec<EdgeId> = self
            .adjacent_edges_from(face, s_u, false)
            .take_while(|&e| e != s_w)
            .collect();

        let new_edge = self.next_edge_id();
        let new_face = self.next_face_id();

        self.push_edge(Edge {
            id: new_edge,
            vertex1: u,
            vertex2: w,
            left_face: face,
            right_face: new_face,
            left_predecessor: p_u,
            left_successor: s_w,
            right_predecessor: p_w,
            right_successor: s_u,
            is_t_edge,
        });
        self.push_face(Face {
            id: new_face,
            edge: new_edge,
            first_index_number: new_face.0 * 3,
            index_node: None,
        });

        self.edge_mut(p_u).set_successor(face, new_edge);
        self.edge_mut(s_w).set_predecessor(face, new_edge);
        self.edge_mut(p_w).set_successor(face, new_edge);
        self.edge_mut(s_u).set_predecessor(face, new_edge);
        for e in moved {
            self.edge_mut(e).set_face(face, new_face);
        }
        self.face_mut(face).edge = new_edge;

        trace!(
            "split_face: {:?} split by {:?} ({:?}-{:?}) into {:?}",
            face, new_edge, u, w, new_face
        );
        (new_edge, new_face)
    }

    /// Whether `edge` can be flipped without breaking the mesh.
    ///
    /// Requires two triangles, distinct opposite vertices that are not
    /// already connected, endpoint valence above three, and a flipped pair
    /// that neither degenerates nor folds over.
    pub fn can_flip_edge(&self, edge: EdgeId) -> bool {
        let e = self.edge(edge);
        if e.is_t_edge || !self.is_triangle(e.left_face) || !self.is_triangle(e.right_face) {
            return false;
        }
        let (a, b) = (e.vertex1, e.vertex2);
        let c = self.edge(e.left_successor).second_vertex(e.left_face);
        let d = self.edge(e.right_successor).second_vertex(e.right_face);
        if c == d || self.find_edge(c, d).is_some() {
            return false;
        }
        if self.valence(a) <= 3 || self.valence(b) <= 3 {
            return false;
        }

        let (pa, pb, pc, pd) = (self.position(a), self.position(b), self.position(c), self.position(d));
        let before = (pb - pa).cross(pc - pa) + (pa - pb).cross(pd - pb);
        // Flipped triangles (c, d, b) and (d, c, a)
        let left = (pd - pc).cross(pb - pc);
        let right = (pc - pd).cross(pa - pd);
        let min_area = f32::EPSILON * before.length().max(f32::EPSILON);
        left.length() > min_area
            && right.length() > min_area
            && left.dot(before) > 0.0
            && right.dot(before) > 0.0
    }

    /// Rotate `edge = (a, b)` between triangles `(a, b, c)` and `(b, a, d)`
    /// so that it joins `c` and `d`.
    ///
    /// Panics if either incident face is not a triangle. Use
    /// [`can_flip_edge`](Self::can_flip_edge) to check validity first.
    pub fn flip_edge(&mut self, edge: EdgeId) {
        let e = self.edge(edge).clone();
        let (left, right) = (e.left_face, e.right_face);
        assert!(
            self.is_triangle(left) && self.is_triangle(right),
            "cannot flip edge {:?}: incident faces are not triangles",
            edge
        );
        let (l1, l2) = (e.left_successor, e.left_predecessor);
        let (r1, r2) = (e.right_successor, e.right_predecessor);
        let c = self.edge(l1).second_vertex(left);
        let d = self.edge(r1).second_vertex(right);

        {
            let flipped = self.edge_mut(edge);
            flipped.vertex1 = c;
            flipped.vertex2 = d;
            flipped.left_successor = r2;
            flipped.left_predecessor = l1;
            flipped.right_successor = l2;
            flipped.right_predecessor = r1;
        }
        {
            let l1_edge = self.edge_mut(l1);
            l1_edge.set_predecessor(left, r2);
            l1_edge.set_successor(left, edge);
        }
        self.edge_mut(r2).set_side(right, left, edge, l1);
        self.edge_mut(l2).set_side(left, right, edge, r1);
        {
            let r1_edge = self.edge_mut(r1);
            r1_edge.set_predecessor(right, l2);
            r1_edge.set_successor(right, edge);
        }

        self.face_mut(left).edge = edge;
        self.face_mut(right).edge = edge;
        if self.vertex(e.vertex1).edge == edge {
            self.vertex_mut(e.vertex1).edge = l2;
        }
        if self.vertex(e.vertex2).edge == edge {
            self.vertex_mut(e.vertex2).edge = l1;
        }

        trace!("flip_edge: {:?} now joins {:?}-{:?}", edge, c, d);
    }

    /// Re-triangulate `face` and clear its T markers.
    ///
    /// Faces with more than three boundary edges are fanned out from their
    /// highest-level vertex. `face` keeps one of the triangles. Returns every
    /// resulting face, `face` first.
    pub fn realign_face(&mut self, face: FaceId) -> Vec<FaceId> {
        let mut result = vec![face];
        let pivot = self.highest_level_vertex(face);
        while self.num_edges(face) > 3 {
            let start = self
                .adjacent_edges(face, false)
                .find(|&e| self.edge(e).first_vertex(face) == pivot)
                .unwrap_or_else(|| panic!("pivot {:?} left face {:?}", pivot, face));
            let target = self
                .adjacent_vertices_from(face, start, false)
                .nth(2)
                .unwrap_or_else(|| panic!("face {:?} has fewer than three vertices", face));
            let (_, split) = self.split_face(face, pivot, target, false);
            result.push(split);
        }

        for &f in &result {
            let edges: Vec<EdgeId> = self.adjacent_edges(f, false).collect();
            for e in edges {
                if self.edge(e).is_t_edge {
                    self.edge_mut(e).is_t_edge = false;
                }
            }
            let vertices: Vec<VertexId> = self.adjacent_vertices(f, false).collect();
            for v in vertices {
                if self.vertex(v).is_t_vertex() {
                    self.vertex_mut(v).t_edge = None;
                }
            }
            self.set_first_index_number(f, f.0 * 3);
            self.stale_faces.insert(f);
        }

        if result.len() > 1 {
            debug!("realign_face: {:?} split into {} triangles", face, result.len());
        }
        result
    }

    // ========================================================================
    // Spatial index maintenance
    // ========================================================================

    /// Reinsert every face whose placement may be out of date.
    ///
    /// Returns the number of faces reinserted.
    pub fn refresh_index(&mut self) -> usize {
        let stale = std::mem::take(&mut self.stale_faces);
        let count = stale.len();
        for face in stale {
            if face.index() >= self.faces.len() {
                continue;
            }
            if let Some(node) = self.faces[face.index()].index_node {
                self.index.remove(face, node);
            }
            let aabb = self.face_aabb(face);
            let node = self.index.insert(face, &aabb);
            self.faces[face.index()].index_node = Some(node);
        }
        trace!("refresh_index: {} faces reinserted", count);
        count
    }

    /// Rebuild the spatial index from scratch around the current surface.
    pub fn rebuild_index(&mut self) {
        let bounds = Aabb::from_points(self.vertices.iter().map(|v| v.position));
        self.index.reset(bounds);
        for i in 0..self.faces.len() {
            let face = FaceId(i as u32);
            let aabb = self.face_aabb(face);
            let node = self.index.insert(face, &aabb);
            self.faces[i].index_node = Some(node);
        }
        self.stale_faces.clear();
    }

    /// Faces whose index placement is out of date.
    pub fn stale_faces(&self) -> &BTreeSet<FaceId> {
        &self.stale_faces
    }
}
