//! The carve operation.
//!
//! A carve seeds a domain from the faces under the brush, optionally
//! displaces its vertices, runs the configured number of refinement passes
//! and finally writes normals and realigns every face it touched. All edits
//! are recorded into one [`ActionUnit`].

use freeform_config::CarveConfig;
use glam::Vec3;
use tracing::{debug, info};
use winged::{AffectedFaces, WingedMesh};

use crate::action::{ActionUnit, MoveVertex, RealignFace, WriteNormal};
use crate::brush::CarveBrush;
use crate::refine::{relax_edges, smooth_vertices, subdivide_edges, subdivision_targets};

/// Counters collected over one carve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarveStats {
    /// Faces under the brush when the carve started.
    pub faces_intersected: usize,
    pub vertices_displaced: usize,
    pub edges_split: usize,
    pub edges_relaxed: usize,
    pub vertices_smoothed: usize,
    /// Faces rewritten by finalize.
    pub faces_realigned: usize,
}

/// Result of one carve.
#[derive(Debug, Clone, Default)]
pub struct CarveResult {
    /// Every edit made, in application order.
    pub unit: ActionUnit,
    pub stats: CarveStats,
}

impl CarveResult {
    /// Whether the brush missed the mesh.
    pub fn is_empty(&self) -> bool {
        self.unit.is_empty()
    }
}

/// Carve-and-refine operation.
#[derive(Debug, Clone, Default)]
pub struct Carve {
    pub config: CarveConfig,
}

impl Carve {
    pub fn new(config: CarveConfig) -> Self {
        Self { config }
    }

    /// Carve `mesh` with `brush`.
    ///
    /// A brush that touches no face, or whose radius or detail is not a
    /// positive finite number, leaves the mesh untouched and returns an empty
    /// result.
    pub fn run(&self, mesh: &mut WingedMesh, brush: &CarveBrush) -> CarveResult {
        debug!(
            "carve: START at {:?} radius={} detail={}",
            brush.position, brush.radius, brush.detail
        );

        if !(brush.radius.is_finite() && brush.radius > 0.0 && brush.detail.is_finite() && brush.detail > 0.0) {
            debug!("carve: empty brush, nothing to do");
            return CarveResult::default();
        }

        let mut domain = AffectedFaces::new();
        if !mesh.intersects(&brush.sphere(), &mut domain) {
            debug!("carve: brush misses the mesh");
            return CarveResult::default();
        }
        domain.commit();

        let mut unit = ActionUnit::new();
        let mut stats = CarveStats {
            faces_intersected: domain.len(),
            ..Default::default()
        };

        if self.config.displacement_enabled {
            stats.vertices_displaced = displace(mesh, brush, &domain, &mut unit);
        }

        for pass in 0..self.config.passes {
            self.refine(mesh, brush, &mut domain, &mut unit, &mut stats);
            debug!("carve: pass {} done, domain has {} faces", pass, domain.len());
        }

        stats.faces_realigned = finalize(mesh, &mut domain, &mut unit);
        mesh.refresh_index();

        info!(
            "carve: split {} edges, relaxed {}, smoothed {} vertices, {} actions",
            stats.edges_split,
            stats.edges_relaxed,
            stats.vertices_smoothed,
            unit.len()
        );
        CarveResult { unit, stats }
    }

    /// One refinement pass over the faces of `domain` under the brush.
    ///
    /// `domain` only grows.
    pub fn refine(
        &self,
        mesh: &mut WingedMesh,
        brush: &CarveBrush,
        domain: &mut AffectedFaces,
        unit: &mut ActionUnit,
        stats: &mut CarveStats,
    ) {
        let mut working = subdivision_targets(mesh, &brush.sphere(), domain);
        domain.insert_all(&working);
        domain.commit();

        stats.edges_split += subdivide_edges(mesh, &self.config, brush.detail, &mut working, domain, unit);
        if self.config.relax_enabled {
            stats.edges_relaxed += relax_edges(mesh, &working, domain, unit);
        }
        if self.config.smooth_enabled {
            stats.vertices_smoothed += smooth_vertices(mesh, &self.config, &working, domain, unit);
        }
    }
}

/// Push every vertex of `domain` along the averaged surface normal by the
/// brush displacement at its distance from the brush center.
///
/// Returns the number of vertices moved.
pub fn displace(mesh: &mut WingedMesh, brush: &CarveBrush, domain: &AffectedFaces, unit: &mut ActionUnit) -> usize {
    let vertices = domain.vertices(mesh);
    if vertices.is_empty() {
        return 0;
    }
    let normal = vertices
        .iter()
        .map(|&v| mesh.interpolated_normal(v))
        .sum::<Vec3>()
        / vertices.len() as f32;

    let mut moved = 0;
    for vertex in vertices {
        let position = mesh.position(vertex);
        let offset = brush.displacement_at(position.distance(brush.position));
        if offset == 0.0 {
            continue;
        }
        unit.push(MoveVertex::run(mesh, vertex, position + normal * offset));
        moved += 1;
    }
    debug!("displace: moved {} vertices", moved);
    moved
}

/// Write interpolated normals for every vertex of `domain`, realign every
/// face of `domain`, then clear it.
///
/// Returns the number of faces realigned.
pub fn finalize(mesh: &mut WingedMesh, domain: &mut AffectedFaces, unit: &mut ActionUnit) -> usize {
    domain.commit();
    for vertex in domain.vertices(mesh) {
        unit.push(WriteNormal::run(mesh, vertex));
    }

    let faces: Vec<_> = domain.faces().iter().copied().collect();
    for face in &faces {
        unit.push(RealignFace::run(mesh, *face));
    }

    domain.reset();
    debug!("finalize: realigned {} faces", faces.len());
    faces.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionKind};
    use winged::{primitives, FaceId};

    fn surface_brush(mesh: &WingedMesh, face: FaceId, radius: f32, detail: f32) -> CarveBrush {
        CarveBrush::new(mesh.face_centroid(face), radius, detail)
    }

    fn all_faces(mesh: &WingedMesh) -> AffectedFaces {
        let mut domain = AffectedFaces::new();
        for face in mesh.face_ids() {
            domain.insert(face);
        }
        domain.commit();
        domain
    }

    #[test]
    fn test_miss_returns_empty_result() {
        let mut mesh = primitives::icosphere(1, 1.0);
        let before = mesh.buffer_data();
        let brush = CarveBrush::new(Vec3::splat(10.0), 0.5, 0.1);

        let result = Carve::default().run(&mut mesh, &brush);

        assert!(result.is_empty());
        assert_eq!(result.stats, CarveStats::default());
        assert_eq!(mesh.buffer_data(), before);
    }

    #[test]
    fn test_short_edges_add_no_elements() {
        let mut mesh = primitives::icosphere(2, 1.0);
        let (v, e, f) = (mesh.vertex_count(), mesh.edge_count(), mesh.face_count());
        let brush = surface_brush(&mesh, FaceId(0), 0.01, 1.0);

        let result = Carve::default().run(&mut mesh, &brush);

        assert_eq!(result.stats.edges_split, 0);
        assert_eq!((mesh.vertex_count(), mesh.edge_count(), mesh.face_count()), (v, e, f));
        assert!(!result.is_empty());
        assert_eq!(result.unit.count(ActionKind::SubdivideEdge), 0);
        assert!(result.unit.count(ActionKind::RealignFace) > 0);
        // Relax and smooth still visit the touched faces
        assert_eq!(result.unit.count(ActionKind::SmoothVertices), 1);
        assert!(result.stats.vertices_smoothed > 0);
        assert_eq!(result.unit.count(ActionKind::RelaxEdge), result.stats.edges_relaxed);
    }

    #[test]
    fn test_degenerate_brush_does_nothing() {
        let mut mesh = primitives::icosphere(1, 1.0);
        let before = mesh.buffer_data();
        let center = mesh.face_centroid(FaceId(0));

        for brush in [
            CarveBrush::new(center, -0.3, 0.05),
            CarveBrush::new(center, 0.0, 0.05),
            CarveBrush::new(center, 0.3, f32::NAN),
            CarveBrush::new(center, 0.3, 0.0),
        ] {
            let result = Carve::default().run(&mut mesh, &brush);
            assert!(result.is_empty());
            assert_eq!(result.stats, CarveStats::default());
        }
        assert_eq!(mesh.buffer_data(), before);
    }

    /// Tetrahedron whose only edge longer than 0.8 is A-B.
    fn lone_long_edge_mesh() -> WingedMesh {
        let positions = [
            Vec3::new(-0.5, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(0.0, 0.35, 0.1),
            Vec3::new(0.0, 0.35, -0.1),
        ];
        let indices = [0, 1, 2, 0, 3, 1, 1, 3, 2, 0, 2, 3];
        WingedMesh::from_triangles(&positions, &indices).unwrap()
    }

    #[test]
    fn test_one_long_edge_adds_one_vertex() {
        let mut mesh = lone_long_edge_mesh();
        // Bound is 4/3 * 0.6 = 0.8
        let brush = CarveBrush::new(Vec3::ZERO, 0.01, 0.6);
        let config = CarveConfig {
            relax_enabled: false,
            smooth_enabled: false,
            ..CarveConfig::default()
        };

        let result = Carve::new(config).run(&mut mesh, &brush);

        assert_eq!(result.stats.edges_split, 1);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.edge_count(), 9);
        assert_eq!(mesh.face_count(), 6);

        let vertex = winged::VertexId(4);
        let expected = mesh.interpolated_normal(vertex);
        assert!((mesh.vertex(vertex).normal - expected).length() < 1e-5);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_edges_within_bound_are_kept() {
        let mut mesh = primitives::octahedron(1.0);
        // Octahedron edges are √2 ≈ 1.414 and the bound is 4/3 * 1.1 ≈ 1.467
        let brush = CarveBrush::new(mesh.edge_midpoint(winged::EdgeId(0)), 0.01, 1.1);

        let result = Carve::default().run(&mut mesh, &brush);

        assert_eq!(result.stats.edges_split, 0);
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut mesh = primitives::icosphere(1, 1.0);
        let before = mesh.buffer_data();
        let brush = surface_brush(&mesh, FaceId(3), 0.3, 0.05);

        let result = Carve::default().run(&mut mesh, &brush);
        let after = mesh.buffer_data();
        assert!(result.stats.edges_split > 0);

        result.unit.undo(&mut mesh);
        assert_eq!(mesh.buffer_data(), before);
        assert!(mesh.validate().is_ok());

        result.unit.redo(&mut mesh);
        assert_eq!(mesh.buffer_data(), after);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_finalize_leaves_triangles() {
        let mut mesh = primitives::icosphere(1, 1.0);
        let brush = surface_brush(&mesh, FaceId(0), 0.4, 0.05);
        Carve::default().run(&mut mesh, &brush);

        for face in mesh.face_ids() {
            assert_eq!(mesh.num_edges(face), 3);
            assert!(mesh.t_edge(face).is_none());
        }
        for edge in mesh.edges() {
            assert!(mesh.adjacent_edges(edge.left_face, false).any(|e| e == edge.id));
            assert!(mesh.adjacent_edges(edge.right_face, false).any(|e| e == edge.id));
        }
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut mesh = primitives::icosphere(1, 1.0);
        let brush = surface_brush(&mesh, FaceId(0), 0.4, 0.05);
        Carve::default().run(&mut mesh, &brush);
        let once = mesh.buffer_data();
        let faces = mesh.face_count();

        let mut domain = all_faces(&mesh);
        let mut unit = ActionUnit::new();
        finalize(&mut mesh, &mut domain, &mut unit);

        assert_eq!(mesh.face_count(), faces);
        assert_eq!(mesh.buffer_data(), once);
        assert!(domain.is_empty());

        // Normals are written before any face is realigned
        let kinds: Vec<ActionKind> = unit.actions().iter().map(Action::kind).collect();
        let normals = kinds.iter().filter(|&&k| k == ActionKind::WriteNormal).count();
        assert_eq!(normals, mesh.vertex_count());
        assert!(kinds[..normals].iter().all(|&k| k == ActionKind::WriteNormal));
        assert!(kinds[normals..].iter().all(|&k| k == ActionKind::RealignFace));
    }

    #[test]
    fn test_refine_domain_only_grows() {
        let mut mesh = primitives::icosphere(1, 1.0);
        let brush = surface_brush(&mesh, FaceId(5), 0.3, 0.05);
        let mut domain = AffectedFaces::new();
        assert!(mesh.intersects(&brush.sphere(), &mut domain));
        domain.commit();
        let seed = domain.faces().clone();

        let carve = Carve::new(CarveConfig {
            passes: 2,
            ..CarveConfig::default()
        });
        let mut unit = ActionUnit::new();
        let mut stats = CarveStats::default();
        let mut previous = seed.clone();
        for _ in 0..carve.config.passes {
            carve.refine(&mut mesh, &brush, &mut domain, &mut unit, &mut stats);
            assert!(previous.is_subset(domain.faces()));
            previous = domain.faces().clone();
        }
        assert!(seed.is_subset(domain.faces()));
    }

    #[test]
    fn test_length_bound_after_subdivide() {
        let mut mesh = primitives::icosphere(1, 1.0);
        let brush = surface_brush(&mesh, FaceId(0), 0.2, 0.25);
        let config = CarveConfig {
            relax_enabled: false,
            smooth_enabled: false,
            ..CarveConfig::default()
        };
        let bound = config.max_edge_length_sqr(brush.detail);
        let carve = Carve::new(config);
        let mut domain = AffectedFaces::new();
        mesh.intersects(&brush.sphere(), &mut domain);
        domain.commit();
        let mut unit = ActionUnit::new();
        let mut stats = CarveStats::default();
        carve.refine(&mut mesh, &brush, &mut domain, &mut unit, &mut stats);
        assert!(stats.edges_split > 0);

        // Faces still under the brush have edges within one split of the bound
        for &face in domain.faces() {
            if !mesh.face_intersects(face, &brush.sphere()) {
                continue;
            }
            for edge in mesh.adjacent_edges(face, false) {
                assert!(mesh.edge_length_sqr(edge) <= bound * 4.0 + 1e-5);
            }
        }
    }

    #[test]
    fn test_displacement_moves_along_normal() {
        let mut mesh = primitives::icosphere(2, 1.0);
        let center = mesh.position(winged::VertexId(0));
        let brush = CarveBrush::new(center, 0.3, 1.0).with_intensity(-0.05);
        let config = CarveConfig {
            displacement_enabled: true,
            relax_enabled: false,
            smooth_enabled: false,
            ..CarveConfig::default()
        };

        let result = Carve::new(config).run(&mut mesh, &brush);

        assert!(result.stats.vertices_displaced > 0);
        // Vertex under the brush center carved inward
        assert!(mesh.position(winged::VertexId(0)).length() < 1.0 - 0.01);
    }

    #[test]
    fn test_displace_without_domain_is_noop() {
        let mut mesh = primitives::octahedron(1.0);
        let mut unit = ActionUnit::new();
        let moved = displace(&mut mesh, &CarveBrush::default(), &AffectedFaces::new(), &mut unit);
        assert_eq!(moved, 0);
        assert!(unit.is_empty());
    }
}
