//! Local refinement steps of the carve pipeline.
//!
//! Each step reads a working set of faces, records its edits into an
//! [`ActionUnit`] and adds every face it touched to the running domain:
//! 1. [`subdivision_targets`] - faces under the brush plus one ring
//! 2. [`subdivide_edges`] - midpoint split of edges longer than the detail allows
//! 3. [`relax_edges`] - edge flips towards regular valence and rounder triangles
//! 4. [`smooth_vertices`] - tangential Laplacian smoothing

use freeform_config::CarveConfig;
use glam::Vec3;
use tracing::{debug, trace};
use winged::{incircle_radius, AffectedFaces, EdgeId, FaceId, Sphere, VertexId, WingedMesh};

use crate::action::{ActionUnit, RelaxEdge, SmoothVertices, SubdivideEdge};

/// Valence of an interior vertex of a regular triangulation
const TARGET_VALENCE: i32 = 6;

/// Minimum incircle gain for a flip between equally regular configurations
const QUALITY_EPSILON: f32 = 1e-6;

/// Add the neighbours of every committed face to `domain`.
pub fn extend_domain(mesh: &WingedMesh, domain: &mut AffectedFaces) {
    let ring: Vec<FaceId> = domain
        .faces()
        .iter()
        .flat_map(|&f| mesh.adjacent_faces(f, false))
        .collect();
    for face in ring {
        domain.insert(face);
    }
    domain.commit();
}

/// Faces of `domain` that touch `sphere`, extended by one ring.
pub fn subdivision_targets(mesh: &WingedMesh, sphere: &Sphere, domain: &AffectedFaces) -> AffectedFaces {
    let mut targets = AffectedFaces::new();
    for &face in domain.faces() {
        if mesh.face_intersects(face, sphere) {
            targets.insert(face);
        }
    }
    targets.commit();
    extend_domain(mesh, &mut targets);
    trace!("subdivision_targets: {} faces", targets.len());
    targets
}

/// Split every edge of `working` longer than `split_ratio * detail`.
///
/// New and modified faces are added to both `working` and `domain`. Returns
/// the number of edges split.
pub fn subdivide_edges(
    mesh: &mut WingedMesh,
    config: &CarveConfig,
    detail: f32,
    working: &mut AffectedFaces,
    domain: &mut AffectedFaces,
    unit: &mut ActionUnit,
) -> usize {
    let max_length_sqr = config.max_edge_length_sqr(detail);
    let candidates: Vec<EdgeId> = working.edges(mesh).into_iter().collect();
    let mut split = 0;

    for edge in candidates {
        if mesh.edge_length_sqr(edge) <= max_length_sqr {
            continue;
        }
        let level = split_level(mesh, edge);
        if level >= config.max_level {
            debug!("subdivide_edges: {:?} borders a level {} face, skipping", edge, level);
            continue;
        }

        let record = SubdivideEdge::run(mesh, edge, working);
        for face in record.faces {
            working.insert(face);
            domain.insert(face);
        }
        unit.push(record);
        split += 1;
    }

    working.commit();
    domain.commit();
    debug!("subdivide_edges: split {} edges (max length² {:.6})", split, max_length_sqr);
    split
}

/// Subdivision level an edge split would refine: the higher level of its
/// two faces.
pub fn split_level(mesh: &WingedMesh, edge: EdgeId) -> u32 {
    let e = mesh.edge(edge);
    mesh.face_level(e.left_face).max(mesh.face_level(e.right_face))
}

/// Whether flipping `edge` makes the local triangulation more regular.
///
/// The summed valence deviation of the four involved vertices must drop;
/// on a tie the smaller incircle radius of the two triangles must grow.
pub fn flip_improves(mesh: &WingedMesh, edge: EdgeId) -> bool {
    let e = mesh.edge(edge);
    let (a, b) = (e.vertex1, e.vertex2);
    let c = mesh.edge(e.left_successor).second_vertex(e.left_face);
    let d = mesh.edge(e.right_successor).second_vertex(e.right_face);

    let deviation = |v: VertexId, change: i32| (mesh.valence(v) as i32 + change - TARGET_VALENCE).abs();
    let before = deviation(a, 0) + deviation(b, 0) + deviation(c, 0) + deviation(d, 0);
    let after = deviation(a, -1) + deviation(b, -1) + deviation(c, 1) + deviation(d, 1);
    if after != before {
        return after < before;
    }

    let (pa, pb, pc, pd) = (mesh.position(a), mesh.position(b), mesh.position(c), mesh.position(d));
    let quality_before = incircle_radius(pa, pb, pc).min(incircle_radius(pb, pa, pd));
    let quality_after = incircle_radius(pc, pd, pb).min(incircle_radius(pd, pc, pa));
    quality_after > quality_before + QUALITY_EPSILON
}

/// Flip every edge of `working` whose flip is valid and improves the mesh.
///
/// T-edges are never flipped. Returns the number of flips.
pub fn relax_edges(
    mesh: &mut WingedMesh,
    working: &AffectedFaces,
    domain: &mut AffectedFaces,
    unit: &mut ActionUnit,
) -> usize {
    let candidates: Vec<EdgeId> = working.edges(mesh).into_iter().collect();
    let total = candidates.len();
    let mut flipped = 0;

    for edge in candidates {
        if !mesh.can_flip_edge(edge) || !flip_improves(mesh, edge) {
            continue;
        }
        let (left, right) = (mesh.edge(edge).left_face, mesh.edge(edge).right_face);
        unit.push(RelaxEdge::run(mesh, edge));
        domain.insert(left);
        domain.insert(right);
        trace!("relax_edges: flipped {:?}", edge);
        flipped += 1;
    }

    domain.commit();
    debug!("relax_edges: flipped {} of {} edges", flipped, total);
    flipped
}

/// Move every non-T vertex of `working` towards the centroid of its
/// neighbours, along the surface only.
///
/// Faces around moved vertices are added to `domain`. Returns the number of
/// vertices moved.
pub fn smooth_vertices(
    mesh: &mut WingedMesh,
    config: &CarveConfig,
    working: &AffectedFaces,
    domain: &mut AffectedFaces,
    unit: &mut ActionUnit,
) -> usize {
    let targets: Vec<(VertexId, Vec3)> = working
        .vertices(mesh)
        .into_iter()
        .filter(|&v| !mesh.vertex(v).is_t_vertex())
        .filter_map(|v| {
            let position = mesh.position(v);
            let (sum, count) = mesh
                .vertex_neighbors(v)
                .fold((Vec3::ZERO, 0usize), |(sum, count), n| (sum + mesh.position(n), count + 1));
            if count == 0 {
                return None;
            }
            let offset = sum / count as f32 - position;
            let normal = mesh.interpolated_normal(v);
            let tangential = offset - normal * normal.dot(offset);
            let target = position + tangential * config.smooth_factor;
            (target.distance_squared(position) > f32::EPSILON * f32::EPSILON).then_some((v, target))
        })
        .collect();

    if targets.is_empty() {
        debug!("smooth_vertices: nothing to move");
        return 0;
    }

    let record = SmoothVertices::run(mesh, &targets);
    for &(vertex, _) in &targets {
        let faces: Vec<FaceId> = mesh.vertex_faces(vertex).collect();
        for face in faces {
            domain.insert(face);
        }
    }
    domain.commit();
    unit.push(record);

    debug!("smooth_vertices: moved {} vertices", targets.len());
    targets.len()
}
