//! Sculpting pipeline orchestration.
//!
//! This module coordinates the complete sculpting workflow:
//! 1. Brush → carve (displace, subdivide, relax, smooth, finalize)
//! 2. Carve → action unit on the undo history
//! 3. Undo/redo of whole units
//! 4. Every invocation → exactly one render upload
//!
//! Mesh-level tools (new freeform mesh, subdivide mesh, move) go through the
//! same history and render hand-off.

use freeform_config::{ConfigError, SculptConfig};
use glam::Vec3;
use tracing::{debug, info};
use winged::{primitives, AffectedFaces, EdgeId, WingedMesh};

use crate::action::{ActionUnit, History, MoveVertex, SubdivideEdge};
use crate::brush::CarveBrush;
use crate::carve::{finalize, Carve, CarveStats};
use crate::render::RenderTarget;

/// The sculpting pipeline owns a mesh and its undo history.
#[derive(Debug)]
pub struct SculptingPipeline {
    mesh: WingedMesh,
    config: SculptConfig,
    history: History,
    carve: Carve,
}

impl SculptingPipeline {
    /// Create a pipeline around `mesh`.
    ///
    /// Fails if `config` does not validate.
    pub fn new(mesh: WingedMesh, config: SculptConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "SculptingPipeline: {} vertices, {} faces, {} pass(es) per carve",
            mesh.vertex_count(),
            mesh.face_count(),
            config.carve.passes
        );
        Ok(Self {
            mesh,
            history: History::new(config.history.clone()),
            carve: Carve::new(config.carve.clone()),
            config,
        })
    }

    pub fn mesh(&self) -> &WingedMesh {
        &self.mesh
    }

    pub fn config(&self) -> &SculptConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ========================================================================
    // Carve and history
    // ========================================================================

    /// Carve the mesh with `brush` and hand the result to `target`.
    ///
    /// A brush that misses the mesh records nothing.
    pub fn carve(&mut self, brush: &CarveBrush, target: &mut dyn RenderTarget) -> CarveStats {
        let result = self.carve.run(&mut self.mesh, brush);
        let stats = result.stats;
        self.history.push(result.unit);
        self.upload(target);
        stats
    }

    /// Undo the last unit. The mesh is uploaded even when nothing was undone.
    pub fn undo(&mut self, target: &mut dyn RenderTarget) -> bool {
        let undone = self.history.undo(&mut self.mesh);
        self.upload(target);
        undone
    }

    /// Redo the last undone unit. The mesh is uploaded even when nothing was
    /// redone.
    pub fn redo(&mut self, target: &mut dyn RenderTarget) -> bool {
        let redone = self.history.redo(&mut self.mesh);
        self.upload(target);
        redone
    }

    // ========================================================================
    // Mesh tools
    // ========================================================================

    /// Replace the mesh with an icosphere and forget the history.
    pub fn new_freeform_mesh(&mut self, subdivisions: u32, radius: f32, target: &mut dyn RenderTarget) {
        self.mesh = primitives::icosphere(subdivisions, radius);
        self.history.clear();
        info!(
            "new_freeform_mesh: {} subdivisions, radius {} -> {} faces",
            subdivisions,
            radius,
            self.mesh.face_count()
        );
        self.upload(target);
    }

    /// Split every edge of the mesh once at its midpoint.
    ///
    /// Returns the number of edges split.
    pub fn subdivide_mesh(&mut self, target: &mut dyn RenderTarget) -> usize {
        let edges: Vec<EdgeId> = self.mesh.edge_ids().collect();
        let mut working = AffectedFaces::new();
        for face in self.mesh.face_ids() {
            working.insert(face);
        }
        working.commit();
        let mut domain = working.clone();

        let mut unit = ActionUnit::new();
        for &edge in &edges {
            let record = SubdivideEdge::run(&mut self.mesh, edge, &working);
            for face in record.faces {
                working.insert(face);
                domain.insert(face);
            }
            unit.push(record);
        }
        finalize(&mut self.mesh, &mut domain, &mut unit);
        self.mesh.refresh_index();

        debug!("subdivide_mesh: split {} edges, {} actions", edges.len(), unit.len());
        self.history.push(unit);
        self.upload(target);
        edges.len()
    }

    /// Translate every vertex by `offset`.
    pub fn move_mesh(&mut self, offset: Vec3, target: &mut dyn RenderTarget) {
        let mut unit = ActionUnit::new();
        if offset != Vec3::ZERO {
            let vertices: Vec<_> = self.mesh.vertex_ids().collect();
            for vertex in vertices {
                let to = self.mesh.position(vertex) + offset;
                unit.push(MoveVertex::run(&mut self.mesh, vertex, to));
            }
            self.mesh.refresh_index();
        }
        debug!("move_mesh: offset {:?}, {} vertices", offset, unit.len());
        self.history.push(unit);
        self.upload(target);
    }

    fn upload(&self, target: &mut dyn RenderTarget) {
        target.buffer_data(&self.mesh.buffer_data());
    }
}
