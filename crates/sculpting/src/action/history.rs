//! Undo/redo stacks of action units.

use freeform_config::HistoryConfig;
use tracing::debug;
use winged::WingedMesh;

use super::ActionUnit;

/// Bounded undo history with a redo stack.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<ActionUnit>,
    redo_stack: Vec<ActionUnit>,
    config: HistoryConfig,
}

impl History {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            config,
        }
    }

    /// Record an applied unit. Clears the redo stack; drops the oldest unit
    /// when the limit is exceeded. Empty units are ignored.
    pub fn push(&mut self, unit: ActionUnit) {
        if unit.is_empty() {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push(unit);
        if self.undo_stack.len() > self.config.limit {
            let overflow = self.undo_stack.len() - self.config.limit;
            self.undo_stack.drain(..overflow);
            debug!("History: dropped {} oldest units (limit {})", overflow, self.config.limit);
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo the last unit
    ///
    /// Returns true if an undo was performed, false if no undo available
    pub fn undo(&mut self, mesh: &mut WingedMesh) -> bool {
        let Some(unit) = self.undo_stack.pop() else {
            debug!("Undo: no entries available");
            return false;
        };
        debug!("Undoing unit ({} actions)", unit.len());
        unit.undo(mesh);
        self.redo_stack.push(unit);
        true
    }

    /// Redo the last undone unit
    ///
    /// Returns true if a redo was performed, false if no redo available
    pub fn redo(&mut self, mesh: &mut WingedMesh) -> bool {
        let Some(unit) = self.redo_stack.pop() else {
            debug!("Redo: no entries available");
            return false;
        };
        debug!("Redoing unit ({} actions)", unit.len());
        unit.redo(mesh);
        self.undo_stack.push(unit);
        true
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::MoveVertex;
    use glam::Vec3;
    use winged::{primitives, VertexId};

    fn move_unit(mesh: &mut WingedMesh, x: f32) -> ActionUnit {
        let mut unit = ActionUnit::new();
        unit.push(MoveVertex::run(mesh, VertexId(0), Vec3::new(x, 0.0, 0.0)));
        unit
    }

    #[test]
    fn test_undo_redo_order() {
        let mut mesh = primitives::octahedron(1.0);
        let mut history = History::default();
        let unit = move_unit(&mut mesh, 2.0);
        history.push(unit);
        let unit = move_unit(&mut mesh, 3.0);
        history.push(unit);

        assert!(history.undo(&mut mesh));
        assert_eq!(mesh.position(VertexId(0)).x, 2.0);
        assert!(history.undo(&mut mesh));
        assert_eq!(mesh.position(VertexId(0)).x, 1.0);
        assert!(!history.undo(&mut mesh));

        assert!(history.redo(&mut mesh));
        assert_eq!(mesh.position(VertexId(0)).x, 2.0);
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 1);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut mesh = primitives::octahedron(1.0);
        let mut history = History::default();
        let unit = move_unit(&mut mesh, 2.0);
        history.push(unit);
        history.undo(&mut mesh);
        assert!(history.can_redo());

        let unit = move_unit(&mut mesh, 4.0);
        history.push(unit);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut mesh));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut mesh = primitives::octahedron(1.0);
        let mut history = History::new(HistoryConfig { limit: 2 });
        for x in [2.0, 3.0, 4.0] {
            let unit = move_unit(&mut mesh, x);
            history.push(unit);
        }
        assert_eq!(history.undo_count(), 2);
        history.undo(&mut mesh);
        history.undo(&mut mesh);
        assert_eq!(mesh.position(VertexId(0)).x, 2.0);
    }

    #[test]
    fn test_empty_unit_ignored() {
        let mut history = History::default();
        history.push(ActionUnit::new());
        assert!(!history.can_undo());
    }
}
