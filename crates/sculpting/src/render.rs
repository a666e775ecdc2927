//! Render hand-off abstraction.
//!
//! This module provides:
//! - [`RenderTarget`] trait receiving mesh buffers after every edit
//! - [`RecordingTarget`] that keeps what it was given, for headless use and tests

use winged::MeshBuffers;

/// Trait for consumers of the mesh render buffers.
///
/// The pipeline calls [`buffer_data`](RenderTarget::buffer_data) exactly once
/// at the end of every carve, undo, redo and tool invocation, including
/// invocations that left the mesh unchanged.
pub trait RenderTarget {
    /// Upload the current vertex and index buffers.
    fn buffer_data(&mut self, buffers: &MeshBuffers);
}

/// Render target that records every upload
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    /// Number of uploads received
    pub calls: usize,
    /// Buffers of the most recent upload
    pub last: Option<MeshBuffers>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderTarget for RecordingTarget {
    fn buffer_data(&mut self, buffers: &MeshBuffers) {
        self.calls += 1;
        self.last = Some(buffers.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winged::primitives;

    #[test]
    fn test_recording_target_counts_uploads() {
        let mesh = primitives::tetrahedron(1.0);
        let mut target = RecordingTarget::new();
        target.buffer_data(&mesh.buffer_data());
        target.buffer_data(&mesh.buffer_data());

        assert_eq!(target.calls, 2);
        let last = target.last.unwrap();
        assert_eq!(last.triangle_count(), 4);
        assert_eq!(last.vertices.len(), 4);
    }
}
