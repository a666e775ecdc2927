//! Render buffer writes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::WingedMesh;
use crate::types::FaceId;

/// Vertex layout handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Vertex and index buffers of a whole mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<GpuVertex>,
    /// Three vertex indices per face, at the face's first index number
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl WingedMesh {
    /// Write the three vertex indices of `face` into `indices` at its first
    /// index number, growing the buffer when needed.
    ///
    /// Panics if `face` is not a triangle.
    pub fn write_indices(&self, face: FaceId, indices: &mut Vec<u32>) {
        assert!(self.is_triangle(face), "cannot write indices of non-triangle face {:?}", face);
        let start = self.face(face).first_index_number as usize;
        if indices.len() < start + 3 {
            indices.resize(start + 3, 0);
        }
        indices[start] = self.first_vertex(face).0;
        indices[start + 1] = self.second_vertex(face).0;
        indices[start + 2] = self.third_vertex(face).0;
    }

    /// Store the interpolated normal in each corner of `face`.
    pub fn write_normals(&mut self, face: FaceId) {
        let vertices = self.face_vertices(face);
        for vertex in vertices {
            let normal = self.interpolated_normal(vertex);
            self.set_normal(vertex, normal);
        }
    }

    /// Write normals and indices of `face`, optionally moving it to a new
    /// first index number.
    pub fn write(&mut self, face: FaceId, first_index_number: Option<u32>, indices: &mut Vec<u32>) {
        if let Some(number) = first_index_number {
            self.set_first_index_number(face, number);
        }
        self.write_normals(face);
        self.write_indices(face, indices);
    }

    /// Vertex and index buffers for the whole mesh.
    ///
    /// Panics if any face is not a triangle.
    pub fn buffer_data(&self) -> MeshBuffers {
        let vertices = self
            .vertices
            .iter()
            .map(|v| GpuVertex {
                position: v.position.to_array(),
                normal: v.normal.to_array(),
            })
            .collect();
        let mut indices = vec![0; self.faces.len() * 3];
        for face in &self.faces {
            self.write_indices(face.id, &mut indices);
        }
        MeshBuffers { vertices, indices }
    }

    /// Cached vertex normals, indexed by vertex id.
    pub fn normals(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| v.normal).collect()
    }

    /// Vertex positions, indexed by vertex id.
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| v.position).collect()
    }
}
