//! Sphere queries against the mesh surface.

use std::collections::BTreeSet;

use super::WingedMesh;
use crate::domain::AffectedFaces;
use crate::spatial::Sphere;
use crate::types::FaceId;

impl WingedMesh {
    /// Whether the surface of `face` touches `sphere`.
    ///
    /// Polygons left over from an unfinished refinement are tested as a fan.
    pub fn face_intersects(&self, face: FaceId, sphere: &Sphere) -> bool {
        let positions = self.face_positions(face);
        let Some((&first, rest)) = positions.split_first() else {
            return false;
        };
        rest.windows(2)
            .any(|pair| sphere.intersects_triangle(first, pair[0], pair[1]))
    }

    /// Add every face touching `sphere` to `domain`.
    ///
    /// Candidates come from the spatial index plus the faces whose index
    /// placement is stale, so the result is exact even before
    /// [`refresh_index`](Self::refresh_index). Returns whether any face
    /// touches the sphere.
    pub fn intersects(&self, sphere: &Sphere, domain: &mut AffectedFaces) -> bool {
        let candidates: BTreeSet<FaceId> = self
            .index
            .query_sphere(sphere)
            .into_iter()
            .chain(self.stale_faces.iter().copied())
            .filter(|f| f.index() < self.faces.len())
            .collect();

        let mut found = false;
        for face in candidates {
            if self.face_intersects(face, sphere) {
                domain.insert(face);
                found = true;
            }
        }
        tracing::trace!(
            "intersects: sphere at {:?} r={} -> found={}",
            sphere.center,
            sphere.radius,
            found
        );
        found
    }
}
