//! Spatial indexing of mesh faces.
//!
//! A loose octree over face bounding boxes: every face is stored at the
//! deepest node whose bounds fully contain its box. Faces that do not fit
//! inside the root (the surface grew past its initial extent) are kept at
//! the root, and the root's faces are always returned by queries.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::FaceId;

/// Configuration for the face octree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Maximum depth of the octree.
    pub max_depth: u32,
    /// Minimum node size (prevents infinite subdivision).
    pub min_node_size: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            min_node_size: 0.01,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.include_point(point);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let closest = sphere.center.clamp(self.min, self.max);
        closest.distance_squared(sphere.center) <= sphere.radius * sphere.radius
    }

    /// Octant fully containing `other`, if any (0-7).
    fn octant_containing(&self, other: &Aabb) -> Option<usize> {
        let center = self.center();
        let mut index = 0;
        for (axis, bit) in [(0, 1), (1, 2), (2, 4)] {
            if other.min[axis] >= center[axis] {
                index |= bit;
            } else if other.max[axis] > center[axis] {
                return None;
            }
        }
        Some(index)
    }

    /// Get the bounds for a specific octant.
    fn octant_bounds(&self, octant: usize) -> Aabb {
        let center = self.center();
        let min = Vec3::new(
            if octant & 1 != 0 { center.x } else { self.min.x },
            if octant & 2 != 0 { center.y } else { self.min.y },
            if octant & 4 != 0 { center.z } else { self.min.z },
        );
        let max = Vec3::new(
            if octant & 1 != 0 { self.max.x } else { center.x },
            if octant & 2 != 0 { self.max.y } else { center.y },
            if octant & 4 != 0 { self.max.z } else { center.z },
        );
        Aabb::new(min, max)
    }
}

/// Query volume of a brush
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    /// Whether the triangle `(a, b, c)` touches the sphere.
    pub fn intersects_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> bool {
        self.contains(closest_point_on_triangle(self.center, a, b, c))
    }
}

/// Closest point to `p` on triangle `(a, b, c)` (Voronoi region walk).
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Index of a node in the face octree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone)]
struct IndexNode {
    bounds: Aabb,
    depth: u32,
    faces: Vec<FaceId>,
    children: [Option<NodeId>; 8],
}

impl IndexNode {
    fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            faces: Vec::new(),
            children: [None; 8],
        }
    }
}

/// Loose octree of face bounding boxes.
#[derive(Debug, Clone)]
pub struct FaceIndex {
    nodes: Vec<IndexNode>,
    config: IndexConfig,
}

const ROOT: NodeId = NodeId(0);

impl FaceIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            nodes: vec![IndexNode::new(Aabb::empty(), 0)],
            config,
        }
    }

    /// Drop all nodes and size the root to `bounds` (padded slightly).
    pub fn reset(&mut self, bounds: Aabb) {
        let bounds = if bounds.is_empty() {
            Aabb::empty()
        } else {
            let padding = bounds.size() * 0.01 + Vec3::splat(0.001);
            Aabb::new(bounds.min - padding, bounds.max + padding)
        };
        self.nodes.clear();
        self.nodes.push(IndexNode::new(bounds, 0));
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn bounds(&self) -> Aabb {
        self.nodes[ROOT.0 as usize].bounds
    }

    /// Insert a face with bounding box `aabb`, returning the node holding it.
    pub fn insert(&mut self, face: FaceId, aabb: &Aabb) -> NodeId {
        let mut current = ROOT;
        if self.nodes[ROOT.0 as usize].bounds.contains_aabb(aabb) {
            loop {
                let node = &self.nodes[current.0 as usize];
                let child_size = node.bounds.size().min_element() * 0.5;
                if node.depth >= self.config.max_depth || child_size < self.config.min_node_size {
                    break;
                }
                let Some(octant) = node.bounds.octant_containing(aabb) else {
                    break;
                };
                current = match node.children[octant] {
                    Some(child) => child,
                    None => {
                        let child = NodeId(self.nodes.len() as u32);
                        let child_node = IndexNode::new(node.bounds.octant_bounds(octant), node.depth + 1);
                        self.nodes.push(child_node);
                        self.nodes[current.0 as usize].children[octant] = Some(child);
                        child
                    }
                };
            }
        }
        self.nodes[current.0 as usize].faces.push(face);
        current
    }

    /// Remove a face from the node that holds it.
    pub fn remove(&mut self, face: FaceId, node: NodeId) -> bool {
        let faces = &mut self.nodes[node.0 as usize].faces;
        if let Some(idx) = faces.iter().position(|&f| f == face) {
            faces.swap_remove(idx);
            true
        } else {
            false
        }
    }

    /// Candidate faces whose node may touch `sphere` (conservative).
    pub fn query_sphere(&self, sphere: &Sphere) -> Vec<FaceId> {
        // Root faces include misfits outside the root bounds
        let mut results = self.nodes[ROOT.0 as usize].faces.clone();
        let mut stack: Vec<NodeId> = self.nodes[ROOT.0 as usize].children.iter().flatten().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0 as usize];
            if !node.bounds.intersects_sphere(sphere) {
                continue;
            }
            results.extend_from_slice(&node.faces);
            stack.extend(node.children.iter().flatten().copied());
        }
        results
    }

    /// Total number of faces stored.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|n| n.faces.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_index() -> FaceIndex {
        let mut index = FaceIndex::new(IndexConfig::default());
        index.reset(Aabb::new(Vec3::ZERO, Vec3::splat(10.0)));
        index
    }

    #[test]
    fn test_closest_point_regions() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Y;

        // Inside
        let p = closest_point_on_triangle(Vec3::new(0.25, 0.25, 1.0), a, b, c);
        assert!((p - Vec3::new(0.25, 0.25, 0.0)).length() < 1e-6);
        // Vertex region
        let p = closest_point_on_triangle(Vec3::new(-1.0, -1.0, 0.0), a, b, c);
        assert!((p - a).length() < 1e-6);
        // Edge region
        let p = closest_point_on_triangle(Vec3::new(0.5, -1.0, 0.0), a, b, c);
        assert!((p - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
        // Hypotenuse
        let p = closest_point_on_triangle(Vec3::new(1.0, 1.0, 0.0), a, b, c);
        assert!((p - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_sphere_triangle_intersection() {
        let sphere = Sphere::new(Vec3::new(0.25, 0.25, 0.5), 0.6);
        assert!(sphere.intersects_triangle(Vec3::ZERO, Vec3::X, Vec3::Y));

        let far = Sphere::new(Vec3::new(0.25, 0.25, 2.0), 0.6);
        assert!(!far.intersects_triangle(Vec3::ZERO, Vec3::X, Vec3::Y));
    }

    #[test]
    fn test_index_insert_and_query() {
        let mut index = unit_index();
        let near = Aabb::new(Vec3::splat(1.0), Vec3::splat(1.5));
        let far = Aabb::new(Vec3::splat(8.0), Vec3::splat(8.5));

        let near_node = index.insert(FaceId(0), &near);
        index.insert(FaceId(1), &far);
        assert_ne!(near_node, NodeId(0));
        assert_eq!(index.len(), 2);

        let results = index.query_sphere(&Sphere::new(Vec3::splat(1.2), 0.5));
        assert!(results.contains(&FaceId(0)));
        assert!(!results.contains(&FaceId(1)));
    }

    #[test]
    fn test_index_misfit_stays_at_root() {
        let mut index = unit_index();
        let outside = Aabb::new(Vec3::splat(20.0), Vec3::splat(21.0));
        let node = index.insert(FaceId(7), &outside);
        assert_eq!(node, NodeId(0));

        // Root faces are always candidates
        let results = index.query_sphere(&Sphere::new(Vec3::splat(20.5), 0.1));
        assert!(results.contains(&FaceId(7)));
    }

    #[test]
    fn test_index_straddling_face_stays_high() {
        let mut index = unit_index();
        let straddle = Aabb::new(Vec3::splat(4.0), Vec3::splat(6.0));
        assert_eq!(index.insert(FaceId(3), &straddle), NodeId(0));
    }

    #[test]
    fn test_index_remove() {
        let mut index = unit_index();
        let aabb = Aabb::new(Vec3::splat(1.0), Vec3::splat(1.5));
        let node = index.insert(FaceId(0), &aabb);
        assert!(index.remove(FaceId(0), node));
        assert!(!index.remove(FaceId(0), node));
        assert!(index.is_empty());
    }
}
