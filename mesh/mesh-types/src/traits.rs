//! Traits for mesh types.

use crate::{Aabb, Vertex};

/// Minimal topology queries over a triangle mesh.
pub trait MeshTopology {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangular faces.
    fn face_count(&self) -> usize;

    /// A mesh with no vertices or no faces encloses nothing.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// Vertex by index, `None` when out of range.
    fn vertex(&self, index: usize) -> Option<&Vertex>;

    /// Face by index as three vertex indices, `None` when out of range.
    fn face(&self, index: usize) -> Option<[u32; 3]>;
}

/// Types that can compute an axis-aligned bounding box.
pub trait MeshBounds {
    /// Bounding box of all vertices. Empty when there are none.
    fn bounds(&self) -> Aabb;

    /// Bounding box, or `None` when empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() { None } else { Some(b) }
    }
}
