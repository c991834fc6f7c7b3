//! Indexed triangle mesh.

use crate::{Aabb, MeshBounds, MeshTopology, Vertex};
use nalgebra::Point3;

/// An indexed triangle mesh.
///
/// Vertices and faces are stored separately; each face references three
/// vertices by index with counter-clockwise winding seen from outside.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, MeshTopology, Vertex};
///
/// let mesh = IndexedMesh::from_parts(
///     vec![
///         Vertex::from_coords(0.0, 0.0, 0.0),
///         Vertex::from_coords(1.0, 0.0, 0.0),
///         Vertex::from_coords(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Append a standalone triangle, adding three new vertices.
    ///
    /// STL stores triangle soup, so loaders push each facet this way and
    /// leave welding to the solid check.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
    pub fn push_triangle(&mut self, v0: Vertex, v1: Vertex, v2: Vertex) {
        let base = self.vertices.len() as u32;
        self.vertices.extend([v0, v1, v2]);
        self.faces.push([base, base + 1, base + 2]);
    }

    /// First face index that points past the vertex array, if any.
    #[must_use]
    pub fn first_invalid_index(&self) -> Option<(usize, u32)> {
        let count = self.vertices.len();
        self.faces.iter().enumerate().find_map(|(face_idx, face)| {
            face.iter()
                .find(|&&i| i as usize >= count)
                .map(|&i| (face_idx, i))
        })
    }

    /// Returns `true` if every vertex coordinate is finite.
    #[must_use]
    pub fn has_finite_positions(&self) -> bool {
        self.vertices.iter().all(Vertex::is_finite)
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Sums the signed tetrahedra formed by each face and the origin
    /// (divergence theorem). Faces with out-of-range indices are skipped.
    ///
    /// - Positive: closed mesh with outward normals
    /// - Negative: inside-out mesh
    /// - Near zero: open mesh or inconsistent winding
    ///
    /// The result only measures enclosed volume when the mesh is watertight.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let (Some(a), Some(b), Some(c)) = (
                self.vertices.get(i0 as usize),
                self.vertices.get(i1 as usize),
                self.vertices.get(i2 as usize),
            ) else {
                continue;
            };
            let (v0, v1, v2) = (&a.position, &b.position, &c.position);

            // v0 · (v1 × v2)
            let cx = v1.y.mul_add(v2.z, -(v1.z * v2.y));
            let cy = v1.z.mul_add(v2.x, -(v1.x * v2.z));
            let cz = v1.x.mul_add(v2.y, -(v1.y * v2.x));
            volume += v0.z.mul_add(cz, v0.x.mul_add(cx, v0.y * cy));
        }

        volume / 6.0
    }

    /// Absolute value of [`IndexedMesh::signed_volume`].
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// A mesh is inside-out when its signed volume is negative.
    #[inline]
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Reverse the winding of every face.
    pub fn flip_winding(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// Scale uniformly around the origin.
    pub fn scale(&mut self, factor: f64) {
        for vertex in &mut self.vertices {
            vertex.position.coords *= factor;
        }
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    fn face(&self, index: usize) -> Option<[u32; 3]> {
        self.faces.get(index).copied()
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// Axis-aligned cube from the origin to `(edge, edge, edge)` with outward
/// winding.
///
/// ```
/// use mesh_types::{cube, MeshTopology};
///
/// let c = cube(10.0);
/// assert_eq!(c.vertex_count(), 8);
/// assert_eq!(c.face_count(), 12);
/// assert!((c.volume() - 1000.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn cube(edge: f64) -> IndexedMesh {
    let corners = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let vertices = corners
        .iter()
        .map(|&[x, y, z]| Vertex::new(Point3::new(x * edge, y * edge, z * edge)))
        .collect();

    let faces = vec![
        // bottom (-Z)
        [0, 2, 1],
        [0, 3, 2],
        // top (+Z)
        [4, 5, 6],
        [4, 6, 7],
        // front (-Y)
        [0, 1, 5],
        [0, 5, 4],
        // back (+Y)
        [3, 7, 6],
        [3, 6, 2],
        // left (-X)
        [0, 4, 7],
        [0, 7, 3],
        // right (+X)
        [1, 2, 6],
        [1, 6, 5],
    ];

    IndexedMesh::from_parts(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mesh_is_empty() {
        let mesh = IndexedMesh::new();
        assert!(mesh.is_empty());

        let mut mesh2 = IndexedMesh::new();
        mesh2.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        assert!(mesh2.is_empty()); // no faces

        mesh2.faces.push([0, 0, 0]);
        assert!(!mesh2.is_empty());
    }

    #[test]
    fn unit_cube_volume() {
        let vol = cube(1.0).signed_volume();
        assert_relative_eq!(vol, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn cube_volume_scales_cubically() {
        let mut c = cube(1.0);
        c.scale(10.0);
        assert_relative_eq!(c.volume(), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn flipped_cube_inside_out() {
        let mut c = cube(2.0);
        assert!(!c.is_inside_out());
        c.flip_winding();
        assert!(c.is_inside_out());
        assert_relative_eq!(c.volume(), 8.0, epsilon = 1e-10);
    }

    #[test]
    fn open_triangle_has_no_volume() {
        let mut mesh = IndexedMesh::new();
        mesh.push_triangle(
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 0.0, 0.0),
            Vertex::from_coords(0.0, 1.0, 0.0),
        );
        assert!(mesh.signed_volume().abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_index_reported() {
        let mut mesh = cube(1.0);
        assert_eq!(mesh.first_invalid_index(), None);
        mesh.faces.push([0, 1, 42]);
        assert_eq!(mesh.first_invalid_index(), Some((12, 42)));
        // Out-of-range faces are skipped rather than panicking.
        assert_relative_eq!(mesh.volume(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn mesh_bounds() {
        let bounds = cube(4.0).bounds();
        assert_relative_eq!(bounds.size().x, 4.0);
        assert_relative_eq!(bounds.size().z, 4.0);
        assert!(IndexedMesh::new().bounds_opt().is_none());
    }
}
