//! Solid health reporting.

use std::fmt;

use mesh_types::{IndexedMesh, MeshBounds, Vector3};

use crate::adjacency::MeshAdjacency;

/// Topology and volume summary of a mesh.
///
/// Produced by [`inspect`] and attached to every successful
/// [`solid_volume`](crate::solid_volume) result.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Total number of distinct edges.
    pub edge_count: usize,
    /// Edges with only one adjacent face.
    pub boundary_edge_count: usize,
    /// Edges with more than two adjacent faces.
    pub non_manifold_edge_count: usize,
    /// No boundary edges.
    pub is_watertight: bool,
    /// No non-manifold edges.
    pub is_manifold: bool,
    /// Edges whose two faces disagree on winding.
    pub misoriented_edge_count: usize,
    /// Faces dropped before inspection because they repeat a vertex.
    pub collapsed_faces_removed: usize,
    /// Signed volume is negative.
    pub is_inside_out: bool,
    /// Signed volume in model units cubed.
    pub signed_volume: f64,
    /// Bounding box extents (width, depth, height).
    pub extents: Vector3<f64>,
}

impl SolidReport {
    /// Watertight, manifold and correctly wound.
    #[must_use]
    pub fn is_closed_solid(&self) -> bool {
        self.is_watertight
            && self.is_manifold
            && self.misoriented_edge_count == 0
            && !self.is_inside_out
    }
}

impl fmt::Display for SolidReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        writeln!(
            f,
            "{} vertices, {} faces, {} edges",
            self.vertex_count, self.face_count, self.edge_count
        )?;
        writeln!(
            f,
            "watertight: {}, manifold: {}, inside-out: {}",
            yes_no(self.is_watertight),
            yes_no(self.is_manifold),
            yes_no(self.is_inside_out)
        )?;
        if self.boundary_edge_count > 0 {
            writeln!(f, "boundary edges: {}", self.boundary_edge_count)?;
        }
        if self.non_manifold_edge_count > 0 {
            writeln!(f, "non-manifold edges: {}", self.non_manifold_edge_count)?;
        }
        if self.misoriented_edge_count > 0 {
            writeln!(f, "misoriented edges: {}", self.misoriented_edge_count)?;
        }
        if self.collapsed_faces_removed > 0 {
            writeln!(f, "collapsed faces removed: {}", self.collapsed_faces_removed)?;
        }
        write!(
            f,
            "extents: {:.2} x {:.2} x {:.2}",
            self.extents.x, self.extents.y, self.extents.z
        )
    }
}

/// Inspect a mesh without modifying it.
///
/// STL triangle soup reports every edge as a boundary; weld first with
/// [`weld_exact`](crate::weld_exact) for meaningful topology.
///
/// ```
/// use mesh_types::cube;
/// use mesh_solid::inspect;
///
/// let report = inspect(&cube(2.0));
/// assert!(report.is_closed_solid());
/// assert!((report.signed_volume - 8.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn inspect(mesh: &IndexedMesh) -> SolidReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let signed_volume = mesh.signed_volume();

    SolidReport {
        vertex_count: mesh.vertices.len(),
        face_count: mesh.faces.len(),
        edge_count: adjacency.edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        is_watertight: adjacency.is_watertight(),
        is_manifold: adjacency.is_manifold(),
        misoriented_edge_count: adjacency.misoriented_edge_count(),
        collapsed_faces_removed: 0,
        is_inside_out: signed_volume < 0.0,
        signed_volume,
        extents: mesh.bounds().size(),
    }
}
