//! Volume measurement for closed solids.

use mesh_types::{IndexedMesh, MeshTopology};
use tracing::{debug, warn};

use crate::error::{SolidError, SolidResult};
use crate::report::{SolidReport, inspect};
use crate::weld::{remove_collapsed_faces, weld_exact};

/// Options for [`solid_volume`].
///
/// # Example
///
/// ```
/// use mesh_solid::SolidOptions;
///
/// let lenient = SolidOptions::default().with_require_watertight(false);
/// assert!(!lenient.require_watertight);
/// assert!(lenient.weld);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidOptions {
    /// Reject meshes with holes or non-manifold edges.
    pub require_watertight: bool,
    /// Weld bit-identical vertices before checking topology.
    pub weld: bool,
}

impl Default for SolidOptions {
    fn default() -> Self {
        Self {
            require_watertight: true,
            weld: true,
        }
    }
}

impl SolidOptions {
    /// Set whether open or non-manifold meshes are rejected.
    #[must_use]
    pub const fn with_require_watertight(mut self, require: bool) -> Self {
        self.require_watertight = require;
        self
    }

    /// Set whether vertices are welded first.
    #[must_use]
    pub const fn with_weld(mut self, weld: bool) -> Self {
        self.weld = weld;
        self
    }
}

/// A measured solid.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidVolume {
    /// Enclosed volume in model units cubed (mm³ for print files).
    pub volume: f64,
    /// Topology summary of the (welded) mesh.
    pub report: SolidReport,
}

/// Measure the enclosed volume of a mesh, rejecting anything that is not
/// a finite, positive-volume solid.
///
/// Checks run in order: empty mesh, face indices, finite coordinates,
/// then (after optional welding and removal of collapsed faces)
/// watertightness and manifoldness when required, and finally the volume
/// itself. An inside-out mesh is accepted and its absolute volume used.
/// Faces wound against their neighbours are logged but not rejected.
///
/// # Errors
///
/// Returns the first [`SolidError`] encountered.
///
/// # Example
///
/// ```
/// use mesh_types::cube;
/// use mesh_solid::{solid_volume, SolidOptions};
///
/// let solid = solid_volume(cube(10.0), &SolidOptions::default()).unwrap();
/// assert!((solid.volume - 1000.0).abs() < 1e-9);
/// ```
pub fn solid_volume(mut mesh: IndexedMesh, options: &SolidOptions) -> SolidResult<SolidVolume> {
    if mesh.is_empty() {
        return Err(SolidError::EmptyMesh);
    }
    if let Some((face, index)) = mesh.first_invalid_index() {
        return Err(SolidError::InvalidIndex {
            face,
            index,
            vertex_count: mesh.vertex_count(),
        });
    }
    if !mesh.has_finite_positions() {
        return Err(SolidError::NonFiniteCoordinate);
    }

    if options.weld {
        weld_exact(&mut mesh);
    }
    let collapsed = remove_collapsed_faces(&mut mesh);

    let mut report = inspect(&mesh);
    report.collapsed_faces_removed = collapsed;
    debug!(
        vertices = report.vertex_count,
        faces = report.face_count,
        boundary_edges = report.boundary_edge_count,
        non_manifold_edges = report.non_manifold_edge_count,
        collapsed_faces = collapsed,
        "Inspected mesh"
    );

    if options.require_watertight {
        if !report.is_watertight {
            warn!(
                boundary_edges = report.boundary_edge_count,
                "Rejecting mesh with holes"
            );
            return Err(SolidError::NotWatertight {
                boundary_edges: report.boundary_edge_count,
            });
        }
        if !report.is_manifold {
            warn!(
                non_manifold_edges = report.non_manifold_edge_count,
                "Rejecting non-manifold mesh"
            );
            return Err(SolidError::NonManifold {
                non_manifold_edges: report.non_manifold_edge_count,
            });
        }
    }

    if report.misoriented_edge_count > 0 {
        warn!(
            misoriented_edges = report.misoriented_edge_count,
            "Mesh has faces wound against their neighbours, volume may be wrong"
        );
    }
    if report.is_inside_out {
        warn!("Mesh is inside-out, using absolute volume");
    }

    let volume = report.signed_volume.abs();
    if !volume.is_finite() || volume <= 0.0 {
        return Err(SolidError::NonPositiveVolume { volume });
    }

    Ok(SolidVolume { volume, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Vertex, cube};

    #[test]
    fn cube_volume_measured() {
        let solid = solid_volume(cube(10.0), &SolidOptions::default()).unwrap();
        assert_relative_eq!(solid.volume, 1000.0, epsilon = 1e-9);
        assert!(solid.report.is_closed_solid());
    }

    #[test]
    fn empty_mesh_rejected() {
        let err = solid_volume(IndexedMesh::new(), &SolidOptions::default()).unwrap_err();
        assert_eq!(err, SolidError::EmptyMesh);
    }

    #[test]
    fn dangling_index_rejected() {
        let mut mesh = cube(1.0);
        mesh.faces.push([0, 1, 99]);
        let err = solid_volume(mesh, &SolidOptions::default()).unwrap_err();
        assert_eq!(
            err,
            SolidError::InvalidIndex {
                face: 12,
                index: 99,
                vertex_count: 8
            }
        );
    }

    #[test]
    fn nan_coordinate_rejected() {
        let mut mesh = cube(1.0);
        mesh.vertices[3] = Vertex::from_coords(f64::NAN, 1.0, 0.0);
        let err = solid_volume(mesh, &SolidOptions::default()).unwrap_err();
        assert_eq!(err, SolidError::NonFiniteCoordinate);
    }

    #[test]
    fn open_mesh_rejected_when_watertight_required() {
        let mut mesh = cube(1.0);
        mesh.faces.pop();
        let err = solid_volume(mesh, &SolidOptions::default()).unwrap_err();
        assert_eq!(err, SolidError::NotWatertight { boundary_edges: 3 });
    }

    #[test]
    fn open_mesh_accepted_when_lenient() {
        let mut mesh = cube(1.0);
        mesh.faces.pop();
        let options = SolidOptions::default().with_require_watertight(false);
        let solid = solid_volume(mesh, &options).unwrap();
        assert!(solid.volume > 0.0);
        assert!(!solid.report.is_watertight);
    }

    #[test]
    fn non_manifold_rejected() {
        let mut mesh = cube(1.0);
        // A fin glued onto an existing edge
        mesh.vertices.push(Vertex::from_coords(0.5, -1.0, 0.0));
        mesh.faces.push([0, 1, 8]);
        mesh.faces.push([1, 0, 8]);
        let err = solid_volume(mesh, &SolidOptions::default()).unwrap_err();
        assert_eq!(
            err,
            SolidError::NonManifold {
                non_manifold_edges: 1
            }
        );
    }

    #[test]
    fn sliver_collapsed_by_weld_keeps_cube_closed() {
        let cube = cube(10.0);
        let mut soup = IndexedMesh::new();
        for &[a, b, c] in &cube.faces {
            soup.push_triangle(
                cube.vertices[a as usize],
                cube.vertices[b as usize],
                cube.vertices[c as usize],
            );
        }
        soup.push_triangle(cube.vertices[0], cube.vertices[0], cube.vertices[1]);

        let solid = solid_volume(soup, &SolidOptions::default()).unwrap();
        assert_relative_eq!(solid.volume, 1000.0, epsilon = 1e-9);
        assert_eq!(solid.report.collapsed_faces_removed, 1);
        assert_eq!(solid.report.face_count, 12);
        assert!(solid.report.is_closed_solid());
    }

    #[test]
    fn misoriented_face_is_reported() {
        let mut mesh = cube(10.0);
        let [a, b, c] = mesh.faces[0];
        mesh.faces[0] = [a, c, b];
        let solid = solid_volume(mesh, &SolidOptions::default()).unwrap();
        assert_eq!(solid.report.misoriented_edge_count, 3);
        assert!(!solid.report.is_closed_solid());
    }

    #[test]
    fn inside_out_cube_uses_absolute_volume() {
        let mut mesh = cube(2.0);
        mesh.flip_winding();
        let solid = solid_volume(mesh, &SolidOptions::default()).unwrap();
        assert_relative_eq!(solid.volume, 8.0, epsilon = 1e-9);
        assert!(solid.report.is_inside_out);
    }

    #[test]
    fn flat_closed_surface_has_no_volume() {
        // Two triangles back to back: watertight, zero volume
        let mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 1]],
        );
        let err = solid_volume(mesh, &SolidOptions::default()).unwrap_err();
        assert!(matches!(err, SolidError::NonPositiveVolume { .. }));
    }
}
