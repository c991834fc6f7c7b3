//! Property-based tests for solid measurement.
//!
//! Run with: cargo test -p mesh-solid -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mesh_solid::{SolidError, SolidOptions, solid_volume, weld_exact};
use mesh_types::{IndexedMesh, MeshTopology, Vector3, cube};
use proptest::prelude::*;

/// Rebuild a mesh as STL-style triangle soup.
fn as_soup(mesh: &IndexedMesh) -> IndexedMesh {
    let mut soup = IndexedMesh::new();
    for &[a, b, c] in &mesh.faces {
        soup.push_triangle(
            mesh.vertices[a as usize],
            mesh.vertices[b as usize],
            mesh.vertices[c as usize],
        );
    }
    soup
}

fn translated_cube(edge: f64, offset: [f64; 3]) -> IndexedMesh {
    let mut mesh = cube(edge);
    let offset = Vector3::new(offset[0], offset[1], offset[2]);
    for vertex in &mut mesh.vertices {
        vertex.position += offset;
    }
    mesh
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_cube_volume_independent_of_position(
        edge in 0.5..200.0f64,
        offset in prop::array::uniform3(-500.0..500.0f64),
    ) {
        let solid = solid_volume(translated_cube(edge, offset), &SolidOptions::default()).unwrap();
        let expected = edge * edge * edge;
        prop_assert!((solid.volume - expected).abs() <= expected * 1e-9);
    }

    #[test]
    fn proptest_soup_welds_back_to_closed_solid(edge in 0.5..200.0f64) {
        let mut soup = as_soup(&cube(edge));
        prop_assert_eq!(soup.vertex_count(), 36);
        weld_exact(&mut soup);
        prop_assert_eq!(soup.vertex_count(), 8);

        let solid = solid_volume(as_soup(&cube(edge)), &SolidOptions::default()).unwrap();
        prop_assert!(solid.report.is_watertight);
    }

    #[test]
    fn proptest_removing_any_face_opens_the_solid(edge in 0.5..50.0f64, face in 0usize..12) {
        let mut mesh = cube(edge);
        mesh.faces.remove(face);
        let result = solid_volume(mesh, &SolidOptions::default());
        prop_assert_eq!(result.unwrap_err(), SolidError::NotWatertight { boundary_edges: 3 });
    }

    #[test]
    fn proptest_volume_is_never_negative(edge in 0.5..50.0f64, flip in any::<bool>()) {
        let mut mesh = cube(edge);
        if flip {
            mesh.flip_winding();
        }
        let solid = solid_volume(mesh, &SolidOptions::default()).unwrap();
        prop_assert!(solid.volume > 0.0);
    }
}
