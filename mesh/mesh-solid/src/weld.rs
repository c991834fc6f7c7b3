//! Exact vertex welding.

use hashbrown::HashMap;
use mesh_types::IndexedMesh;
use tracing::debug;

/// Merge vertices with bit-identical positions and remap faces.
///
/// STL stores one vertex per facet corner, so a closed part arrives as
/// disconnected triangles. Exporters write the same `f32` for a shared
/// corner, which makes an exact match sufficient to restore the topology.
/// `-0.0` and `+0.0` are treated as equal.
///
/// Returns the number of vertices removed. Faces with out-of-range indices
/// are left untouched.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, MeshTopology, Vertex};
/// use mesh_solid::weld_exact;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.push_triangle(
///     Vertex::from_coords(0.0, 0.0, 0.0),
///     Vertex::from_coords(1.0, 0.0, 0.0),
///     Vertex::from_coords(0.0, 1.0, 0.0),
/// );
/// mesh.push_triangle(
///     Vertex::from_coords(1.0, 0.0, 0.0),
///     Vertex::from_coords(1.0, 1.0, 0.0),
///     Vertex::from_coords(0.0, 1.0, 0.0),
/// );
///
/// assert_eq!(weld_exact(&mut mesh), 2);
/// assert_eq!(mesh.vertex_count(), 4);
/// ```
#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
pub fn weld_exact(mesh: &mut IndexedMesh) -> usize {
    let original = mesh.vertices.len();
    let mut canonical: HashMap<[u64; 3], u32> = HashMap::with_capacity(original / 2);
    let mut remap = Vec::with_capacity(original);
    let mut welded = Vec::with_capacity(original / 2);

    for vertex in &mesh.vertices {
        let p = vertex.position;
        let key = [
            (p.x + 0.0).to_bits(),
            (p.y + 0.0).to_bits(),
            (p.z + 0.0).to_bits(),
        ];
        let index = *canonical.entry(key).or_insert_with(|| {
            welded.push(*vertex);
            (welded.len() - 1) as u32
        });
        remap.push(index);
    }

    let removed = original - welded.len();
    if removed == 0 {
        return 0;
    }

    for face in &mut mesh.faces {
        if face.iter().all(|&i| (i as usize) < remap.len()) {
            *face = face.map(|i| remap[i as usize]);
        }
    }
    mesh.vertices = welded;

    debug!(removed, remaining = mesh.vertices.len(), "Welded vertices");
    removed
}

/// Remove faces that reference the same vertex more than once.
///
/// Welding can collapse a sliver facet onto an edge (`[a, a, b]`). Such a
/// face encloses nothing but would count as a second use of edge `a-b`,
/// turning a closed part into one with a phantom hole or fin.
///
/// Returns the number of faces removed.
pub fn remove_collapsed_faces(mesh: &mut IndexedMesh) -> usize {
    let original = mesh.faces.len();
    mesh.faces.retain(|&[a, b, c]| a != b && b != c && a != c);
    let removed = original - mesh.faces.len();
    if removed > 0 {
        debug!(removed, remaining = mesh.faces.len(), "Removed collapsed faces");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{MeshTopology, Vertex, cube};

    fn soup_of(mesh: &IndexedMesh) -> IndexedMesh {
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

    #[test]
    fn cube_soup_welds_to_eight_vertices() {
        let mut soup = soup_of(&cube(3.0));
        assert_eq!(soup.vertex_count(), 36);

        assert_eq!(weld_exact(&mut soup), 28);
        assert_eq!(soup.vertex_count(), 8);
        assert_eq!(soup.face_count(), 12);
        assert_relative_eq!(soup.volume(), 27.0, epsilon = 1e-9);
    }

    #[test]
    fn already_indexed_mesh_unchanged() {
        let mut mesh = cube(1.0);
        let before = mesh.clone();
        assert_eq!(weld_exact(&mut mesh), 0);
        assert_eq!(mesh, before);
    }

    #[test]
    fn signed_zero_is_merged() {
        let mut mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(-0.0, 0.0, -0.0),
            ],
            vec![],
        );
        assert_eq!(weld_exact(&mut mesh), 1);
    }

    #[test]
    fn sliver_collapsed_by_weld_is_removed() {
        let cube = cube(10.0);
        let mut soup = soup_of(&cube);
        let (v0, v1) = (cube.vertices[0], cube.vertices[1]);
        soup.push_triangle(v0, v0, v1);

        weld_exact(&mut soup);
        assert_eq!(soup.face_count(), 13);
        assert_eq!(remove_collapsed_faces(&mut soup), 1);
        assert_eq!(soup.face_count(), 12);
        assert_relative_eq!(soup.volume(), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn distinct_indices_are_kept() {
        let mut mesh = cube(1.0);
        assert_eq!(remove_collapsed_faces(&mut mesh), 0);
        assert_eq!(mesh.face_count(), 12);
    }

    #[test]
    fn nearby_but_distinct_positions_are_kept() {
        let mut mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(1.0 + 1e-9, 0.0, 0.0),
            ],
            vec![],
        );
        assert_eq!(weld_exact(&mut mesh), 0);
    }
}
