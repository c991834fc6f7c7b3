//! Edge adjacency for closed-surface checks.

use hashbrown::HashMap;

/// Faces using one undirected edge.
#[derive(Debug, Clone, Copy, Default)]
struct EdgeUse {
    faces: u32,
    /// Faces that traverse the edge from the lower to the higher index.
    forward: u32,
}

/// Edge-to-face adjacency for a triangle mesh.
///
/// A closed solid has every edge shared by exactly two faces. An edge
/// with one face is a hole (boundary); more than two is non-manifold.
/// Consistently wound neighbours traverse their shared edge in opposite
/// directions.
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    /// Maps edge (v0, v1) with v0 < v1 to its uses.
    edge_faces: HashMap<(u32, u32), EdgeUse>,
}

impl MeshAdjacency {
    /// Build adjacency from faces.
    ///
    /// ```
    /// use mesh_solid::MeshAdjacency;
    ///
    /// let adj = MeshAdjacency::build(&[[0, 1, 2], [1, 3, 2]]);
    /// assert_eq!(adj.edge_count(), 5);
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_faces: HashMap<(u32, u32), EdgeUse> =
            HashMap::with_capacity(faces.len() * 3 / 2);

        for &[a, b, c] in faces {
            for (from, to) in [(a, b), (b, c), (c, a)] {
                let edge = edge_faces.entry(normalize_edge(from, to)).or_default();
                edge.faces += 1;
                edge.forward += u32::from(from < to);
            }
        }

        Self { edge_faces }
    }

    /// Number of faces sharing an edge, in either direction.
    #[must_use]
    pub fn faces_on_edge(&self, v0: u32, v1: u32) -> u32 {
        self.edge_faces
            .get(&normalize_edge(v0, v1))
            .map_or(0, |edge| edge.faces)
    }

    /// Total number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_faces.len()
    }

    /// Edges with exactly one adjacent face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_faces.values().filter(|e| e.faces == 1).count()
    }

    /// Edges with more than two adjacent faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_faces.values().filter(|e| e.faces > 2).count()
    }

    /// No boundary edges.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_faces.values().all(|e| e.faces >= 2)
    }

    /// No edge shared by more than two faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_faces.values().all(|e| e.faces <= 2)
    }

    /// Two-face edges whose faces both run the same way along it.
    ///
    /// Each one marks a face whose winding disagrees with its neighbour,
    /// which makes the signed volume meaningless.
    #[must_use]
    pub fn misoriented_edge_count(&self) -> usize {
        self.edge_faces
            .values()
            .filter(|e| e.faces == 2 && e.forward != 1)
            .count()
    }

    /// Every two-face edge is traversed once in each direction.
    #[must_use]
    pub fn is_consistently_wound(&self) -> bool {
        self.misoriented_edge_count() == 0
    }
}

#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}
