//! Error types for solid checks.

use thiserror::Error;

/// Result type for solid checks.
pub type SolidResult<T> = Result<T, SolidError>;

/// Reasons a mesh does not describe a printable solid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolidError {
    /// Mesh has no vertices or no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// Offending face.
        face: usize,
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("mesh contains non-finite coordinates")]
    NonFiniteCoordinate,

    /// The surface has holes.
    #[error("mesh is not watertight: {boundary_edges} boundary edges")]
    NotWatertight {
        /// Edges with a single adjacent face.
        boundary_edges: usize,
    },

    /// Some edges are shared by more than two faces.
    #[error("mesh is not manifold: {non_manifold_edges} edges shared by more than two faces")]
    NonManifold {
        /// Edges with more than two adjacent faces.
        non_manifold_edges: usize,
    },

    /// Enclosed volume is zero, negative after orientation, or not finite.
    #[error("mesh does not enclose a positive volume (got {volume})")]
    NonPositiveVolume {
        /// Measured volume.
        volume: f64,
    },
}
