//! Closed-solid checks and volume measurement.
//!
//! A print quote is only meaningful for a mesh that encloses a volume.
//! This crate answers one question about an uploaded mesh: is it a finite,
//! positive-volume solid, and if so, how large is it?
//!
//! - Exact vertex welding to recover topology from STL triangle soup
//! - Removal of faces collapsed onto an edge by welding
//! - Edge adjacency for watertight, manifold and winding checks
//! - Signed-volume measurement with inside-out tolerance
//!
//! # Example
//!
//! ```
//! use mesh_types::cube;
//! use mesh_solid::{solid_volume, SolidOptions};
//!
//! let solid = solid_volume(cube(20.0), &SolidOptions::default()).unwrap();
//! assert!((solid.volume - 8000.0).abs() < 1e-6);
//! println!("{}", solid.report);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod error;
mod report;
mod solid;
mod weld;

pub use adjacency::MeshAdjacency;
pub use error::{SolidError, SolidResult};
pub use report::{SolidReport, inspect};
pub use solid::{SolidOptions, SolidVolume, solid_volume};
pub use weld::{remove_collapsed_faces, weld_exact};
