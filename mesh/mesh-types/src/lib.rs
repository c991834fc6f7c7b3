//! Core mesh types for the print quote pipeline.
//!
//! Uploaded models are decoded into an [`IndexedMesh`] before their volume
//! is measured. This crate keeps only what that path needs:
//!
//! - [`Vertex`] - A point in 3D space
//! - [`IndexedMesh`] - A triangle mesh with indexed vertices
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Units
//!
//! Coordinates are `f64` and unit-agnostic. Print files are conventionally
//! authored in millimeters, so volumes computed here are usually mm³.
//!
//! # Winding
//!
//! Faces are expected to be counter-clockwise when viewed from outside, so
//! a correctly oriented closed mesh has a positive signed volume.
//!
//! # Example
//!
//! ```
//! use mesh_types::{IndexedMesh, MeshTopology, Vertex};
//!
//! let mut mesh = IndexedMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod mesh;
mod traits;
mod vertex;

pub use bounds::Aabb;
pub use mesh::{IndexedMesh, cube};
pub use traits::{MeshBounds, MeshTopology};
pub use vertex::Vertex;

pub use nalgebra::{Point3, Vector3};
