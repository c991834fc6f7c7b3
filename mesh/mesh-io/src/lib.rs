//! Model file decoding for print quotes.
//!
//! Turns an uploaded model into an [`IndexedMesh`]:
//!
//! - **STL** (Stereolithography) - Binary and ASCII
//! - **3MF** (3D Manufacturing Format) - ZIP-based XML, scaled to millimeters
//!
//! Uploads are usually already in memory, so every format parses from a
//! byte slice; path-based helpers exist for CLI use.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_mesh, parse_mesh, MeshFormat};
//!
//! // Format detected from the .stl extension
//! let mesh = load_mesh("model.stl").unwrap();
//!
//! // Or from bytes with an explicit format
//! let bytes = std::fs::read("model.3mf").unwrap();
//! let mesh = parse_mesh(&bytes, MeshFormat::ThreeMf).unwrap();
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod stl;
mod threemf;

pub use error::{IoError, IoResult};
pub use stl::{load_stl, parse_stl, save_stl, write_stl};
pub use threemf::{load_3mf, parse_3mf, save_3mf, write_3mf};

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use mesh_types::IndexedMesh;
use tracing::info;

/// Supported model file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// STL, binary or ASCII.
    Stl,
    /// 3MF archive.
    ThreeMf,
}

impl MeshFormat {
    /// Detect format from file extension (case-insensitive).
    ///
    /// Returns `None` if the extension is missing or not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref().extension()?.to_str()?.parse().ok()
    }

    /// The canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::ThreeMf => "3mf",
        }
    }
}

impl FromStr for MeshFormat {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stl" => Ok(Self::Stl),
            "3mf" => Ok(Self::ThreeMf),
            _ => Err(IoError::UnknownFormat {
                extension: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parse a model from bytes in the given format.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid model of that format.
pub fn parse_mesh(bytes: &[u8], format: MeshFormat) -> IoResult<IndexedMesh> {
    let mesh = match format {
        MeshFormat::Stl => parse_stl(bytes)?,
        MeshFormat::ThreeMf => parse_3mf(bytes)?,
    };
    info!(
        %format,
        bytes = bytes.len(),
        faces = mesh.faces.len(),
        "Decoded model"
    );
    Ok(mesh)
}

/// Load a model from a file, detecting format from the extension.
///
/// # Errors
///
/// Returns an error if:
/// - The extension is missing or not a supported format
/// - The file cannot be read
/// - The content is invalid for the detected format
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    let bytes = std::fs::read(path).map_err(|e| IoError::from_open(e, path))?;
    parse_mesh(&bytes, format)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use mesh_types::{MeshTopology, cube};

    #[test]
    fn format_from_path() {
        assert_eq!(MeshFormat::from_path("model.stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("model.STL"), Some(MeshFormat::Stl));
        assert_eq!(
            MeshFormat::from_path("/uploads/part.3MF"),
            Some(MeshFormat::ThreeMf)
        );
        assert_eq!(MeshFormat::from_path("model.obj"), None);
        assert_eq!(MeshFormat::from_path("model"), None);
        assert_eq!(MeshFormat::from_path(""), None);
    }

    #[test]
    fn format_from_str_rejects_unknown() {
        let err = "ply".parse::<MeshFormat>().unwrap_err();
        assert!(matches!(err, IoError::UnknownFormat { extension } if extension == "ply"));
    }

    #[test]
    fn format_display_is_extension() {
        assert_eq!(MeshFormat::Stl.to_string(), "stl");
        assert_eq!(MeshFormat::ThreeMf.to_string(), "3mf");
    }

    #[test]
    fn load_mesh_unknown_extension() {
        let err = load_mesh("part.step").unwrap_err();
        assert!(matches!(err, IoError::UnknownFormat { extension } if extension == "step"));
    }

    #[test]
    fn load_mesh_dispatches_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let stl = dir.path().join("cube.stl");
        save_stl(&cube(5.0), &stl).unwrap();
        assert_eq!(load_mesh(&stl).unwrap().face_count(), 12);

        let three_mf = dir.path().join("cube.3mf");
        save_3mf(&cube(5.0), &three_mf).unwrap();
        assert_eq!(load_mesh(&three_mf).unwrap().vertex_count(), 8);
    }
}
