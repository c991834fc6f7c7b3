//! Decoding errors.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias for model decoding.
pub type IoResult<T> = Result<T, IoError>;

/// Why an uploaded model could not be turned into a mesh.
#[derive(Debug, Error)]
pub enum IoError {
    /// No file at the given path.
    #[error("model file not found: {}", .path.display())]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// Extension or format name is neither STL nor 3MF.
    #[error("unsupported model format `{extension}` (expected stl or 3mf)")]
    UnknownFormat {
        /// The rejected extension or name.
        extension: String,
    },

    /// The bytes do not follow the format.
    #[error("malformed model: {message}")]
    InvalidContent {
        /// What was wrong.
        message: String,
    },

    /// Binary STL shorter than its header and triangle count.
    #[error("STL is {len} bytes, shorter than the {required}-byte preamble")]
    TruncatedHeader {
        /// Bytes required for the preamble.
        required: usize,
        /// Bytes available.
        len: usize,
    },

    /// Binary STL ends before its declared triangle count.
    #[error("STL declares {declared} triangles but only {complete} are present")]
    TruncatedBody {
        /// Triangle count from the header.
        declared: u32,
        /// Complete triangle records found.
        complete: u32,
    },

    /// Reading or writing failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An ASCII coordinate is not a number.
    #[error("bad coordinate: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl IoError {
    /// Shorthand for [`IoError::InvalidContent`].
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    pub(crate) fn from_open(err: std::io::Error, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => Self::Io(err),
        }
    }
}
