//! Error types for quoting and configuration.

use std::path::PathBuf;

use mesh_io::IoError;
use mesh_solid::SolidError;
use thiserror::Error;

/// Result type for quote operations.
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Reasons a quote cannot be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// The model cannot be read, is not a closed solid, or the volume is
    /// negative or not finite.
    #[error("invalid geometry: {reason}")]
    InvalidGeometry {
        /// What is wrong with the geometry.
        reason: String,
    },

    /// Unknown material or an infill outside the offered set.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What is wrong with the input.
        reason: String,
    },
}

impl QuoteError {
    /// Create an invalid geometry error.
    pub fn geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Create an invalid input error.
    pub fn input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<IoError> for QuoteError {
    fn from(err: IoError) -> Self {
        Self::geometry(err.to_string())
    }
}

impl From<SolidError> for QuoteError {
    fn from(err: SolidError) -> Self {
        Self::geometry(err.to_string())
    }
}

/// Errors loading or validating a [`QuoteConfig`](crate::QuoteConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config is not valid JSON or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid {field}: {reason}")]
    InvalidValue {
        /// Offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
