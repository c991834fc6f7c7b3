//! Temporary storage for uploaded models.
//!
//! An upload is written to a named temporary file so it can be quoted
//! from a path. The file is removed when the [`StagedUpload`] is dropped,
//! whichever way the handler exits.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use print_quote::MeshFormat;
use tempfile::NamedTempFile;
use tracing::debug;

/// An uploaded model held in a temporary file.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    format: MeshFormat,
}

impl StagedUpload {
    /// Write `bytes` to a new temporary file with the format's extension.
    pub fn stage(bytes: &[u8], format: MeshFormat) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()
            .context("failed to create staging file")?;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .context("failed to write staging file")?;
        debug!(path = %file.path().display(), bytes = bytes.len(), "Staged upload");
        Ok(Self { file, format })
    }

    /// Location of the staged file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Format the upload was staged as.
    pub const fn format(&self) -> MeshFormat {
        self.format
    }
}

/// Stage `bytes`, run `handler` on the staged path, and remove the file.
///
/// The file is gone by the time this returns, whether `handler` succeeded
/// or failed.
pub fn with_staged_upload<T, F>(bytes: &[u8], format: MeshFormat, handler: F) -> Result<T>
where
    F: FnOnce(&StagedUpload) -> Result<T>,
{
    let upload = StagedUpload::stage(bytes, format)?;
    handler(&upload)
}
