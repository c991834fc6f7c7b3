//! Subcommand handlers.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use print_quote::{Estimator, MeshFormat, PriceQuote, QuoteConfig};
use tracing::{debug, info};

use crate::output;
use crate::staging::with_staged_upload;

/// Build the estimator from an optional config file.
pub fn load_estimator(config: Option<&Path>) -> Result<Estimator> {
    let config = match config {
        Some(path) => QuoteConfig::from_path(path)?,
        None => QuoteConfig::default(),
    };
    Ok(Estimator::from_config(&config)?)
}

/// `print-quote quote`
pub fn quote(
    estimator: &Estimator,
    file: &Path,
    format: Option<MeshFormat>,
    material: &str,
    infill: u32,
    json: bool,
) -> Result<()> {
    let (bytes, format) = read_upload(file, format)?;
    let quote = quote_upload(estimator, &bytes, format, material, infill)?;
    println!("{}", output::quote(&quote, json)?);
    Ok(())
}

/// Stage an upload and quote it from the staged file.
pub fn quote_upload(
    estimator: &Estimator,
    bytes: &[u8],
    format: MeshFormat,
    material: &str,
    infill: u32,
) -> Result<PriceQuote> {
    with_staged_upload(bytes, format, |upload| {
        debug!(format = %upload.format(), "Quoting staged upload");
        Ok(estimator.quote_file(upload.path(), material, infill)?)
    })
}

/// `print-quote materials`
pub fn materials(estimator: &Estimator, json: bool) -> Result<()> {
    println!("{}", output::materials(estimator.catalog(), json)?);
    Ok(())
}

/// `print-quote price`
pub fn price(
    estimator: &Estimator,
    volume_cm3: f64,
    material: &str,
    infill: u32,
    json: bool,
) -> Result<()> {
    let quote = estimator.estimate(volume_cm3, material, infill)?;
    println!("{}", output::quote(&quote, json)?);
    Ok(())
}

fn read_upload(file: &Path, format: Option<MeshFormat>) -> Result<(Vec<u8>, MeshFormat)> {
    if file == Path::new("-") {
        let Some(format) = format else {
            bail!("--format is required when reading from stdin");
        };
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("failed to read model from stdin")?;
        info!(bytes = bytes.len(), "Read model from stdin");
        return Ok((bytes, format));
    }

    let format = match format {
        Some(format) => format,
        None => MeshFormat::from_path(file).with_context(|| {
            format!(
                "cannot tell the format of {}; pass --format stl|3mf",
                file.display()
            )
        })?,
    };
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    info!(path = %file.display(), bytes = bytes.len(), "Read model");
    Ok((bytes, format))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use mesh_io::write_stl;
    use mesh_types::cube;
    use print_quote::QuoteError;

    fn cube_stl(edge: f64) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_stl(&cube(edge), &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn upload_quoted_from_staged_file() {
        let quote =
            quote_upload(&Estimator::default(), &cube_stl(10.0), MeshFormat::Stl, "PLA", 40)
                .unwrap();
        assert!((quote.volume_cm3() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn geometry_error_surfaces_through_handler() {
        let err = quote_upload(&Estimator::default(), b"garbage", MeshFormat::Stl, "PLA", 40)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QuoteError>(),
            Some(QuoteError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn format_from_file_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.stl");
        std::fs::write(&path, cube_stl(10.0)).unwrap();

        let (bytes, format) = read_upload(&path, None).unwrap();
        assert_eq!(format, MeshFormat::Stl);
        assert_eq!(bytes.len(), 84 + 12 * 50);
    }

    #[test]
    fn unknown_extension_needs_format_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.bin");
        std::fs::write(&path, cube_stl(10.0)).unwrap();

        assert!(read_upload(&path, None).is_err());
        let (_, format) = read_upload(&path, Some(MeshFormat::Stl)).unwrap();
        assert_eq!(format, MeshFormat::Stl);
    }

    #[test]
    fn stdin_needs_format_flag() {
        assert!(read_upload(Path::new("-"), None).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_estimator(Some(Path::new("/nonexistent/print-quote.json"))).is_err());
        assert_eq!(load_estimator(None).unwrap(), Estimator::default());
    }
}
