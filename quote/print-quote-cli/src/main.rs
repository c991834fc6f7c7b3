//! Print quotes from the command line.
//!
//! # Commands
//!
//! - `print-quote quote <FILE> --material PLA --infill 40` - Quote an STL or 3MF model
//! - `print-quote price --volume-cm3 100 --material PLA --infill 40` - Quote a known volume
//! - `print-quote materials` - List the material catalog
//!
//! Pass `--config <JSON>` to override pricing, geometry rules or materials.
//! Logs go to stderr; set `RUST_LOG` or pass `-v` for more detail.

mod commands;
mod output;
mod staging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use print_quote::MeshFormat;
use tracing_subscriber::EnvFilter;

/// 3D print quotes from STL and 3MF models
#[derive(Parser)]
#[command(name = "print-quote")]
#[command(about = "Estimate filament weight and price for 3D prints", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON config with pricing, geometry rules and materials
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a model file (`-` reads stdin)
    Quote {
        /// STL or 3MF file, in millimeters
        #[arg(name = "FILE")]
        file: PathBuf,

        /// Material name (see `materials`)
        #[arg(short, long)]
        material: String,

        /// Infill percentage: 15, 40, 70 or 100
        #[arg(short, long)]
        infill: u32,

        /// Model format, required for stdin (stl or 3mf)
        #[arg(long)]
        format: Option<MeshFormat>,
    },

    /// Quote a known volume
    Price {
        /// Model volume in cm³
        #[arg(long)]
        volume_cm3: f64,

        /// Material name (see `materials`)
        #[arg(short, long)]
        material: String,

        /// Infill percentage: 15, 40, 70 or 100
        #[arg(short, long)]
        infill: u32,
    },

    /// List the material catalog
    Materials,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let estimator = commands::load_estimator(cli.config.as_deref())?;

    match cli.command {
        Commands::Quote {
            file,
            material,
            infill,
            format,
        } => commands::quote(&estimator, &file, format, &material, infill, cli.json),
        Commands::Price {
            volume_cm3,
            material,
            infill,
        } => commands::price(&estimator, volume_cm3, &material, infill, cli.json),
        Commands::Materials => commands::materials(&estimator, cli.json),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_quote_arguments() {
        let cli = Cli::try_parse_from([
            "print-quote",
            "-v",
            "quote",
            "-",
            "--material",
            "PETG",
            "--infill",
            "70",
            "--format",
            "3mf",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(cli.json);
        match cli.command {
            Commands::Quote {
                file,
                material,
                infill,
                format,
            } => {
                assert_eq!(file, PathBuf::from("-"));
                assert_eq!(material, "PETG");
                assert_eq!(infill, 70);
                assert_eq!(format, Some(MeshFormat::ThreeMf));
            }
            _ => panic!("expected quote"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        let args = [
            "print-quote", "quote", "-", "-m", "PLA", "-i", "40", "--format", "obj",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
