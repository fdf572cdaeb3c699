//! volview - headless volume viewer
//!
//! Loads a scalar field from a raw grid, FLASH, VTK or UMesh file, drives the
//! transfer function and isovalue editors from the command line, and hands
//! the field and every update to a render consumer.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};
use volview_core::ScalarType;

mod backend;
mod session;

#[derive(Parser, Debug)]
#[command(name = "volview")]
#[command(author, version, about = "Headless volume viewer")]
#[command(long_about = "
Loads one scalar field and forwards it, together with the transfer function
and isovalues, to a render consumer library.

Raw grids need their dims and cell type, either from --dims/--type or from a
file name such as volume_256x256x128_uint16.raw.

Examples:
  volview skull_256x256x256_uint8.raw
  volview data.raw -d 64 64 32 -t float32 --compute-range
  volview mesh.vtu --variable pressure --preset 'Cool Warm'
  volview mesh.umesh -l null -g --trace trace/ --iso 0.2 0.8
")]
struct Cli {
    /// Input volume file
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Render consumer library (summary, null, or environment)
    #[arg(short = 'l', long, default_value = "environment")]
    library: String,

    /// Validate every update before it reaches the library
    #[arg(short = 'g', long)]
    debug: bool,

    /// Write validated updates as YAML into this directory (implies --debug)
    #[arg(long, value_name = "DIR")]
    trace: Option<PathBuf>,

    /// Raw grid dimensions
    #[arg(short = 'd', long, num_args = 3, value_names = ["X", "Y", "Z"])]
    dims: Option<Vec<usize>>,

    /// Raw grid cell type
    #[arg(short = 't', long = "type", value_enum)]
    scalar_type: Option<ScalarArg>,

    /// Accepted for compatibility; has no effect
    #[arg(long = "noDefaultLayout")]
    no_default_layout: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Transfer function preset to start with
    #[arg(long)]
    preset: Option<String>,

    /// Transfer function preset file (YAML), added to the catalog and selected
    #[arg(long, value_name = "YAML")]
    tfn: Option<PathBuf>,

    /// Transfer function sample count
    #[arg(long, default_value_t = volview_tfn::DEFAULT_SAMPLE_COUNT)]
    samples: usize,

    /// Isovalues to enable (up to four)
    #[arg(long, num_args = 1..=4, value_name = "VALUE", allow_negative_numbers = true)]
    iso: Vec<f32>,

    /// Opacity scale applied to every sample
    #[arg(long, default_value_t = 1.0)]
    opacity_scale: f32,

    /// Prefix each unstructured cell's index run with its vertex count
    #[arg(long)]
    index_prefixed: bool,

    /// Compute the raw grid's value range from its cells instead of [0, 1]
    #[arg(long)]
    compute_range: bool,

    /// Field index in multi-field files
    #[arg(long, default_value_t = 0)]
    field: usize,

    /// Field name in multi-field files (VTK array, FLASH variable)
    #[arg(long)]
    variable: Option<String>,

    /// Frames to run
    #[arg(long, default_value_t = 1)]
    frames: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScalarArg {
    Uint8,
    Uint16,
    Float32,
}

impl From<ScalarArg> for ScalarType {
    fn from(s: ScalarArg) -> Self {
        match s {
            ScalarArg::Uint8 => ScalarType::U8,
            ScalarArg::Uint16 => ScalarType::U16,
            ScalarArg::Float32 => ScalarType::F32,
        }
    }
}

impl Cli {
    fn dims(&self) -> Option<[usize; 3]> {
        match self.dims.as_deref() {
            Some(&[x, y, z]) => Some([x, y, z]),
            _ => None,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.file.is_none() {
        eprintln!("ERROR: no input file provided");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let stats = session::run(cli)?;
    tracing::debug!(
        "{} frame(s), {} transfer function update(s), {} isovalue update(s)",
        stats.frames,
        stats.tfn_updates,
        stats.iso_updates
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["volview", "volume.raw"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("volume.raw")));
        assert_eq!(cli.library, "environment");
        assert_eq!(cli.samples, 256);
        assert_eq!(cli.frames, 1);
        assert_eq!(cli.opacity_scale, 1.0);
        assert!(!cli.debug && !cli.verbose);
        assert!(cli.dims().is_none());
    }

    #[test]
    fn test_dims_and_type() {
        let cli =
            Cli::try_parse_from(["volview", "-d", "64", "32", "16", "-t", "uint16", "v.raw"])
                .unwrap();
        assert_eq!(cli.dims(), Some([64, 32, 16]));
        assert_eq!(cli.scalar_type.map(ScalarType::from), Some(ScalarType::U16));
        assert_eq!(cli.file, Some(PathBuf::from("v.raw")));
    }

    #[test]
    fn test_bad_type_rejected() {
        assert!(Cli::try_parse_from(["volview", "-t", "int64", "v.raw"]).is_err());
        assert!(Cli::try_parse_from(["volview", "-d", "64", "32"]).is_err());
    }

    #[test]
    fn test_compat_flags() {
        let cli = Cli::try_parse_from([
            "volview",
            "--noDefaultLayout",
            "-g",
            "--trace",
            "out",
            "-l",
            "null",
            "v.raw",
        ])
        .unwrap();
        assert!(cli.no_default_layout);
        assert!(cli.debug);
        assert_eq!(cli.trace, Some(PathBuf::from("out")));
        assert_eq!(cli.library, "null");
    }

    #[test]
    fn test_isovalues() {
        let cli = Cli::try_parse_from(["volview", "v.raw", "--iso", "-0.5", "0.25"]).unwrap();
        assert_eq!(cli.iso, vec![-0.5, 0.25]);
        assert!(
            Cli::try_parse_from(["volview", "v.raw", "--iso", "1", "2", "3", "4", "5"]).is_err()
        );
    }

    #[test]
    fn test_missing_file_parses() {
        let cli = Cli::try_parse_from(["volview", "-v"]).unwrap();
        assert!(cli.file.is_none());
    }
}
