//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod map;
mod wrap;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::load_config;
use crate::error::{Error, Result};
use crate::report::{verbose_from_env, ConsoleReporter};

pub use map::MapArgs;
pub use wrap::WrapArgs;

/// tilepack - Cut images into deduplicated tilesets and Tiled maps
#[derive(Parser)]
#[command(name = "tilepack")]
#[command(about = "Cut images into deduplicated tilesets, Tiled maps and wraparound sheets")]
#[command(version)]
pub struct Cli {
    /// Show per-image and per-tile diagnostics (also TILEPACK_VERBOSE=1)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of searching for tilepack.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a deduplicated tileset and a Tiled map from images
    ///
    /// tilepack map <INPUTS>... -- <TILE WxH> <OUT_DIR/PREFIX> <SHEET W|WxH>
    Map(MapArgs),

    /// Build a sheet of vertically shifted animation frames from 8x8 tiles
    ///
    /// tilepack wrap <INPUTS>... -- <OUTPUT.png> <WIDTH> <STEP>
    Wrap(WrapArgs),
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let reporter = ConsoleReporter::new().with_verbose(cli.verbose || verbose_from_env());

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(&Error::from(e)),
    };

    match cli.command {
        Commands::Map(args) => map::run_map(&args, &config.map, &reporter),
        Commands::Wrap(args) => wrap::run_wrap(&args, &config.wrap, &reporter),
    }
}

/// Print an error and turn it into its exit code.
pub(crate) fn fail(error: &Error) -> ExitCode {
    eprintln!("Error: {}", error);
    ExitCode::from(error.exit_code())
}

/// Separate input files from command parameters.
///
/// `inputs` holds the positionals before `--` and `params` those after it.
/// Without `--`, a single input followed by exactly `expected` parameters
/// is accepted as well.
pub(crate) fn split_positionals(
    inputs: &[String],
    params: &[String],
    expected: usize,
    usage: &str,
) -> Result<(Vec<PathBuf>, Vec<String>)> {
    if params.is_empty() {
        if inputs.len() == expected + 1 {
            return Ok((vec![PathBuf::from(&inputs[0])], inputs[1..].to_vec()));
        }
        return Err(Error::InvalidArgs(format!(
            "missing '--' between input files and parameters\nusage: {}",
            usage
        )));
    }

    if inputs.is_empty() {
        return Err(Error::InvalidArgs(format!("no input files given\nusage: {}", usage)));
    }
    if params.len() != expected {
        return Err(Error::InvalidArgs(format!(
            "expected {} parameters after '--', got {}\nusage: {}",
            expected,
            params.len(),
            usage
        )));
    }
    Ok((inputs.iter().map(PathBuf::from).collect(), params.to_vec()))
}
