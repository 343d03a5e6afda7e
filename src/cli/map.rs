//! CLI dispatch for the `tilepack map` command.
//!
//! Loads every input, runs the map pipeline in memory and only then
//! creates the output directory.

use clap::Args;
use std::process::ExitCode;

use crate::config::MapConfig;
use crate::error::{Result, EXIT_SUCCESS};
use crate::geometry::{parse_size, SheetSize};
use crate::output::{check_inputs, write_tilemap, OutputTarget, WriteOptions};
use crate::pipeline::{generate, sheet_image_name, IndexPolicy, MapOptions, Tilemap};
use crate::report::Reporter;
use crate::sheet::SheetLayout;
use crate::source::load_sources;

use super::{fail, split_positionals};

const USAGE: &str = "tilepack map <INPUTS>... -- <TILE WxH> <OUT_DIR/PREFIX> <SHEET W|WxH>";

#[derive(Args, Debug)]
pub struct MapArgs {
    /// Source images, followed by `--` and the parameters
    #[arg(required = true, value_name = "INPUTS")]
    pub inputs: Vec<String>,

    /// TILE (e.g. 8x8), OUT_DIR/PREFIX and SHEET (e.g. 256 or 256x64)
    #[arg(last = true, value_name = "PARAMS")]
    pub params: Vec<String>,

    /// Split a one-pixel palette row off the top of source images
    #[arg(long)]
    pub palette: bool,

    /// Which images get a tile layer: last (default) or all
    #[arg(long, value_enum)]
    pub index: Option<IndexPolicy>,

    /// Fail if the tiles do not fit in the requested sheet height
    #[arg(long)]
    pub strict: bool,

    /// Also write every unique tile as <PREFIX><NNNN>.png
    #[arg(long)]
    pub keep_tiles: bool,

    /// Write into an existing output directory
    #[arg(long)]
    pub force: bool,

    /// Indent the map JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the map command.
pub fn run_map(args: &MapArgs, config: &MapConfig, reporter: &dyn Reporter) -> ExitCode {
    match execute(args, config, reporter) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail(&e),
    }
}

fn execute(args: &MapArgs, config: &MapConfig, reporter: &dyn Reporter) -> Result<String> {
    let (inputs, params) = split_positionals(&args.inputs, &args.params, 3, USAGE)?;
    let tile = parse_size("tile", &params[0])?;
    let target = OutputTarget::parse(&params[1])?;
    let sheet = SheetSize::parse(&params[2])?;
    SheetLayout::new(tile, sheet.width)?;

    let write_options = WriteOptions {
        map_file: config.map_file.clone(),
        removed_log: config.removed_log.clone(),
        keep_tiles: args.keep_tiles || config.keep_tiles,
        pretty: args.pretty || config.pretty,
        force: args.force,
    };

    check_inputs(&inputs)?;
    target.check_available(write_options.force)?;

    let sources = load_sources(&inputs, reporter)?;

    let options = MapOptions {
        tile,
        sheet,
        palette: args.palette || config.palette,
        index: args.index.unwrap_or(config.index),
        strict: args.strict || config.strict,
        name: target.prefix.clone(),
        sheet_image: sheet_image_name(&sheet),
    };
    let tilemap = generate(sources, &options, reporter)?;
    write_tilemap(&tilemap, &target, &write_options, reporter)?;

    Ok(summary(&tilemap, &target))
}

fn summary(tilemap: &Tilemap, target: &OutputTarget) -> String {
    format!(
        "Wrote {}: {} tiles, {} unique, {} duplicates removed, sheet {}x{}",
        target.dir.display(),
        tilemap.tile_count(),
        tilemap.registry.len(),
        tilemap.registry.duplicates(),
        tilemap.sheet.width(),
        tilemap.sheet.height()
    )
}
