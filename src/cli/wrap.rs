//! CLI dispatch for the `tilepack wrap` command.

use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::WrapConfig;
use crate::error::{Error, Result, EXIT_SUCCESS};
use crate::output::{check_inputs, save_png};
use crate::report::{Event, Reporter};
use crate::sheet::SheetLayout;
use crate::source::load_sources;
use crate::wrap::{wrap_sheet, Direction, FrameOrder, WrapOptions, WRAP_TILE};

use super::{fail, split_positionals};

const USAGE: &str = "tilepack wrap <INPUTS>... -- <OUTPUT.png> <WIDTH> <STEP>";

#[derive(Args, Debug)]
pub struct WrapArgs {
    /// Source images, followed by `--` and the parameters
    #[arg(required = true, value_name = "INPUTS")]
    pub inputs: Vec<String>,

    /// OUTPUT.png, sheet WIDTH (multiple of 8) and STEP (1, 2 or 4)
    #[arg(last = true, value_name = "PARAMS")]
    pub params: Vec<String>,

    /// Scroll direction: down (default) or up
    #[arg(long, value_enum)]
    pub direction: Option<Direction>,

    /// Wrap rows in from the neighbouring tile of the same image column
    #[arg(long)]
    pub blend: bool,

    /// Frame order: tile (default) or frame
    #[arg(long, value_enum)]
    pub order: Option<FrameOrder>,
}

/// Execute the wrap command.
pub fn run_wrap(args: &WrapArgs, config: &WrapConfig, reporter: &dyn Reporter) -> ExitCode {
    match execute(args, config, reporter) {
        Ok(message) => {
            println!("{}", message);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail(&e),
    }
}

fn parse_number(what: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| Error::InvalidArgs(format!("{} should be a number, got '{}'", what, value)))
}

fn execute(args: &WrapArgs, config: &WrapConfig, reporter: &dyn Reporter) -> Result<String> {
    let (inputs, params) = split_positionals(&args.inputs, &args.params, 3, USAGE)?;
    let output = PathBuf::from(&params[0]);
    let width = parse_number("width", &params[1])?;
    let step = parse_number("step", &params[2])?;
    SheetLayout::new(WRAP_TILE, width)?;

    let options = WrapOptions::new(step, args.direction.unwrap_or(config.direction))?
        .with_blend(args.blend || config.blend)
        .with_order(args.order.unwrap_or(config.order));

    check_inputs(&inputs)?;
    let sources = load_sources(&inputs, reporter)?;

    let result = wrap_sheet(&sources, width, &options)?;
    save_png(&result.sheet, &output)?;
    reporter.report(Event::ArtifactWritten { path: output.clone() });

    Ok(format!(
        "New image \"{}\" created from {} original tiles, resulting in a total of {} tiles in a {}x{} configuration.",
        output.display(),
        result.originals,
        result.total,
        result.sheet.width(),
        result.sheet.height()
    ))
}
