//! tilepack - Command-line tool for building tilesets and Tiled maps from images

use std::process::ExitCode;

use tilepack::cli;

fn main() -> ExitCode {
    cli::run()
}
