//! Crate error type

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::geometry::{DimensionError, Size};

/// Exit code for a successful run
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for failures while processing
pub const EXIT_ERROR: u8 = 1;
/// Exit code for malformed or out-of-range arguments
pub const EXIT_INVALID_ARGS: u8 = 2;

/// Errors raised while generating tilesets, maps and wraparound sheets
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed command line
    #[error("{0}")]
    InvalidArgs(String),
    #[error(transparent)]
    Dimension(#[from] DimensionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("File {} not found", .0.display())]
    MissingInput(PathBuf),
    #[error("Output directory {} already exists", .0.display())]
    OutputExists(PathBuf),
    #[error("{} is {size}, which is not a multiple of the {tile} tile size", path.display())]
    NotTileAligned { path: PathBuf, size: Size, tile: Size },
    #[error("{} has no rows left to cut into tiles", .0.display())]
    EmptyImage(PathBuf),
    #[error("Sheet width {width} should be a multiple of the tile width {tile_width}")]
    SheetWidth { width: u32, tile_width: u32 },
    #[error("A {width}x{height} sheet is larger than the {max} pixel limit")]
    SheetTooLarge { width: u32, height: u64, max: u64 },
    /// Only raised in strict mode; otherwise reported as a warning
    #[error("{unique} tiles need a sheet {required} pixels high, but {requested} was requested")]
    SheetOverflow { unique: usize, required: u32, requested: u32 },
    #[error("Image error for {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InvalidArgs(_)
            | Error::Dimension(_)
            | Error::Config(_)
            | Error::SheetWidth { .. } => EXIT_INVALID_ARGS,
            _ => EXIT_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::parse_size;

    #[test]
    fn test_argument_errors_use_invalid_args_code() {
        let err: Error = parse_size("tile", "8").unwrap_err().into();
        assert_eq!(err.exit_code(), EXIT_INVALID_ARGS);
        assert_eq!(Error::InvalidArgs("x".into()).exit_code(), EXIT_INVALID_ARGS);
        assert_eq!(Error::SheetWidth { width: 10, tile_width: 8 }.exit_code(), EXIT_INVALID_ARGS);
    }

    #[test]
    fn test_processing_errors_use_error_code() {
        assert_eq!(Error::MissingInput("a.png".into()).exit_code(), EXIT_ERROR);
        assert_eq!(Error::OutputExists("out".into()).exit_code(), EXIT_ERROR);
        let overflow = Error::SheetOverflow { unique: 9, required: 24, requested: 16 };
        assert_eq!(overflow.exit_code(), EXIT_ERROR);
    }

    #[test]
    fn test_messages() {
        let err = Error::NotTileAligned {
            path: "level.png".into(),
            size: Size::new(20, 16),
            tile: Size::new(8, 8),
        };
        assert_eq!(err.to_string(), "level.png is 20x16, which is not a multiple of the 8x8 tile size");
        assert_eq!(Error::MissingInput("a.png".into()).to_string(), "File a.png not found");
        let overflow = Error::SheetOverflow { unique: 9, required: 24, requested: 16 };
        assert_eq!(
            overflow.to_string(),
            "9 tiles need a sheet 24 pixels high, but 16 was requested"
        );
    }
}
