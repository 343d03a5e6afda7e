//! tilepack - Library for cutting images into deduplicated tilesets
//!
//! This library provides functionality to:
//! - Cut source images into a row-major stream of fixed-size tiles
//! - Deduplicate tiles by content fingerprint, first occurrence wins
//! - Pack the unique tiles into a sheet image
//! - Describe the original images as a Tiled JSON map of tile ids
//! - Generate wraparound sheets of vertically shifted 8x8 frames

pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod geometry;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod sheet;
pub mod source;
pub mod tile;
pub mod tiled;
pub mod wrap;

pub use error::{Error, Result};
