//! Wraparound sheets - pre-shifted animation frames for vertical scrolling.
//!
//! Every 8x8 tile gets `8 / step - 1` extra frames, each shifted vertically
//! by a further `step` rows. Rows pushed out of the tile come back in on
//! the other side, either from the same tile or, in blend mode, from the
//! neighbouring tile in the same image column. Frames are packed without
//! deduplication, using the same row-major layout as tilesets.

use clap::ValueEnum;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::sheet::{pack_sheet, SheetLayout};
use crate::source::SourceImage;
use crate::tile::{tiles, Tile};

/// Wraparound tiles are always 8x8
pub const WRAP_TILE: Size = Size::new(8, 8);
/// Allowed row offsets between consecutive frames
pub const VALID_STEPS: [u32; 3] = [1, 2, 4];

/// Direction the tile content scrolls in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
}

/// Order of frames in the output sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FrameOrder {
    /// Each tile followed by its shifted frames
    #[default]
    Tile,
    /// All originals, then every first shift, then every second shift, ...
    Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    step: u32,
    pub direction: Direction,
    /// Wrap rows in from the neighbouring tile of the same image column
    pub blend: bool,
    pub order: FrameOrder,
}

impl WrapOptions {
    /// Options for a given step; the step must be 1, 2 or 4.
    pub fn new(step: u32, direction: Direction) -> Result<Self> {
        if !VALID_STEPS.contains(&step) {
            return Err(Error::InvalidArgs(format!("step should be 1, 2 or 4, got {}", step)));
        }
        Ok(Self { step, direction, blend: false, order: FrameOrder::default() })
    }

    pub fn with_blend(mut self, blend: bool) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_order(mut self, order: FrameOrder) -> Self {
        self.order = order;
        self
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Frames per source tile, including the unshifted original.
    pub fn frames_per_tile(&self) -> usize {
        (WRAP_TILE.height / self.step) as usize
    }

    /// Row of the source image that lands on row `row` of frame `frame`.
    fn source_row(&self, tile_y: u32, row: u32, frame: u32, image_height: u32) -> u32 {
        let shift = (frame * self.step) as i64;
        let delta = match self.direction {
            Direction::Down => -shift,
            Direction::Up => shift,
        };
        if self.blend {
            (tile_y as i64 + row as i64 + delta).rem_euclid(image_height as i64) as u32
        } else {
            tile_y + (row as i64 + delta).rem_euclid(WRAP_TILE.height as i64) as u32
        }
    }
}

/// Build frame `frame` (0 = unshifted) of a tile.
fn shifted_frame(source: &RgbaImage, tile: &Tile, frame: u32, options: &WrapOptions) -> RgbaImage {
    let x0 = tile.position.x;
    let y0 = tile.position.y;
    RgbaImage::from_fn(WRAP_TILE.width, WRAP_TILE.height, |x, y| {
        *source.get_pixel(x0 + x, options.source_row(y0, y, frame, source.height()))
    })
}

/// All frames of all tiles, in the configured order.
pub fn generate_frames(sources: &[SourceImage], options: &WrapOptions) -> Result<Vec<RgbaImage>> {
    let frames = options.frames_per_tile();
    let mut groups: Vec<Vec<RgbaImage>> = vec![Vec::new(); frames];
    let mut ordered = Vec::new();

    for tile in tiles(sources, WRAP_TILE)? {
        let source = &sources[tile.position.source].pixels;
        for frame in 0..frames {
            let image = if frame == 0 {
                tile.pixels.clone()
            } else {
                shifted_frame(source, &tile, frame as u32, options)
            };
            match options.order {
                FrameOrder::Tile => ordered.push(image),
                FrameOrder::Frame => groups[frame].push(image),
            }
        }
    }

    if options.order == FrameOrder::Frame {
        ordered = groups.into_iter().flatten().collect();
    }
    Ok(ordered)
}

/// A packed wraparound sheet
#[derive(Debug)]
pub struct WrapSheet {
    pub sheet: RgbaImage,
    /// Number of source tiles
    pub originals: usize,
    /// Number of tiles in the sheet, originals included
    pub total: usize,
}

/// Generate all frames and pack them into a sheet `width` pixels wide.
pub fn wrap_sheet(sources: &[SourceImage], width: u32, options: &WrapOptions) -> Result<WrapSheet> {
    let layout = SheetLayout::new(WRAP_TILE, width)?;
    let frames = generate_frames(sources, options)?;
    let refs: Vec<&RgbaImage> = frames.iter().collect();
    let sheet = pack_sheet(&refs, &layout, None)?;
    Ok(WrapSheet {
        sheet,
        originals: frames.len() / options.frames_per_tile(),
        total: frames.len(),
    })
}
