//! Source images and palette strips

use image::{imageops, RgbaImage};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::report::{Event, Reporter};

/// A decoded source image, normalized to 8-bit RGBA.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
    /// First pixel row, when it was split off as a palette strip
    pub palette: Option<RgbaImage>,
    /// Rows split off the top of the file; `pixels` starts this far down
    pub palette_rows: u32,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        Self { path: path.into(), pixels, palette: None, palette_rows: 0 }
    }

    /// Decode an image file. The file handle is closed before this returns.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingInput(path.to_path_buf()));
        }
        let decoded = image::open(path)
            .map_err(|source| Error::Image { path: path.to_path_buf(), source })?;
        Ok(Self::new(path, decoded.to_rgba8()))
    }

    /// Size of the tileable area (excludes a split-off palette row).
    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    /// Row in the source file of a row in `pixels`.
    pub fn file_row(&self, y: u32) -> u32 {
        y + self.palette_rows
    }

    /// Whether the image has exactly one extra row on top of whole tile rows.
    pub fn has_palette_row(&self, tile: Size) -> bool {
        let height = self.pixels.height();
        self.palette.is_none()
            && height > tile.height
            && height % tile.height != 0
            && (height - 1) % tile.height == 0
    }

    /// Move the first pixel row into `palette` if the image has a palette row.
    ///
    /// Returns true when a strip was split off.
    pub fn split_palette(&mut self, tile: Size) -> bool {
        if !self.has_palette_row(tile) {
            return false;
        }
        let (width, height) = self.pixels.dimensions();
        let strip = imageops::crop_imm(&self.pixels, 0, 0, width, 1).to_image();
        let rest = imageops::crop_imm(&self.pixels, 0, 1, width, height - 1).to_image();
        self.palette = Some(strip);
        self.palette_rows = 1;
        self.pixels = rest;
        true
    }

    /// Check that the image can be cut into whole tiles.
    pub fn check_alignment(&self, tile: Size) -> Result<()> {
        let size = self.size();
        if size.width == 0 || size.height == 0 {
            return Err(Error::EmptyImage(self.path.clone()));
        }
        if !size.is_multiple_of(tile) {
            let size = Size::new(size.width, self.file_row(size.height));
            return Err(Error::NotTileAligned { path: self.path.clone(), size, tile });
        }
        Ok(())
    }
}

/// Load every input in order, failing on the first missing or unreadable file.
pub fn load_sources(paths: &[PathBuf], reporter: &dyn Reporter) -> Result<Vec<SourceImage>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let source = SourceImage::load(path)?;
        reporter.report(Event::ImageLoaded {
            path: source.path.clone(),
            width: source.pixels.width(),
            height: source.pixels.height(),
        });
        sources.push(source);
    }
    Ok(sources)
}
