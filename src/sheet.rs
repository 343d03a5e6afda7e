//! Sheet packing - lays tiles out row-major in a fixed number of columns
//!
//! The sheet is exactly as tall as the tiles require. An optional reserved
//! row at the top holds a palette strip.

use image::{imageops, Rgba, RgbaImage};

use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::report::{Event, Reporter};

/// Background for sheet cells without a tile
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Largest sheet allocated, in pixels (16384x16384)
pub const MAX_SHEET_PIXELS: u64 = 1 << 28;

/// Grid geometry of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub tile: Size,
    pub columns: u32,
    /// Reserve one tile row at the top for a palette strip
    pub palette_row: bool,
}

impl SheetLayout {
    /// Layout for a sheet `width` pixels wide.
    ///
    /// The width must be a positive multiple of the tile width, and a single
    /// row of tiles must fit in [`MAX_SHEET_PIXELS`].
    pub fn new(tile: Size, width: u32) -> Result<Self> {
        if width < tile.width || width % tile.width != 0 {
            return Err(Error::SheetWidth { width, tile_width: tile.width });
        }
        let layout = Self { tile, columns: width / tile.width, palette_row: false };
        layout.checked_height(u64::from(tile.height))?;
        Ok(layout)
    }

    pub fn with_palette_row(mut self, palette_row: bool) -> Self {
        self.palette_row = palette_row;
        self
    }

    pub fn width(&self) -> u32 {
        self.columns * self.tile.width
    }

    /// Tile rows needed for `count` tiles.
    pub fn rows_for(&self, count: usize) -> u64 {
        (count as u64).div_ceil(u64::from(self.columns))
    }

    /// Pixel offset of the first tile row.
    pub fn top(&self) -> u32 {
        if self.palette_row {
            self.tile.height
        } else {
            0
        }
    }

    /// Minimum sheet height for `count` tiles.
    ///
    /// Fails when the sheet would exceed [`MAX_SHEET_PIXELS`].
    pub fn height_for(&self, count: usize) -> Result<u32> {
        let height = self
            .rows_for(count)
            .checked_mul(u64::from(self.tile.height))
            .and_then(|h| h.checked_add(u64::from(self.top())))
            .unwrap_or(u64::MAX);
        self.checked_height(height)
    }

    pub fn size_for(&self, count: usize) -> Result<Size> {
        Ok(Size::new(self.width(), self.height_for(count)?))
    }

    fn checked_height(&self, height: u64) -> Result<u32> {
        let width = self.width();
        match height.checked_mul(u64::from(width)) {
            Some(pixels) if pixels <= MAX_SHEET_PIXELS => Ok(height as u32),
            _ => Err(Error::SheetTooLarge { width, height, max: MAX_SHEET_PIXELS }),
        }
    }

    /// Top-left pixel of the cell holding the `index`-th tile (0-based).
    pub fn cell(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        let x = (index % self.columns) * self.tile.width;
        let y = (index / self.columns) * self.tile.height + self.top();
        (x, y)
    }

    /// Number of tiles that fit in a sheet `height` pixels high.
    pub fn capacity(&self, height: u32) -> usize {
        let rows = height.saturating_sub(self.top()) / self.tile.height;
        rows as usize * self.columns as usize
    }
}

/// Compare the computed sheet height with the height the caller asked for.
///
/// A sheet that outgrows the request is a warning, or an error in strict mode.
/// The sheet is always produced at the computed height.
pub fn check_requested_height(
    layout: &SheetLayout,
    count: usize,
    requested: Option<u32>,
    strict: bool,
    reporter: &dyn Reporter,
) -> Result<()> {
    let Some(requested) = requested else {
        return Ok(());
    };
    if count <= layout.capacity(requested) {
        return Ok(());
    }
    let required = layout.height_for(count)?;
    if strict {
        return Err(Error::SheetOverflow { unique: count, required, requested });
    }
    reporter.report(Event::Warning {
        message: format!(
            "{} tiles do not fit in {} pixels of sheet height, using {} instead",
            count, requested, required
        ),
    });
    Ok(())
}

/// Paste `tiles` into a new sheet in order, row-major.
///
/// With a palette row reserved, `palette` is pasted at the top-left corner,
/// clipped to the sheet width.
pub fn pack_sheet(
    tiles: &[&RgbaImage],
    layout: &SheetLayout,
    palette: Option<&RgbaImage>,
) -> Result<RgbaImage> {
    let size = layout.size_for(tiles.len())?;
    let mut sheet = RgbaImage::from_pixel(size.width, size.height, TRANSPARENT);

    if layout.palette_row {
        if let Some(strip) = palette {
            imageops::replace(&mut sheet, strip, 0, 0);
        }
    }

    for (i, tile) in tiles.iter().enumerate() {
        let (x, y) = layout.cell(i);
        imageops::replace(&mut sheet, *tile, x as i64, y as i64);
    }

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ConsoleReporter, NullReporter};
    use crate::tile::split_image;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    const TILE: Size = Size::new(8, 8);

    fn solid(shade: u8) -> RgbaImage {
        RgbaImage::from_pixel(8, 8, Rgba([shade, 0, 0, 255]))
    }

    #[test]
    fn test_layout_rejects_bad_width() {
        assert!(matches!(SheetLayout::new(TILE, 0), Err(Error::SheetWidth { .. })));
        assert!(matches!(SheetLayout::new(TILE, 4), Err(Error::SheetWidth { .. })));
        assert!(matches!(SheetLayout::new(TILE, 20), Err(Error::SheetWidth { .. })));
        assert_eq!(SheetLayout::new(TILE, 24).unwrap().columns, 3);
    }

    #[test]
    fn test_layout_rejects_huge_width() {
        let err = SheetLayout::new(TILE, 4_294_967_288).unwrap_err();
        assert!(matches!(err, Error::SheetTooLarge { width: 4_294_967_288, height: 8, .. }));
        assert!(SheetLayout::new(TILE, 16384).is_ok());
    }

    #[test]
    fn test_height_over_limit() {
        // 2048 columns of 8x8 tiles; 2048 rows fill the limit exactly
        let layout = SheetLayout::new(TILE, 16384).unwrap();
        assert_eq!(layout.height_for(2048 * 2048).unwrap(), 16384);
        assert!(matches!(layout.height_for(2048 * 2048 + 1), Err(Error::SheetTooLarge { .. })));
        assert!(matches!(layout.size_for(usize::MAX), Err(Error::SheetTooLarge { .. })));
    }

    #[test]
    fn test_height_rounds_up() {
        let layout = SheetLayout::new(TILE, 32).unwrap();
        assert_eq!(layout.height_for(1).unwrap(), 8);
        assert_eq!(layout.height_for(4).unwrap(), 8);
        assert_eq!(layout.height_for(5).unwrap(), 16);
        assert_eq!(layout.with_palette_row(true).height_for(5).unwrap(), 24);
    }

    #[test]
    fn test_capacity_covers_count() {
        for columns in 1..5u32 {
            let layout = SheetLayout::new(TILE, columns * 8).unwrap();
            for count in 1..20usize {
                let height = layout.height_for(count).unwrap();
                assert!(layout.capacity(height) >= count);
                let palette = layout.with_palette_row(true);
                assert!(palette.capacity(palette.height_for(count).unwrap()) >= count);
            }
        }
    }

    #[test]
    fn test_cells_row_major() {
        let layout = SheetLayout::new(TILE, 16).unwrap();
        assert_eq!(layout.cell(0), (0, 0));
        assert_eq!(layout.cell(1), (8, 0));
        assert_eq!(layout.cell(2), (0, 8));
        assert_eq!(layout.with_palette_row(true).cell(2), (0, 16));
    }

    #[test]
    fn test_pack_round_trip() {
        let tiles: Vec<RgbaImage> = (1..=5).map(|i| solid(i * 40)).collect();
        let refs: Vec<&RgbaImage> = tiles.iter().collect();
        let layout = SheetLayout::new(TILE, 16).unwrap();

        let sheet = pack_sheet(&refs, &layout, None).unwrap();
        assert_eq!(sheet.dimensions(), (16, 24));

        let cut = split_image(&sheet, TILE);
        assert_eq!(&cut[..5], &tiles[..]);
        // Unused cell stays transparent
        assert_eq!(*cut[5].get_pixel(0, 0), TRANSPARENT);
    }

    #[test]
    fn test_pack_with_palette() {
        let tiles = [solid(200)];
        let refs: Vec<&RgbaImage> = tiles.iter().collect();
        let strip = RgbaImage::from_fn(32, 1, |x, _| Rgba([x as u8, 1, 2, 255]));
        let layout = SheetLayout::new(TILE, 16).unwrap().with_palette_row(true);

        let sheet = pack_sheet(&refs, &layout, Some(&strip)).unwrap();
        assert_eq!(sheet.dimensions(), (16, 16));
        // Strip is clipped to sheet width
        assert_eq!(*sheet.get_pixel(15, 0), Rgba([15, 1, 2, 255]));
        assert_eq!(*sheet.get_pixel(0, 1), TRANSPARENT);
        assert_eq!(*sheet.get_pixel(0, 8), Rgba([200, 0, 0, 255]));
    }

    #[test]
    fn test_requested_height_ok() {
        let layout = SheetLayout::new(TILE, 16).unwrap();
        assert!(check_requested_height(&layout, 4, Some(16), true, &NullReporter).is_ok());
        assert!(check_requested_height(&layout, 40, None, true, &NullReporter).is_ok());
    }

    #[test]
    fn test_requested_height_strict() {
        let layout = SheetLayout::new(TILE, 16).unwrap();
        let err = check_requested_height(&layout, 5, Some(16), true, &NullReporter).unwrap_err();
        assert!(matches!(err, Error::SheetOverflow { unique: 5, required: 24, requested: 16 }));
    }

    #[test]
    fn test_requested_height_warns() {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = ConsoleReporter::with_output(TestWriter(Arc::clone(&output)));
        let layout = SheetLayout::new(TILE, 16).unwrap();

        assert!(check_requested_height(&layout, 5, Some(16), false, &reporter).is_ok());
        let text = String::from_utf8_lossy(&output.lock().unwrap()).to_string();
        assert!(text.contains("Warning: 5 tiles do not fit in 16 pixels"));
    }

    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
