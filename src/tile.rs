//! Tile extraction
//!
//! Source images are cut into fixed-size tiles in row-major order: image by
//! image, top to bottom, left to right. Extraction is lazy and restartable;
//! calling [`tiles`] again starts a fresh scan.

use image::{imageops, RgbaImage};

use crate::error::Result;
use crate::geometry::Size;
use crate::source::SourceImage;

/// Where a tile came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilePosition {
    /// Index of the source image in input order
    pub source: usize,
    /// Pixel offset of the tile's left edge
    pub x: u32,
    /// Pixel offset of the tile's top edge
    pub y: u32,
}

/// A fixed-size block of pixels cut from a source image
#[derive(Debug, Clone)]
pub struct Tile {
    pub position: TilePosition,
    pub pixels: RgbaImage,
}

/// Iterator over the tiles of a list of source images
#[derive(Debug, Clone)]
pub struct Tiles<'a> {
    sources: &'a [SourceImage],
    tile: Size,
    source: usize,
    x: u32,
    y: u32,
}

impl<'a> Iterator for Tiles<'a> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        loop {
            let image = &self.sources.get(self.source)?.pixels;
            if self.y >= image.height() {
                self.source += 1;
                self.x = 0;
                self.y = 0;
                continue;
            }

            let position = TilePosition { source: self.source, x: self.x, y: self.y };
            let pixels =
                imageops::crop_imm(image, self.x, self.y, self.tile.width, self.tile.height)
                    .to_image();

            self.x += self.tile.width;
            if self.x >= image.width() {
                self.x = 0;
                self.y += self.tile.height;
            }
            return Some(Tile { position, pixels });
        }
    }
}

/// Start a scan over `sources`.
///
/// Every source must be an exact multiple of the tile size; the first one
/// that is not is reported as an error before any tile is produced.
pub fn tiles(sources: &[SourceImage], tile: Size) -> Result<Tiles<'_>> {
    for source in sources {
        source.check_alignment(tile)?;
    }
    Ok(Tiles { sources, tile, source: 0, x: 0, y: 0 })
}

/// Cut a single image into tiles, row-major.
pub fn split_image(image: &RgbaImage, tile: Size) -> Vec<RgbaImage> {
    let grid = Size::new(image.width() / tile.width, image.height() / tile.height);
    let mut out = Vec::with_capacity(grid.area() as usize);
    for row in 0..grid.height {
        for col in 0..grid.width {
            out.push(
                imageops::crop_imm(image, col * tile.width, row * tile.height, tile.width, tile.height)
                    .to_image(),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image::Rgba;

    const TILE: Size = Size::new(8, 8);

    /// Image whose tiles are each filled with their own tile number
    fn numbered(width_tiles: u32, height_tiles: u32, base: u8) -> RgbaImage {
        RgbaImage::from_fn(width_tiles * 8, height_tiles * 8, |x, y| {
            let n = base + (y / 8 * width_tiles + x / 8) as u8;
            Rgba([n, 0, 0, 255])
        })
    }

    #[test]
    fn test_row_major_order() {
        let sources = vec![SourceImage::new("a.png", numbered(3, 2, 0))];
        let scanned: Vec<Tile> = tiles(&sources, TILE).unwrap().collect();

        assert_eq!(scanned.len(), 6);
        let positions: Vec<(u32, u32)> =
            scanned.iter().map(|t| (t.position.x, t.position.y)).collect();
        assert_eq!(positions, vec![(0, 0), (8, 0), (16, 0), (0, 8), (8, 8), (16, 8)]);
        for (i, tile) in scanned.iter().enumerate() {
            assert_eq!(tile.pixels.dimensions(), (8, 8));
            assert_eq!(tile.pixels.get_pixel(0, 0)[0], i as u8);
            assert_eq!(tile.pixels.get_pixel(7, 7)[0], i as u8);
        }
    }

    #[test]
    fn test_multiple_sources_in_order() {
        let sources = vec![
            SourceImage::new("a.png", numbered(1, 1, 10)),
            SourceImage::new("b.png", numbered(2, 1, 20)),
        ];
        let scanned: Vec<Tile> = tiles(&sources, TILE).unwrap().collect();

        assert_eq!(scanned.len(), 3);
        assert_eq!(scanned[0].position, TilePosition { source: 0, x: 0, y: 0 });
        assert_eq!(scanned[1].position, TilePosition { source: 1, x: 0, y: 0 });
        assert_eq!(scanned[2].position, TilePosition { source: 1, x: 8, y: 0 });
        assert_eq!(scanned[2].pixels.get_pixel(0, 0)[0], 21);
    }

    #[test]
    fn test_restartable() {
        let sources = vec![SourceImage::new("a.png", numbered(2, 2, 0))];
        let first: Vec<TilePosition> = tiles(&sources, TILE).unwrap().map(|t| t.position).collect();
        let second: Vec<TilePosition> =
            tiles(&sources, TILE).unwrap().map(|t| t.position).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_rectangular_tiles() {
        let sources = vec![SourceImage::new("a.png", RgbaImage::new(8, 12))];
        let scanned: Vec<Tile> = tiles(&sources, Size::new(4, 6)).unwrap().collect();
        assert_eq!(scanned.len(), 4);
        assert_eq!(scanned[3].position, TilePosition { source: 0, x: 4, y: 6 });
        assert_eq!(scanned[3].pixels.dimensions(), (4, 6));
    }

    #[test]
    fn test_unaligned_source_rejected() {
        let sources = vec![
            SourceImage::new("ok.png", RgbaImage::new(8, 8)),
            SourceImage::new("bad.png", RgbaImage::new(12, 8)),
        ];
        let err = tiles(&sources, TILE).unwrap_err();
        match err {
            Error::NotTileAligned { path, .. } => assert_eq!(path.to_str(), Some("bad.png")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_split_image() {
        let image = numbered(2, 2, 0);
        let parts = split_image(&image, TILE);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[3].get_pixel(4, 4)[0], 3);
    }
}
