//! Tile map generation.
//!
//! Runs the whole map pipeline in memory: palette split, tile extraction,
//! deduplication, sheet packing and map assembly. Nothing touches the
//! filesystem here; see [`crate::output`] for writing the results.

use clap::ValueEnum;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{SheetSize, Size};
use crate::registry::TileRegistry;
use crate::report::{Event, Reporter};
use crate::sheet::{check_requested_height, pack_sheet, SheetLayout};
use crate::source::SourceImage;
use crate::tile::{tiles, TilePosition};
use crate::tiled::{LayerSpec, TiledMap, Tileset, DEFAULT_LAYER_NAME};

/// Which source images get a tile layer in the map.
///
/// All images always share one registry and one sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IndexPolicy {
    /// Only the last image is indexed
    #[default]
    Last,
    /// One layer per image, in input order
    All,
}

/// Options for [`generate`]
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub tile: Size,
    pub sheet: SheetSize,
    /// Split palette rows off the top of source images
    pub palette: bool,
    pub index: IndexPolicy,
    /// Fail if the sheet outgrows the requested height
    pub strict: bool,
    /// Tileset name in the map document
    pub name: String,
    /// File name of the sheet as referenced by the map document
    pub sheet_image: String,
}

impl MapOptions {
    pub fn new(tile: Size, sheet: SheetSize) -> Self {
        Self {
            tile,
            sheet,
            palette: false,
            index: IndexPolicy::default(),
            strict: false,
            name: String::new(),
            sheet_image: sheet_image_name(&sheet),
        }
    }
}

/// File name of the sheet image for a sheet argument, e.g. `tileset256x64.png`.
pub fn sheet_image_name(sheet: &SheetSize) -> String {
    format!("tileset{}.png", sheet)
}

/// A tile that was skipped because an identical tile came first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElidedTile {
    pub position: TilePosition,
    /// Id of the canonical tile it maps to
    pub id: u32,
}

/// Everything produced by one map run
#[derive(Debug)]
pub struct Tilemap {
    pub sources: Vec<SourceImage>,
    pub registry: TileRegistry,
    /// Registry ids of every tile, one row-major sequence per source image
    pub indices: Vec<Vec<u32>>,
    pub elided: Vec<ElidedTile>,
    pub palette: Option<RgbaImage>,
    pub layout: SheetLayout,
    pub sheet: RgbaImage,
    pub map: TiledMap,
}

impl Tilemap {
    /// Total number of tiles scanned across all sources.
    pub fn tile_count(&self) -> usize {
        self.indices.iter().map(Vec::len).sum()
    }
}

/// Pick the palette strip and split palette rows off every source that has one.
fn capture_palette(
    sources: &mut [SourceImage],
    tile: Size,
    reporter: &dyn Reporter,
) -> Option<RgbaImage> {
    let mut palette = None;
    for source in sources.iter_mut() {
        if !source.split_palette(tile) {
            continue;
        }
        if let Some(strip) = source.palette.as_ref() {
            reporter.report(Event::PaletteCaptured {
                path: source.path.clone(),
                width: strip.width(),
            });
            if palette.is_none() {
                palette = Some(strip.clone());
            }
        }
    }
    if palette.is_none() {
        reporter.report(Event::Warning {
            message: "palette extraction requested, but no image has a palette row".to_string(),
        });
    }
    palette
}

/// Run the map pipeline over already-decoded sources.
pub fn generate(
    mut sources: Vec<SourceImage>,
    options: &MapOptions,
    reporter: &dyn Reporter,
) -> Result<Tilemap> {
    let tile = options.tile;
    // Validate the sheet width before doing any work
    let layout = SheetLayout::new(tile, options.sheet.width)?;

    let palette = if options.palette { capture_palette(&mut sources, tile, reporter) } else { None };
    let layout = layout.with_palette_row(palette.is_some());

    let mut registry = TileRegistry::new();
    let mut indices: Vec<Vec<u32>> = sources
        .iter()
        .map(|s| Vec::with_capacity(s.size().tiles_in(tile).area() as usize))
        .collect();
    let mut elided = Vec::new();

    for scanned in tiles(&sources, tile)? {
        let position = scanned.position;
        let registration = registry.register_tile(scanned);
        indices[position.source].push(registration.id);
        if registration.duplicate {
            reporter.report(Event::DuplicateTile {
                path: sources[position.source].path.clone(),
                x: position.x,
                y: sources[position.source].file_row(position.y),
                id: registration.id,
            });
            elided.push(ElidedTile { position, id: registration.id });
        }
    }

    check_requested_height(&layout, registry.len(), options.sheet.height, options.strict, reporter)?;

    let unique: Vec<&RgbaImage> = registry.tiles().iter().map(|t| &t.pixels).collect();
    let sheet = pack_sheet(&unique, &layout, palette.as_ref())?;

    let layers = build_layers(&sources, &indices, tile, options.index);
    let tileset = Tileset::new(
        options.name.clone(),
        options.sheet_image.clone(),
        Size::new(sheet.width(), sheet.height()),
        tile,
        layout.columns,
        registry.len() as u32,
    )
    .with_palette_rows(u32::from(layout.palette_row));
    let map = TiledMap::new(tile, tileset, layers);

    reporter.report(Event::Summary {
        tiles: indices.iter().map(Vec::len).sum(),
        unique: registry.len(),
        duplicates: registry.duplicates(),
    });

    Ok(Tilemap { sources, registry, indices, elided, palette, layout, sheet, map })
}

fn build_layers(
    sources: &[SourceImage],
    indices: &[Vec<u32>],
    tile: Size,
    policy: IndexPolicy,
) -> Vec<LayerSpec> {
    let layer = |i: usize, name: String| LayerSpec {
        name,
        grid: sources[i].size().tiles_in(tile),
        data: indices[i].clone(),
    };

    match policy {
        IndexPolicy::Last => match sources.len().checked_sub(1) {
            Some(last) => vec![layer(last, DEFAULT_LAYER_NAME.to_string())],
            None => Vec::new(),
        },
        IndexPolicy::All => (0..sources.len())
            .map(|i| {
                let name = sources[i]
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("Layer {}", i + 1));
                layer(i, name)
            })
            .collect(),
    }
}
