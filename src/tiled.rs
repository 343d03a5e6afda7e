//! Tiled map descriptor.
//!
//! Builds the JSON map document read by the Tiled map editor: one
//! orthogonal map, one tileset pointing at the packed sheet, and one or
//! more tile layers holding registry ids.
//!
//! # Example Output
//!
//! ```json
//! {"compression_level": -1, "editorsettings": {"export": {"target": "."}},
//!  "nextlayerid": 2, "nextobjectid": 0, "width": 2, "height": 2,
//!  "infinite": false, "tilewidth": 8, "tileheight": 8,
//!  "orientation": "orthogonal", "renderorder": "right-down",
//!  "tiledversion": "1.3.1", "type": "map", "version": 1.2,
//!  "tilesets": [{"columns": 4, "firstgid": 1, "image": "tileset32.png", ...}],
//!  "layers": [{"id": 1, "name": "Map", ..., "data": [1, 1, 1, 1]}]}
//! ```
//!
//! Compact output keeps the key order and separators of maps written by
//! earlier tile-cutting scripts, so regenerated maps diff cleanly.

use serde::Serialize;
use std::io;

use crate::geometry::Size;

/// Tiled release the document claims to come from
pub const TILED_VERSION: &str = "1.3.1";
/// JSON map format version
pub const FORMAT_VERSION: f64 = 1.2;
pub const ORIENTATION: &str = "orthogonal";
pub const RENDER_ORDER: &str = "right-down";
pub const MAP_TYPE: &str = "map";
pub const LAYER_TYPE: &str = "tilelayer";
/// Name of the layer when only one source image is indexed
pub const DEFAULT_LAYER_NAME: &str = "Map";
/// Gid of the first tile in the tileset; registry ids start at 1 too
pub const FIRST_GID: u32 = 1;
/// Use the default zlib level for compressed layers
pub const COMPRESSION_LEVEL: i32 = -1;
pub const EXPORT_TARGET: &str = ".";
/// Custom tileset property counting reserved palette rows
pub const PALETTE_ROWS_PROPERTY: &str = "palette_rows";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSettings {
    pub target: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorSettings {
    pub export: ExportSettings,
}

/// A custom property attached to a tileset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tileset {
    pub columns: u32,
    pub firstgid: u32,
    pub image: String,
    pub imagewidth: u32,
    pub imageheight: u32,
    pub margin: u32,
    pub name: String,
    pub spacing: u32,
    pub tilecount: u32,
    pub tilewidth: u32,
    pub tileheight: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

impl Tileset {
    /// Tileset covering a packed sheet.
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        sheet: Size,
        tile: Size,
        columns: u32,
        tilecount: u32,
    ) -> Self {
        Self {
            columns,
            firstgid: FIRST_GID,
            image: image.into(),
            imagewidth: sheet.width,
            imageheight: sheet.height,
            margin: 0,
            name: name.into(),
            spacing: 0,
            tilecount,
            tilewidth: tile.width,
            tileheight: tile.height,
            properties: Vec::new(),
        }
    }

    /// Record that the sheet starts with `rows` reserved palette rows.
    pub fn with_palette_rows(mut self, rows: u32) -> Self {
        self.properties.retain(|p| p.name != PALETTE_ROWS_PROPERTY);
        if rows > 0 {
            self.properties.push(Property {
                name: PALETTE_ROWS_PROPERTY.to_string(),
                kind: "int",
                value: rows,
            });
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub id: u32,
    pub name: String,
    pub opacity: u32,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub visible: bool,
    pub x: i32,
    pub y: i32,
    pub data: Vec<u32>,
}

/// Input for one tile layer: a grid of registry ids, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    pub name: String,
    pub grid: Size,
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiledMap {
    pub compression_level: i32,
    pub editorsettings: EditorSettings,
    pub nextlayerid: u32,
    pub nextobjectid: u32,
    pub width: u32,
    pub height: u32,
    pub infinite: bool,
    pub tilewidth: u32,
    pub tileheight: u32,
    pub orientation: &'static str,
    pub renderorder: &'static str,
    pub tiledversion: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub version: f64,
    pub tilesets: Vec<Tileset>,
    pub layers: Vec<TileLayer>,
}

impl TiledMap {
    /// Assemble a map from a tileset and its layers.
    ///
    /// Layer ids are assigned 1.. in order. The map's own grid size is that
    /// of the last layer.
    pub fn new(tile: Size, tileset: Tileset, layers: Vec<LayerSpec>) -> Self {
        let grid = layers.last().map(|l| l.grid).unwrap_or(Size::new(0, 0));
        let layers: Vec<TileLayer> = layers
            .into_iter()
            .enumerate()
            .map(|(i, spec)| TileLayer {
                id: i as u32 + 1,
                name: spec.name,
                opacity: 1,
                width: spec.grid.width,
                height: spec.grid.height,
                kind: LAYER_TYPE,
                visible: true,
                x: 0,
                y: 0,
                data: spec.data,
            })
            .collect();

        Self {
            compression_level: COMPRESSION_LEVEL,
            editorsettings: EditorSettings { export: ExportSettings { target: EXPORT_TARGET } },
            nextlayerid: layers.len() as u32 + 1,
            nextobjectid: 0,
            width: grid.width,
            height: grid.height,
            infinite: false,
            tilewidth: tile.width,
            tileheight: tile.height,
            orientation: ORIENTATION,
            renderorder: RENDER_ORDER,
            tiledversion: TILED_VERSION,
            kind: MAP_TYPE,
            version: FORMAT_VERSION,
            tilesets: vec![tileset],
            layers,
        }
    }

    /// Serialize to JSON.
    ///
    /// Compact output separates items with `", "` and keys with `": "`.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            return serde_json::to_string_pretty(self);
        }
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out)
            .map_err(|e| serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

/// Single-line formatter with a space after `,` and `:`
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}
