//! Output directory layout and artifact writing
//!
//! A map run writes into a fresh directory:
//!
//! | File | Content |
//! |------|---------|
//! | `tileset<SHEET>.png` | Packed unique tiles |
//! | `map.json` | Tiled map descriptor |
//! | `removed.txt` | One line per elided duplicate |
//! | `<prefix><NNNN>.png` | Unique tiles, with `--keep-tiles` only |

use image::RgbaImage;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::pipeline::Tilemap;
use crate::report::{Event, Reporter};
use crate::tile::TilePosition;

/// Where a map run writes: a directory plus a file name prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    /// Tileset name and prefix of kept tile files; may be empty
    pub prefix: String,
}

impl OutputTarget {
    /// Split `DIR/PREFIX` at the last path separator.
    pub fn parse(arg: &str) -> Result<Self> {
        let split = arg.rfind(|c: char| std::path::is_separator(c));
        match split {
            Some(i) if i > 0 => Ok(Self {
                dir: PathBuf::from(&arg[..i]),
                prefix: arg[i + 1..].to_string(),
            }),
            _ => Err(Error::InvalidArgs(format!(
                "Must specify output directory, got '{}' (expected DIR/PREFIX)",
                arg
            ))),
        }
    }

    /// Fail if the output directory exists and `force` is not set.
    pub fn check_available(&self, force: bool) -> Result<()> {
        if self.dir.exists() && !force {
            return Err(Error::OutputExists(self.dir.clone()));
        }
        Ok(())
    }

    /// Path of a kept tile, numbered by scan position.
    pub fn tile_path(&self, scan: usize) -> PathBuf {
        self.dir.join(format!("{}{:04}.png", self.prefix, scan))
    }
}

/// Fail on the first input path that is not an existing file.
pub fn check_inputs(paths: &[PathBuf]) -> Result<()> {
    match paths.iter().find(|p| !p.is_file()) {
        Some(missing) => Err(Error::MissingInput(missing.clone())),
        None => Ok(()),
    }
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| Error::Image { path: path.to_path_buf(), source })
}

/// Options for [`write_tilemap`]
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub map_file: String,
    pub removed_log: String,
    pub keep_tiles: bool,
    pub pretty: bool,
    pub force: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            map_file: "map.json".to_string(),
            removed_log: "removed.txt".to_string(),
            keep_tiles: false,
            pretty: false,
            force: false,
        }
    }
}

/// Scan number of a tile across all sources, counting from 0.
fn scan_number(tilemap: &Tilemap, position: &TilePosition, tile: Size) -> usize {
    let before: usize = tilemap.indices[..position.source].iter().map(Vec::len).sum();
    let columns = tilemap.sources[position.source].size().tiles_in(tile).width;
    let within = (position.y / tile.height) * columns + position.x / tile.width;
    before + within as usize
}

/// Text of the elided-tile log: `<source> <x>,<y> -> <id>` per line.
pub fn removed_log(tilemap: &Tilemap) -> String {
    let mut out = String::new();
    for elided in &tilemap.elided {
        let source = &tilemap.sources[elided.position.source];
        let _ = writeln!(
            out,
            "{} {},{} -> {}",
            source.path.display(),
            elided.position.x,
            source.file_row(elided.position.y),
            elided.id
        );
    }
    out
}

/// Write every artifact of a map run and return the paths written.
///
/// The output directory is created here, so callers only reach the
/// filesystem once the in-memory pipeline has succeeded.
pub fn write_tilemap(
    tilemap: &Tilemap,
    target: &OutputTarget,
    options: &WriteOptions,
    reporter: &dyn Reporter,
) -> Result<Vec<PathBuf>> {
    target.check_available(options.force)?;
    fs::create_dir_all(&target.dir)?;

    let mut written = Vec::new();
    let mut record = |path: PathBuf| {
        reporter.report(Event::ArtifactWritten { path: path.clone() });
        written.push(path);
    };

    let sheet_path = target.dir.join(&tilemap.map.tilesets[0].image);
    save_png(&tilemap.sheet, &sheet_path)?;
    record(sheet_path);

    let map_path = target.dir.join(&options.map_file);
    fs::write(&map_path, tilemap.map.to_json(options.pretty)?)?;
    record(map_path);

    let log_path = target.dir.join(&options.removed_log);
    fs::write(&log_path, removed_log(tilemap))?;
    record(log_path);

    if options.keep_tiles {
        let tile = tilemap.layout.tile;
        for unique in tilemap.registry.tiles() {
            let path = target.tile_path(scan_number(tilemap, &unique.position, tile));
            save_png(&unique.pixels, &path)?;
            record(path);
        }
    }

    Ok(written)
}
