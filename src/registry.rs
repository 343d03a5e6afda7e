//! Deduplicating tile registry
//!
//! Tiles are registered in scan order. The first tile seen with a given
//! fingerprint becomes the canonical tile; later tiles with the same
//! fingerprint get the canonical tile's id and are not stored. Ids are
//! 1-based positions in first-occurrence order, so they double as Tiled
//! gids when the tileset's `firstgid` is 1.

use std::collections::HashMap;

use crate::fingerprint::Fingerprint;
use crate::tile::Tile;

/// Outcome of registering one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// 1-based id of the canonical tile
    pub id: u32,
    /// Whether an identical tile had already been registered
    pub duplicate: bool,
}

/// Insertion-ordered set of unique tiles keyed by fingerprint
#[derive(Debug, Default)]
pub struct TileRegistry {
    index: HashMap<Fingerprint, usize>,
    tiles: Vec<Tile>,
    duplicates: usize,
}

impl TileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tile` under `fingerprint` and return its id.
    ///
    /// First occurrence wins: on a hit the registry is left unchanged apart
    /// from the duplicate counter.
    pub fn register(&mut self, fingerprint: Fingerprint, tile: Tile) -> Registration {
        if let Some(id) = self.id_of(&fingerprint) {
            self.duplicates += 1;
            return Registration { id, duplicate: true };
        }

        let position = self.tiles.len();
        self.index.insert(fingerprint, position);
        self.tiles.push(tile);
        Registration { id: position as u32 + 1, duplicate: false }
    }

    /// Fingerprint `tile` and register it.
    pub fn register_tile(&mut self, tile: Tile) -> Registration {
        let fingerprint = Fingerprint::of(&tile.pixels);
        self.register(fingerprint, tile)
    }

    /// Id previously assigned to `fingerprint`, if any.
    pub fn id_of(&self, fingerprint: &Fingerprint) -> Option<u32> {
        self.index.get(fingerprint).map(|&p| p as u32 + 1)
    }

    /// Canonical tile for a 1-based id.
    pub fn get(&self, id: u32) -> Option<&Tile> {
        let position = (id as usize).checked_sub(1)?;
        self.tiles.get(position)
    }

    /// Canonical tiles in first-occurrence order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of unique tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of registrations that hit an existing tile.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
