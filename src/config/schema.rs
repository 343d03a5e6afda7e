//! Configuration schema types for `tilepack.toml`
//!
//! Every field is optional in the file; missing values fall back to the
//! built-in defaults below. Command-line flags override both.

use serde::{Deserialize, Serialize};

use crate::pipeline::IndexPolicy;
use crate::wrap::{Direction, FrameOrder};

/// Name of the configuration file searched for on startup.
pub const CONFIG_FILE_NAME: &str = "tilepack.toml";

/// Root of `tilepack.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TilepackConfig {
    /// Settings for `tilepack map`
    pub map: MapConfig,
    /// Settings for `tilepack wrap`
    pub wrap: WrapConfig,
}

/// `[map]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Split a one-pixel palette row off the top of source images
    pub palette: bool,
    /// Which source images get a tile layer in the map
    pub index: IndexPolicy,
    /// Fail instead of warning when the sheet outgrows the requested height
    pub strict: bool,
    /// Also write every unique tile as its own PNG
    pub keep_tiles: bool,
    /// Indent the map JSON
    pub pretty: bool,
    /// File name of the map document inside the output directory
    pub map_file: String,
    /// File name of the elided-tile log inside the output directory
    pub removed_log: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            palette: false,
            index: IndexPolicy::default(),
            strict: false,
            keep_tiles: false,
            pretty: false,
            map_file: "map.json".to_string(),
            removed_log: "removed.txt".to_string(),
        }
    }
}

/// `[wrap]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WrapConfig {
    pub direction: Direction,
    /// Pull wrapped rows from the neighbouring tile instead of the tile itself
    pub blend: bool,
    pub order: FrameOrder,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "map.map_file")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: '{}' {}", CONFIG_FILE_NAME, self.field, self.message)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

impl TilepackConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        let names = [("map.map_file", &self.map.map_file), ("map.removed_log", &self.map.removed_log)];
        for (field, value) in names {
            if !is_plain_file_name(value) {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: "must be a plain file name".to_string(),
                });
            }
        }

        if self.map.map_file == self.map.removed_log {
            errors.push(ConfigValidationError {
                field: "map.removed_log".to_string(),
                message: "must differ from map.map_file".to_string(),
            });
        }

        errors
    }
}
