//! Externally supplied configuration.
//!
//! Loaded from YAML or JSON depending on the file extension. Every field has
//! a default, so a config file only needs to name what it overrides.

use crate::types::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a loader queue issues its fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// One fetch at a time, in request order.
    #[default]
    Sequential,
    /// All fetches issued at once; completion order is arbitrary.
    Concurrent,
}

/// Errors from loading or validating a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension {0:?} (expected yaml, yml or json)")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Grid, outline and tile-streaming settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexMapConfig {
    /// Outer radius (center to corner) of one hex cell.
    pub outer_radius: f32,
    /// Cells per axis; the grid has `grid_size²` cells.
    pub grid_size: u32,
    /// Width of the hex outline in the fill shader.
    pub outline_width: f32,
    pub outline_color: Color,
    /// Tiles per axis covering the whole map; the atlas has `tile_span²` layers.
    pub tile_span: u32,
    pub tile_atlas_width: u32,
    pub tile_atlas_height: u32,
    /// Directory (with trailing separator) holding the tile images.
    pub asset_base_path: String,
    /// File name prefix placed before the tile key.
    pub tile_file_prefix: String,
    pub tile_file_extension: String,
    pub load_mode: LoadMode,
    /// Chebyshev tile radius explored per discovery cycle; `None` covers the map.
    pub discovery_radius: Option<u32>,
}

impl Default for HexMapConfig {
    fn default() -> Self {
        Self {
            outer_radius: 1.0,
            grid_size: 100,
            outline_width: 0.02,
            outline_color: Color::rgb(0.26, 0.69, 0.92),
            tile_span: 5,
            tile_atlas_width: 2048,
            tile_atlas_height: 2048,
            asset_base_path: "assets/map/".into(),
            tile_file_prefix: "map top down-".into(),
            tile_file_extension: "png".into(),
            load_mode: LoadMode::Sequential,
            discovery_radius: None,
        }
    }
}

impl HexMapConfig {
    /// Load a config file, choosing the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Reject values the grid and atlas cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.outer_radius.is_finite() && self.outer_radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "outer_radius must be positive, got {}",
                self.outer_radius
            )));
        }
        if self.grid_size == 0 {
            return Err(ConfigError::Invalid("grid_size must be at least 1".into()));
        }
        if self.tile_span == 0 {
            return Err(ConfigError::Invalid("tile_span must be at least 1".into()));
        }
        if self.tile_atlas_width == 0 || self.tile_atlas_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "atlas size must be non-zero, got {}x{}",
                self.tile_atlas_width, self.tile_atlas_height
            )));
        }
        if self.outline_width < 0.0 {
            return Err(ConfigError::Invalid("outline_width must not be negative".into()));
        }
        Ok(())
    }

    /// Number of atlas layers (and completion bits).
    pub fn tile_count(&self) -> u32 {
        self.tile_span * self.tile_span
    }
}
