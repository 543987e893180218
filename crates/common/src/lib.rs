//! Shared types for the hexmap workspace: transforms, colors, tile ids,
//! decoded tile images and the external configuration.

pub mod config;
pub mod image;
pub mod tile;
pub mod types;

pub use config::{ConfigError, HexMapConfig, LoadMode};
pub use image::{ImageSizeError, TileImage};
pub use tile::{ParseTileIdError, TileId, TileKey};
pub use types::{Color, Transform};

pub fn crate_info() -> &'static str {
    "hexmap-common v0.1.0"
}
