//! Tile asset collaborator: maps tile keys to asset paths and fetches
//! decoded images asynchronously.
//!
//! The streaming pipeline only knows the [`TileSource`] trait. How bytes are
//! retrieved (filesystem, memory, network) stays behind it.
//!
//! # Layout
//! Tile images live under a base directory and are named
//! `{prefix}{key}.{extension}`, e.g. `assets/map/map top down-2-3.png`; the
//! low-resolution fallback uses the key `base`.

mod fs;
mod memory;

pub use fs::FsTileSource;
pub use memory::MemoryTileSource;

use futures::future::BoxFuture;
use hexmap_common::{HexMapConfig, TileImage, TileKey};

/// Errors from fetching or decoding a tile image.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("tile asset not found: {0}")]
    NotFound(String),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

/// Asynchronous "fetch and decode image at path" capability.
pub trait TileSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<TileImage, FetchError>>;
}

impl<T: TileSource + ?Sized> TileSource for &T {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<TileImage, FetchError>> {
        (**self).fetch(path)
    }
}

/// Builds asset paths from tile keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePathScheme {
    pub base_path: String,
    pub prefix: String,
    pub extension: String,
}

impl Default for TilePathScheme {
    fn default() -> Self {
        Self::from_config(&HexMapConfig::default())
    }
}

impl TilePathScheme {
    pub fn from_config(config: &HexMapConfig) -> Self {
        Self {
            base_path: config.asset_base_path.clone(),
            prefix: config.tile_file_prefix.clone(),
            extension: config.tile_file_extension.clone(),
        }
    }

    /// `{base_path}{prefix}{key}.{extension}`.
    pub fn path_for(&self, key: TileKey) -> String {
        format!("{}{}{}.{}", self.base_path, self.prefix, key, self.extension)
    }
}

pub fn crate_info() -> &'static str {
    "hexmap-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexmap_common::TileId;

    #[test]
    fn default_path_scheme() {
        let scheme = TilePathScheme::default();
        assert_eq!(
            scheme.path_for(TileKey::Tile(TileId::new(2, 3))),
            "assets/map/map top down-2-3.png"
        );
        assert_eq!(
            scheme.path_for(TileKey::Base),
            "assets/map/map top down-base.png"
        );
    }

    #[test]
    fn custom_path_scheme() {
        let scheme = TilePathScheme {
            base_path: String::new(),
            prefix: "t_".into(),
            extension: "webp".into(),
        };
        assert_eq!(scheme.path_for(TileId::new(0, 1).into()), "t_0-1.webp");
    }

    #[test]
    fn fetch_error_messages() {
        let err = FetchError::NotFound("a/b.png".into());
        assert!(err.to_string().contains("a/b.png"));
    }
}
