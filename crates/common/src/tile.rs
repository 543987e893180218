use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One square region of a `span × span` decomposition of the full map.
///
/// Serializes to the key `"col-row"`, which is also the token used in tile
/// asset file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    pub col: u32,
    pub row: u32,
}

impl TileId {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Atlas layer (and completion bit) for this tile: `row * span + col`.
    pub fn layer(&self, span: u32) -> u32 {
        debug_assert!(self.in_span(span), "tile {self} outside span {span}");
        self.row * span + self.col
    }

    /// Whether the tile lies inside `[0, span) × [0, span)`.
    pub fn in_span(&self, span: u32) -> bool {
        self.col < span && self.row < span
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.col, self.row)
    }
}

/// A tile key that is not of the form `"col-row"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed tile id {0:?}, expected \"col-row\"")]
pub struct ParseTileIdError(pub String);

impl FromStr for TileId {
    type Err = ParseTileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseTileIdError(s.to_string());
        let (col, row) = s.split_once('-').ok_or_else(malformed)?;
        let col = col.parse().map_err(|_| malformed())?;
        let row = row.parse().map_err(|_| malformed())?;
        Ok(Self { col, row })
    }
}

/// What a loader queue fetches: one map tile, or the low-resolution base map
/// sampled before the atlas is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKey {
    Tile(TileId),
    Base,
}

impl TileKey {
    pub const BASE_KEY: &'static str = "base";

    pub fn tile(&self) -> Option<TileId> {
        match self {
            TileKey::Tile(id) => Some(*id),
            TileKey::Base => None,
        }
    }
}

impl From<TileId> for TileKey {
    fn from(id: TileId) -> Self {
        TileKey::Tile(id)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileKey::Tile(id) => id.fmt(f),
            TileKey::Base => f.write_str(Self::BASE_KEY),
        }
    }
}

impl FromStr for TileKey {
    type Err = ParseTileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::BASE_KEY {
            return Ok(TileKey::Base);
        }
        s.parse().map(TileKey::Tile)
    }
}
