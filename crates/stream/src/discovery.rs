use glam::{Vec2, Vec3};
use hexmap_common::TileId;
use hexmap_grid::HexLayout;
use std::collections::{HashSet, VecDeque};

/// Square decomposition of the map into `span × span` tiles.
///
/// The map covers the hex grid's world rectangle, centered on the origin.
/// Tile `(col, row)` spans `anchor + (col, row) * tile_size` to
/// `anchor + (col + 1, row + 1) * tile_size` on the x/z plane, with
/// `anchor = -0.5 * world_size`, the same anchor the hex layout uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    span: u32,
    world_size: Vec2,
}

impl TileGrid {
    /// Create a tile grid over a world of the given x/z extent.
    pub fn new(span: u32, world_size: Vec3) -> Self {
        assert!(span > 0, "span must be at least 1");
        assert!(
            world_size.x > 0.0 && world_size.z > 0.0,
            "world size must be positive on x and z"
        );
        Self {
            span,
            world_size: Vec2::new(world_size.x, world_size.z),
        }
    }

    /// Tile grid covering a hex layout's world rectangle.
    pub fn for_layout(layout: &HexLayout, span: u32) -> Self {
        Self::new(span, layout.world_size())
    }

    pub fn span(&self) -> u32 {
        self.span
    }

    pub fn tile_count(&self) -> u32 {
        self.span * self.span
    }

    /// World-space size of one tile on x/z.
    pub fn tile_size(&self) -> Vec2 {
        self.world_size / self.span as f32
    }

    /// Unclamped tile coordinate of a viewpoint:
    /// `floor(span * (viewpoint + 0.5 * world_size) / world_size)` on x/z.
    pub fn tile_coord_at(&self, viewpoint: Vec3) -> (i32, i32) {
        let p = Vec2::new(viewpoint.x, viewpoint.z) + self.world_size * 0.5;
        let t = (p * self.span as f32 / self.world_size).floor();
        (t.x as i32, t.y as i32)
    }

    /// Tile containing a viewpoint, or `None` if the viewpoint is off the map.
    pub fn tile_at(&self, viewpoint: Vec3) -> Option<TileId> {
        let (col, row) = self.tile_coord_at(viewpoint);
        self.to_tile(col, row)
    }

    /// World x/z rectangle `(min, max)` covered by a tile.
    pub fn tile_bounds(&self, tile: TileId) -> (Vec2, Vec2) {
        let size = self.tile_size();
        let anchor = self.world_size * -0.5;
        let min = anchor + Vec2::new(tile.col as f32, tile.row as f32) * size;
        (min, min + size)
    }

    fn to_tile(&self, col: i32, row: i32) -> Option<TileId> {
        let span = self.span as i32;
        ((0..span).contains(&col) && (0..span).contains(&row))
            .then(|| TileId::new(col as u32, row as u32))
    }

    /// Every in-range tile, nearest to the viewpoint first.
    pub fn discover(&self, viewpoint: Vec3) -> Vec<TileId> {
        self.discover_within(viewpoint, None)
    }

    /// Breadth-first discovery from the viewpoint's tile.
    ///
    /// Pops tiles from a FIFO frontier. Tiles outside `[0, span)` (or beyond
    /// `radius` in Chebyshev distance, if given) are dropped without being
    /// accepted or expanded. Accepted tiles enqueue their 8-connected
    /// neighbours that were never enqueued before. The result is in
    /// acceptance order, i.e. by ring distance from the start.
    pub fn discover_within(&self, viewpoint: Vec3, radius: Option<u32>) -> Vec<TileId> {
        let start = self.tile_coord_at(viewpoint);
        self.discover_from(start, radius)
    }

    /// [`discover_within`](Self::discover_within) from an explicit start tile coordinate.
    pub fn discover_from(&self, start: (i32, i32), radius: Option<u32>) -> Vec<TileId> {
        let _span = tracing::info_span!("tile_discovery", ?start, span = self.span).entered();
        let (tiles, dropped) = self.walk(start, radius);
        tracing::debug!(accepted = tiles.len(), dropped = dropped.len(), "tile discovery complete");
        tiles
    }

    /// BFS returning the accepted tiles and the coordinates dropped along the way.
    ///
    /// `seen` holds every coordinate ever enqueued, so a dropped coordinate is
    /// never enqueued again by a later neighbour.
    fn walk(&self, start: (i32, i32), radius: Option<u32>) -> (Vec<TileId>, Vec<(i32, i32)>) {
        let mut frontier: VecDeque<(i32, i32)> = VecDeque::from([start]);
        let mut seen: HashSet<(i32, i32)> = HashSet::from([start]);
        let mut tiles = Vec::new();
        let mut dropped = Vec::new();

        while let Some(current) = frontier.pop_front() {
            let within_radius = radius.is_none_or(|r| {
                let d = (current.0 - start.0).abs().max((current.1 - start.1).abs());
                d as u32 <= r
            });
            let Some(tile) = self.to_tile(current.0, current.1).filter(|_| within_radius) else {
                dropped.push(current);
                continue;
            };

            tiles.push(tile);

            for (dx, dz) in NEIGHBOR_OFFSETS {
                let next = (current.0 + dx, current.1 + dz);
                if seen.insert(next) {
                    frontier.push_back(next);
                }
            }
        }

        (tiles, dropped)
    }
}

/// 8-connected neighbourhood: the row above, the two sides, the row below.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];
