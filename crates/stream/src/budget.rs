use std::time::{Duration, Instant};

use glam::Vec3;
use hexmap_common::TileId;

use crate::discovery::TileGrid;

/// Streaming configuration.
#[derive(Debug, Clone, Default)]
pub struct StreamConfig {
    /// Chebyshev radius (in tiles) around the viewer to discover. `None` covers the whole map.
    pub discovery_radius: Option<u32>,
}

/// Tracks the viewer's tile and starts a new discovery whenever it changes.
pub struct StreamState {
    pub config: StreamConfig,
    grid: TileGrid,
    current: Option<(i32, i32)>,
    stats: StreamStats,
}

/// Statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub cycles_started: u64,
    pub tiles_discovered: usize,
    pub discovery_time: Duration,
}

impl StreamState {
    pub fn new(config: StreamConfig, grid: TileGrid) -> Self {
        Self {
            config,
            grid,
            current: None,
            stats: StreamStats::default(),
        }
    }

    /// Update with the viewer's world position.
    ///
    /// Returns the newly discovered tiles, nearest first, when the viewer has
    /// entered a different tile (or on the first call); `None` otherwise.
    pub fn update(&mut self, viewpoint: Vec3) -> Option<Vec<TileId>> {
        let tile = self.grid.tile_coord_at(viewpoint);
        if self.current == Some(tile) {
            return None;
        }
        let _span = tracing::info_span!("stream_update", ?tile).entered();
        let start = Instant::now();

        self.current = Some(tile);
        let tiles = self
            .grid
            .discover_from(tile, self.config.discovery_radius);

        self.stats.cycles_started += 1;
        self.stats.tiles_discovered = tiles.len();
        self.stats.discovery_time = start.elapsed();

        tracing::trace!(
            discovered = tiles.len(),
            cycles = self.stats.cycles_started,
            "viewer changed tile"
        );
        Some(tiles)
    }

    /// The viewer's current tile coordinate, possibly off the map.
    pub fn current_tile(&self) -> Option<(i32, i32)> {
        self.current
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Get statistics from the last discovery.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(radius: Option<u32>) -> StreamState {
        StreamState::new(
            StreamConfig {
                discovery_radius: radius,
            },
            TileGrid::new(5, Vec3::new(100.0, 0.0, 100.0)),
        )
    }

    #[test]
    fn stream_config_defaults() {
        assert_eq!(StreamConfig::default().discovery_radius, None);
    }

    #[test]
    fn first_update_discovers() {
        let mut s = state(None);
        let tiles = s.update(Vec3::ZERO).unwrap();
        assert_eq!(tiles.len(), 25);
        assert_eq!(s.current_tile(), Some((2, 2)));
        assert_eq!(s.stats().cycles_started, 1);
        assert_eq!(s.stats().tiles_discovered, 25);
    }

    #[test]
    fn moving_within_a_tile_does_nothing() {
        let mut s = state(None);
        s.update(Vec3::ZERO);
        assert!(s.update(Vec3::new(5.0, 3.0, -5.0)).is_none());
        assert_eq!(s.stats().cycles_started, 1);
    }

    #[test]
    fn crossing_a_tile_boundary_rediscovers() {
        let mut s = state(Some(1));
        assert_eq!(s.update(Vec3::ZERO).map(|t| t.len()), Some(9));
        let tiles = s.update(Vec3::new(-45.0, 0.0, -45.0)).unwrap();
        assert_eq!(tiles[0], TileId::new(0, 0));
        assert_eq!(tiles.len(), 4);
        assert_eq!(s.stats().cycles_started, 2);
    }

    #[test]
    fn leaving_the_map_yields_empty_discovery() {
        let mut s = state(None);
        s.update(Vec3::ZERO);
        assert_eq!(s.update(Vec3::new(80.0, 0.0, 0.0)), Some(Vec::new()));
        assert_eq!(s.current_tile(), Some((6, 2)));
    }
}
