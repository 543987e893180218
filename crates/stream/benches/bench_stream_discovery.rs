use std::hint::black_box;
use std::time::Instant;

use futures::executor::block_on;
use glam::Vec3;
use hexmap_assets::{MemoryTileSource, TilePathScheme};
use hexmap_common::{LoadMode, TileImage, TileKey};
use hexmap_render::{AtlasExtent, CpuAtlas, TextureCompositor};
use hexmap_stream::{StreamConfig, StreamState, TileGrid, TileSession};

fn bench_discovery(span: u32, iterations: usize) {
    let grid = TileGrid::new(span, Vec3::new(100.0, 0.0, 100.0));

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(grid.discover(black_box(Vec3::ZERO)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  discover (span {span}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_stream_update(span: u32, iterations: usize) {
    let grid = TileGrid::new(span, Vec3::new(100.0, 0.0, 100.0));
    let mut state = StreamState::new(
        StreamConfig {
            discovery_radius: Some(2),
        },
        grid,
    );

    let start = Instant::now();
    for i in 0..iterations {
        // Simulate viewer moving
        let x = (i % 20) as f32 * 5.0 - 50.0;
        let _ = black_box(state.update(black_box(Vec3::new(x, 0.0, 0.0))));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  stream update (span {span}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_cycle(span: u32, tile_px: u32, mode: LoadMode, iterations: usize) {
    let grid = TileGrid::new(span, Vec3::new(100.0, 0.0, 100.0));
    let tiles = grid.discover(Vec3::ZERO);
    let scheme = TilePathScheme::default();
    let mut source = MemoryTileSource::new();
    for &t in &tiles {
        source.insert(
            scheme.path_for(TileKey::Tile(t)),
            TileImage::filled(tile_px, tile_px, [128, 128, 128, 255]),
        );
    }

    let start = Instant::now();
    for _ in 0..iterations {
        let mut session = TileSession::new(span, mode, scheme.clone());
        let mut compositor =
            TextureCompositor::new(CpuAtlas::new(AtlasExtent::for_span(tile_px, tile_px, span)));
        let _ = black_box(block_on(session.run_cycle(&tiles, &source, &mut compositor)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  load cycle (span {span}, {tile_px}px, {mode:?}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Stream Discovery Benchmarks ===\n");

    println!("Discovery:");
    bench_discovery(5, 10000);
    bench_discovery(20, 1000);
    bench_discovery(100, 100);

    println!("\nStream update (viewer moving):");
    bench_stream_update(5, 10000);
    bench_stream_update(20, 10000);

    println!("\nLoad cycle into CPU atlas:");
    bench_cycle(5, 64, LoadMode::Sequential, 100);
    bench_cycle(5, 64, LoadMode::Concurrent, 100);
    bench_cycle(8, 128, LoadMode::Concurrent, 20);

    println!("\n=== Done ===");
}
