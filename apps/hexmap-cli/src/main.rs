use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use futures::executor::block_on;
use glam::Vec3;
use hexmap_assets::FsTileSource;
use hexmap_common::{HexMapConfig, LoadMode};
use hexmap_grid::{CellColoring, GridModel, HexLayout};
use hexmap_input::{HoverHighlighter, MapAction, PointerRay};
use hexmap_render::{AtlasExtent, CpuAtlas, LayeredAtlas, TextureCompositor};
use hexmap_render_wgpu::{GpuAtlas, GpuContext, HexMaterialUniforms, HexRenderer, MapCamera};
use hexmap_stream::{StreamConfig, StreamState, TileGrid, TileSession};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexmap-cli", about = "Hex grid and tile streaming tool")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (YAML or JSON); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the effective configuration
    Info,
    /// Write the default configuration as JSON
    InitConfig {
        #[arg(default_value = "hexmap.json")]
        output: PathBuf,
    },
    /// Pick the cell under a world position and list its overlay
    Pick {
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        z: f32,
    },
    /// List the tiles discovered around a viewpoint, nearest first
    Discover {
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        z: f32,
        /// Chebyshev radius in tiles (overrides the config)
        #[arg(short, long)]
        radius: Option<u32>,
    },
    /// Discover and load tiles into the atlas, then report completion
    Stream {
        #[arg(allow_negative_numbers = true, default_value = "0")]
        x: f32,
        #[arg(allow_negative_numbers = true, default_value = "0")]
        z: f32,
        /// Directory the asset paths are resolved against
        #[arg(short, long, default_value = ".")]
        assets: PathBuf,
        /// Load mode (overrides the config)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
        /// Composite on the GPU instead of in host memory
        #[arg(long)]
        gpu: bool,
        /// With --gpu, render the grid and save it as PNG
        #[arg(short, long, requires = "gpu")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Sequential,
    Concurrent,
}

impl From<ModeArg> for LoadMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sequential => LoadMode::Sequential,
            ModeArg::Concurrent => LoadMode::Concurrent,
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<HexMapConfig> {
    match path {
        Some(path) => HexMapConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(HexMapConfig::default()),
    }
}

fn layout_for(config: &HexMapConfig) -> HexLayout {
    HexLayout::new(config.outer_radius, config.grid_size)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("hexmap-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("grid: {}", hexmap_grid::crate_info());
            println!("stream: {}", hexmap_stream::crate_info());
            println!("assets: {}", hexmap_assets::crate_info());
            println!("render: {}", hexmap_render::crate_info());
            println!("render-wgpu: {}", hexmap_render_wgpu::crate_info());
            println!("input: {}", hexmap_input::crate_info());

            let layout = layout_for(&config);
            let size = layout.world_size();
            println!(
                "layout: {}x{} cells, outer radius {}, world {:.3} x {:.3}",
                layout.grid_size(),
                layout.grid_size(),
                layout.outer_radius(),
                size.x,
                size.z
            );
            println!(
                "tiles: {}x{} ({} layers of {}x{}), mode {:?}",
                config.tile_span,
                config.tile_span,
                config.tile_count(),
                config.tile_atlas_width,
                config.tile_atlas_height,
                config.load_mode
            );
        }
        Commands::InitConfig { output } => {
            config
                .save_json(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
        Commands::Pick { x, z } => {
            let mut model: GridModel = GridModel::new(layout_for(&config), CellColoring::default());
            let mut hover = HoverHighlighter::default();

            let overlay = hover.handle(&mut model, MapAction::Hover(PointerRay::from_above(x, z)));

            match (hover.current(), overlay) {
                (Some(cube), Some(overlay)) => {
                    let offset = cube.to_offset();
                    println!(
                        "cube ({}, {}, {}) offset ({}, {}) index {}",
                        cube.x,
                        cube.y,
                        cube.z,
                        offset.col,
                        offset.row,
                        model.index_of(cube).unwrap_or_default()
                    );
                    for (slot, placement) in overlay.slots().iter().enumerate() {
                        match placement.position {
                            Some(p) => println!(
                                "  slot {slot}: ({}, {}, {}) at ({:.3}, {:.3})",
                                placement.cube.x, placement.cube.y, placement.cube.z, p.x, p.z
                            ),
                            None => println!("  slot {slot}: outside grid"),
                        }
                    }
                }
                _ => println!("No cell at ({x}, {z})"),
            }
        }
        Commands::Discover { x, z, radius } => {
            let grid = TileGrid::for_layout(&layout_for(&config), config.tile_span);
            let viewpoint = Vec3::new(x, 0.0, z);
            let tiles = grid.discover_within(viewpoint, radius.or(config.discovery_radius));
            println!(
                "Viewpoint ({x}, {z}) -> tile {:?}, {} tiles discovered",
                grid.tile_coord_at(viewpoint),
                tiles.len()
            );
            for (i, tile) in tiles.iter().enumerate() {
                println!("  {i:>3}: {tile} (layer {})", tile.layer(config.tile_span));
            }
        }
        Commands::Stream {
            x,
            z,
            assets,
            mode,
            gpu,
            output,
        } => {
            let mut config = config;
            if let Some(mode) = mode {
                config.load_mode = mode.into();
            }
            let layout = layout_for(&config);
            let extent = AtlasExtent::for_span(
                config.tile_atlas_width,
                config.tile_atlas_height,
                config.tile_span,
            );
            let source = FsTileSource::new(assets);

            let mut state = StreamState::new(
                StreamConfig {
                    discovery_radius: config.discovery_radius,
                },
                TileGrid::for_layout(&layout, config.tile_span),
            );
            let tiles = state.update(Vec3::new(x, 0.0, z)).unwrap_or_default();
            let mut session = TileSession::from_config(&config);

            if gpu {
                // Fails before any tile work when no adapter is available
                let ctx = GpuContext::new().context("GPU unavailable")?;
                println!("Using adapter: {}", ctx.adapter_info().name);
                let mut compositor =
                    TextureCompositor::new(GpuAtlas::new(&ctx.device, &ctx.queue, extent));
                stream_tiles(&mut session, &tiles, &source, &mut compositor)?;

                if let Some(output) = output {
                    render_frame(&ctx, &config, &layout, &session, compositor.attachment(), &output)?;
                    println!("Wrote {}", output.display());
                }
            } else {
                let mut compositor = TextureCompositor::new(CpuAtlas::new(extent));
                stream_tiles(&mut session, &tiles, &source, &mut compositor)?;
            }
        }
    }

    Ok(())
}

fn stream_tiles<A: LayeredAtlas>(
    session: &mut TileSession,
    tiles: &[hexmap_common::TileId],
    source: &FsTileSource,
    compositor: &mut TextureCompositor<A>,
) -> anyhow::Result<()> {
    let base = block_on(session.load_base_map(source, compositor))?;
    if !base {
        tracing::warn!("base map unavailable; fallback texture stays blank");
    }

    let summary = block_on(session.run_cycle(tiles, source, compositor))?;
    let mask = session.completion();
    println!(
        "Loaded {}/{} tiles ({} failed), {} copies into atlas",
        summary.loaded,
        summary.requested,
        summary.failed,
        compositor.copy_count()
    );
    println!(
        "Completion: {}/{} layers, mask {}",
        mask.count(),
        mask.len(),
        mask.words()
            .iter()
            .rev()
            .map(|w| format!("{w:016x}"))
            .collect::<Vec<_>>()
            .join("_")
    );
    println!("Map ready: {}, base map: {}", session.map_ready(), session.base_loaded());
    Ok(())
}

fn render_frame(
    ctx: &GpuContext,
    config: &HexMapConfig,
    layout: &HexLayout,
    session: &TileSession,
    atlas: &GpuAtlas,
    output: &Path,
) -> anyhow::Result<()> {
    const WIDTH: u32 = 1024;
    const HEIGHT: u32 = 1024;

    let material = HexMaterialUniforms::new(
        layout,
        config.outline_width,
        config.outline_color,
        config.tile_span,
    )
    .with_map_ready(session.map_ready());
    let mut renderer = HexRenderer::offscreen(&ctx.device, layout, material, WIDTH, HEIGHT);
    let model: GridModel = GridModel::new(*layout, CellColoring::default());
    renderer.upload_instances(&ctx.queue, model.instances());
    renderer.bind_atlas(&ctx.device, atlas);

    let camera = MapCamera::framing(layout.world_size(), WIDTH as f32 / HEIGHT as f32);
    let frame = renderer.render_to_image(ctx, WIDTH, HEIGHT, camera.view_projection())?;

    image::RgbaImage::from_raw(frame.width(), frame.height(), frame.into_pixels())
        .context("frame buffer size mismatch")?
        .save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}
