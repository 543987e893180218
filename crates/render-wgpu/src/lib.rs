//! wgpu render backend for the hex map.
//!
//! Renders the grid as instanced hexagons whose fill samples either the
//! low-resolution base map or the tile atlas, and implements the layered
//! atlas as a GPU texture array filled by render-to-layer blits.
//!
//! # Invariants
//! - The renderer never mutates grid or session state; it reads uploaded buffers only.
//! - Atlas layers are written one blit at a time, each into a single-layer view.
//! - Setup failures surface as [`RenderError`] before any tile work begins.

mod atlas;
mod camera;
mod context;
mod gpu;
mod shaders;

pub use atlas::GpuAtlas;
pub use camera::MapCamera;
pub use context::{GpuContext, RenderError};
pub use gpu::{HexMaterialUniforms, HexRenderer};
pub use shaders::{BLIT_SHADER, HEX_SHADER};

pub fn crate_info() -> &'static str {
    "hexmap-render-wgpu v0.1.0"
}
