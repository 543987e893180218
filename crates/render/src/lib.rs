//! Texture compositing: renderer-agnostic layered atlas and the compositor
//! that fills it one tile per layer.
//!
//! # Invariants
//! - Only the compositor writes the atlas, one layer per copy.
//! - A copy never touches any layer other than its target.
//! - Out-of-range layers are rejected before reaching the atlas.
//!
//! The GPU implementation of [`LayeredAtlas`] lives in `hexmap-render-wgpu`;
//! [`CpuAtlas`] backs headless runs and tests.

mod atlas;
mod compositor;

pub use atlas::{AtlasExtent, CpuAtlas, LayeredAtlas};
pub use compositor::{CompositorError, TextureCompositor};

pub fn crate_info() -> &'static str {
    "hexmap-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
