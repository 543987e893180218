use crate::atlas::{AtlasExtent, LayeredAtlas};
use hexmap_common::TileImage;

/// Errors from compositing into the atlas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositorError {
    #[error("layer {layer} out of range (atlas depth {depth})")]
    LayerOutOfRange { layer: u32, depth: u32 },
    #[error("empty {width}x{height} image for layer {layer}")]
    EmptyImage { layer: u32, width: u32, height: u32 },
}

/// Copies loaded tiles into one layer each of a layered atlas.
///
/// The compositor is the only writer of the atlas. Readers borrow it through
/// [`attachment`](TextureCompositor::attachment) at any time, including while
/// a load cycle is still running; layers not yet written hold the atlas's
/// default fill.
#[derive(Debug)]
pub struct TextureCompositor<A> {
    atlas: A,
    copy_count: u64,
}

impl<A: LayeredAtlas> TextureCompositor<A> {
    pub fn new(atlas: A) -> Self {
        Self {
            atlas,
            copy_count: 0,
        }
    }

    pub fn extent(&self) -> AtlasExtent {
        self.atlas.extent()
    }

    /// Blit `image` into `layer`. Writing a layer again overwrites it.
    ///
    /// An image with no pixels is rejected and leaves the layer untouched.
    pub fn copy_texture(&mut self, image: &TileImage, layer: u32) -> Result<(), CompositorError> {
        let depth = self.atlas.extent().depth;
        if layer >= depth {
            return Err(CompositorError::LayerOutOfRange { layer, depth });
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(CompositorError::EmptyImage {
                layer,
                width: image.width(),
                height: image.height(),
            });
        }
        self.atlas.blit_layer(layer, image);
        self.copy_count += 1;
        tracing::debug!(
            layer,
            width = image.width(),
            height = image.height(),
            "tile copied into atlas"
        );
        Ok(())
    }

    /// Store the low-resolution fallback texture.
    pub fn set_base_map(&mut self, image: &TileImage) {
        self.atlas.upload_base_map(image);
        tracing::debug!(width = image.width(), height = image.height(), "base map stored");
    }

    /// The atlas, read-only, for the rendering engine.
    pub fn attachment(&self) -> &A {
        &self.atlas
    }

    /// Number of successful layer copies so far.
    pub fn copy_count(&self) -> u64 {
        self.copy_count
    }

    pub fn into_inner(self) -> A {
        self.atlas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::CpuAtlas;

    fn compositor() -> TextureCompositor<CpuAtlas> {
        TextureCompositor::new(CpuAtlas::new(AtlasExtent::for_span(2, 2, 5)))
    }

    #[test]
    fn copy_into_valid_layer() {
        let mut c = compositor();
        c.copy_texture(&TileImage::filled(2, 2, [10, 0, 0, 255]), 24)
            .unwrap();
        assert_eq!(c.attachment().texel(24, 1, 1), [10, 0, 0, 255]);
        assert_eq!(c.copy_count(), 1);
    }

    #[test]
    fn layer_out_of_range_is_rejected() {
        let mut c = compositor();
        let err = c
            .copy_texture(&TileImage::filled(2, 2, [0, 0, 0, 255]), 25)
            .unwrap_err();
        assert_eq!(err, CompositorError::LayerOutOfRange { layer: 25, depth: 25 });
        assert_eq!(c.copy_count(), 0);
    }

    #[test]
    fn empty_image_is_rejected_and_not_counted() {
        let mut c = compositor();
        let err = c
            .copy_texture(&TileImage::filled(0, 0, [0, 0, 0, 255]), 2)
            .unwrap_err();
        assert_eq!(
            err,
            CompositorError::EmptyImage {
                layer: 2,
                width: 0,
                height: 0
            }
        );
        assert_eq!(c.copy_count(), 0);
        assert_eq!(c.attachment().texel(2, 0, 0), CpuAtlas::DEFAULT_FILL);
    }

    #[test]
    fn overwriting_a_layer_keeps_neighbours_intact() {
        let mut c = compositor();
        c.copy_texture(&TileImage::filled(2, 2, [1, 1, 1, 255]), 3).unwrap();
        c.copy_texture(&TileImage::filled(2, 2, [2, 2, 2, 255]), 4).unwrap();
        c.copy_texture(&TileImage::filled(2, 2, [3, 3, 3, 255]), 5).unwrap();

        c.copy_texture(&TileImage::filled(2, 2, [9, 9, 9, 255]), 4).unwrap();

        let atlas = c.attachment();
        assert!(atlas.layer(4).chunks(4).all(|t| t == [9, 9, 9, 255]));
        assert!(atlas.layer(3).chunks(4).all(|t| t == [1, 1, 1, 255]));
        assert!(atlas.layer(5).chunks(4).all(|t| t == [3, 3, 3, 255]));
        assert_eq!(c.copy_count(), 4);
    }

    #[test]
    fn attachment_readable_mid_stream() {
        let mut c = compositor();
        c.copy_texture(&TileImage::filled(2, 2, [4, 4, 4, 255]), 0).unwrap();
        let atlas = c.attachment();
        assert_eq!(atlas.texel(0, 0, 0), [4, 4, 4, 255]);
        assert_eq!(atlas.texel(1, 0, 0), CpuAtlas::DEFAULT_FILL);
    }

    #[test]
    fn base_map_goes_to_fallback() {
        let mut c = compositor();
        c.set_base_map(&TileImage::filled(8, 8, [6, 6, 6, 255]));
        assert!(c.attachment().base_map().is_some());
        assert_eq!(c.copy_count(), 0);
    }
}
