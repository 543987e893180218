use hexmap_common::TileImage;

/// Fixed dimensions of a layered atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasExtent {
    pub width: u32,
    pub height: u32,
    /// Number of layers, one per tile (`span²`).
    pub depth: u32,
}

impl AtlasExtent {
    pub fn for_span(width: u32, height: u32, span: u32) -> Self {
        Self {
            width,
            height,
            depth: span * span,
        }
    }
}

/// A layered texture the compositor writes tiles into.
///
/// Implementations never see an out-of-range layer: the compositor checks
/// the index before calling [`blit_layer`](LayeredAtlas::blit_layer).
pub trait LayeredAtlas {
    fn extent(&self) -> AtlasExtent;

    /// Copy `image` into `layer`, rescaling to the layer size. Other layers are untouched.
    fn blit_layer(&mut self, layer: u32, image: &TileImage);

    /// Replace the low-resolution fallback sampled before the atlas is ready.
    fn upload_base_map(&mut self, image: &TileImage);
}

/// Host-memory RGBA8 atlas.
///
/// Layers start opaque black, which is what an unpopulated layer samples as.
#[derive(Debug, Clone)]
pub struct CpuAtlas {
    extent: AtlasExtent,
    texels: Vec<u8>,
    base_map: Option<TileImage>,
}

impl CpuAtlas {
    pub const DEFAULT_FILL: [u8; 4] = [0, 0, 0, 255];

    pub fn new(extent: AtlasExtent) -> Self {
        let fill = TileImage::filled(extent.width, extent.height, Self::DEFAULT_FILL);
        let texels = fill.pixels().repeat(extent.depth as usize);
        Self {
            extent,
            texels,
            base_map: None,
        }
    }

    fn layer_len(&self) -> usize {
        self.extent.width as usize * self.extent.height as usize * TileImage::BYTES_PER_PIXEL
    }

    /// Raw RGBA8 bytes of one layer. Panics if `layer` is out of range.
    pub fn layer(&self, layer: u32) -> &[u8] {
        assert!(layer < self.extent.depth, "layer {layer} out of range");
        let len = self.layer_len();
        let start = layer as usize * len;
        &self.texels[start..start + len]
    }

    pub fn texel(&self, layer: u32, x: u32, y: u32) -> [u8; 4] {
        let bytes = self.layer(layer);
        let i = (y as usize * self.extent.width as usize + x as usize) * TileImage::BYTES_PER_PIXEL;
        [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]
    }

    pub fn base_map(&self) -> Option<&TileImage> {
        self.base_map.as_ref()
    }
}

impl LayeredAtlas for CpuAtlas {
    fn extent(&self) -> AtlasExtent {
        self.extent
    }

    fn blit_layer(&mut self, layer: u32, image: &TileImage) {
        let (w, h) = (self.extent.width as usize, self.extent.height as usize);
        let (sw, sh) = (image.width() as usize, image.height() as usize);
        let len = self.layer_len();
        let start = layer as usize * len;
        let dst = &mut self.texels[start..start + len];

        if sw == w && sh == h {
            dst.copy_from_slice(image.pixels());
            return;
        }
        if sw == 0 || sh == 0 {
            tracing::warn!(layer, "skipping blit of empty image");
            return;
        }

        // Nearest-neighbour resample
        let src = image.pixels();
        for y in 0..h {
            let sy = y * sh / h;
            for x in 0..w {
                let sx = x * sw / w;
                let s = (sy * sw + sx) * TileImage::BYTES_PER_PIXEL;
                let d = (y * w + x) * TileImage::BYTES_PER_PIXEL;
                dst[d..d + TileImage::BYTES_PER_PIXEL]
                    .copy_from_slice(&src[s..s + TileImage::BYTES_PER_PIXEL]);
            }
        }
    }

    fn upload_base_map(&mut self, image: &TileImage) {
        self.base_map = Some(image.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlas() -> CpuAtlas {
        CpuAtlas::new(AtlasExtent::for_span(4, 4, 3))
    }

    #[test]
    fn starts_with_default_fill() {
        let a = atlas();
        assert_eq!(a.extent().depth, 9);
        assert_eq!(a.layer(0).len(), 4 * 4 * 4);
        assert_eq!(a.texel(8, 3, 3), CpuAtlas::DEFAULT_FILL);
    }

    #[test]
    fn same_size_blit_copies_exactly() {
        let mut a = atlas();
        a.blit_layer(2, &TileImage::filled(4, 4, [1, 2, 3, 255]));
        assert_eq!(a.texel(2, 0, 0), [1, 2, 3, 255]);
        assert_eq!(a.texel(2, 3, 3), [1, 2, 3, 255]);
        assert_eq!(a.texel(1, 0, 0), CpuAtlas::DEFAULT_FILL);
        assert_eq!(a.texel(3, 0, 0), CpuAtlas::DEFAULT_FILL);
    }

    #[test]
    fn smaller_image_is_upscaled() {
        let mut a = atlas();
        // 2x2 source: left column red, right column blue
        let mut pixels = Vec::new();
        for _ in 0..2 {
            pixels.extend_from_slice(&[255, 0, 0, 255]);
            pixels.extend_from_slice(&[0, 0, 255, 255]);
        }
        let src = TileImage::from_rgba8(2, 2, pixels).unwrap();
        a.blit_layer(0, &src);
        assert_eq!(a.texel(0, 0, 0), [255, 0, 0, 255]);
        assert_eq!(a.texel(0, 1, 3), [255, 0, 0, 255]);
        assert_eq!(a.texel(0, 2, 0), [0, 0, 255, 255]);
        assert_eq!(a.texel(0, 3, 3), [0, 0, 255, 255]);
    }

    #[test]
    fn larger_image_is_downscaled() {
        let mut a = atlas();
        a.blit_layer(4, &TileImage::filled(16, 16, [7, 7, 7, 7]));
        assert!(a.layer(4).chunks(4).all(|t| t == [7, 7, 7, 7]));
    }

    #[test]
    fn base_map_is_separate_from_layers() {
        let mut a = atlas();
        assert!(a.base_map().is_none());
        a.upload_base_map(&TileImage::filled(2, 2, [5, 5, 5, 255]));
        assert_eq!(a.base_map().unwrap().width(), 2);
        assert_eq!(a.texel(0, 0, 0), CpuAtlas::DEFAULT_FILL);
    }
}
