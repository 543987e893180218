/// A decoded tile image: tightly packed RGBA8, row-major, top row first.
#[derive(Clone, PartialEq, Eq)]
pub struct TileImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Pixel buffer length does not match the stated dimensions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("pixel buffer of {actual} bytes does not match {width}x{height} RGBA8 ({expected} bytes)")]
pub struct ImageSizeError {
    pub width: u32,
    pub height: u32,
    pub expected: usize,
    pub actual: usize,
}

impl TileImage {
    pub const BYTES_PER_PIXEL: usize = 4;

    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageSizeError> {
        let expected = width as usize * height as usize * Self::BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(ImageSizeError {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// An image with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * Self::BYTES_PER_PIXEL)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

impl std::fmt::Debug for TileImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_image_has_uniform_pixels() {
        let img = TileImage::filled(3, 2, [10, 20, 30, 255]);
        assert_eq!(img.pixels().len(), 3 * 2 * 4);
        assert_eq!(img.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(img.pixel(2, 1), [10, 20, 30, 255]);
    }

    #[test]
    fn rejects_wrong_buffer_length() {
        let err = TileImage::from_rgba8(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(err.expected, 16);
        assert_eq!(err.actual, 15);
    }

    #[test]
    fn pixel_addressing_is_row_major() {
        let mut pixels = vec![0u8; 2 * 2 * 4];
        // (1, 1) is the last pixel
        pixels[12..16].copy_from_slice(&[1, 2, 3, 4]);
        let img = TileImage::from_rgba8(2, 2, pixels).unwrap();
        assert_eq!(img.pixel(1, 1), [1, 2, 3, 4]);
        assert_eq!(img.pixel(1, 0), [0, 0, 0, 0]);
    }
}
