use crate::{FetchError, TileSource};
use futures::FutureExt;
use futures::future::BoxFuture;
use hexmap_common::TileImage;
use std::path::{Path, PathBuf};

/// Reads tile images from disk and decodes them to RGBA8.
///
/// Paths handed to [`TileSource::fetch`] are resolved against `root`.
///
/// Reading and decoding are blocking: each fetch completes on its first poll,
/// so concurrent loads from this source run one after another on the polling
/// thread.
#[derive(Debug, Clone)]
pub struct FsTileSource {
    root: PathBuf,
}

impl FsTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load(&self, path: &str) -> Result<TileImage, FetchError> {
        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| FetchError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            })?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        tracing::debug!(path, width, height, "decoded tile image");

        TileImage::from_rgba8(width, height, decoded.into_raw()).map_err(|e| {
            FetchError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl TileSource for FsTileSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<TileImage, FetchError>> {
        async move { self.load(path) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::FutureExt as _;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, rgba: [u8; 4]) {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn fetch_decodes_png() {
        let tmp = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "tile-0-0.png", 4, 2, [200, 100, 50, 255]);

        let source = FsTileSource::new(tmp.path());
        let img = block_on(source.fetch("tile-0-0.png")).unwrap();
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 2);
        assert_eq!(img.pixel(3, 1), [200, 100, 50, 255]);
    }

    #[test]
    fn fetch_is_ready_on_first_poll() {
        let tmp = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "tile-1-0.png", 2, 2, [1, 2, 3, 255]);

        let source = FsTileSource::new(tmp.path());
        let img = source.fetch("tile-1-0.png").now_or_never();
        assert_eq!(img.map(|r| r.map(|i| i.width())).transpose().unwrap(), Some(2));
        assert!(source.fetch("missing.png").now_or_never().is_some());
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FsTileSource::new(tmp.path());
        let err = block_on(source.fetch("nope.png")).unwrap_err();
        assert!(matches!(err, FetchError::NotFound(p) if p == "nope.png"));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bad.png"), b"not a png").unwrap();
        let source = FsTileSource::new(tmp.path());
        let err = block_on(source.fetch("bad.png")).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
