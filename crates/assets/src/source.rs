use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use terrastream_common::GridCoord;

use crate::{AssetError, PixelBuffer};

/// Image extensions tried, in order, when resolving a logical image id.
pub const IMAGE_EXTENSIONS: &[&str] = &["png"];

/// Resource path of the raw heightmap for a tile.
///
/// The naming scheme is shared with existing authored tile sets and must not
/// change: `<tile_set>/height_x<x>_y<y>.raw`.
pub fn heightmap_path(tile_set: &str, coord: GridCoord) -> String {
    format!("{tile_set}/height_x{}_y{}.raw", coord.x, coord.y)
}

/// Logical (extension-less) id of the splat image for a tile.
pub fn splatmap_id(tile_set: &str, coord: GridCoord) -> String {
    format!("{tile_set}/splat_x{}_y{}", coord.x, coord.y)
}

/// Source of raw tile data.
///
/// Implementations must report a missing resource as
/// [`AssetError::NotFound`] and keep other I/O failures distinct.
pub trait TileSource {
    /// Read the full contents of a binary resource.
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>, AssetError>;

    /// Load and decode an image by logical id (no extension).
    fn load_image(&self, logical_path: &str) -> Result<PixelBuffer, AssetError>;
}

impl<T: TileSource + ?Sized> TileSource for &T {
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        (**self).load_bytes(path)
    }

    fn load_image(&self, logical_path: &str) -> Result<PixelBuffer, AssetError> {
        (**self).load_image(logical_path)
    }
}

/// Decode an encoded image (PNG) into texture-space pixels.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, AssetError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AssetError::Image(e.to_string()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    PixelBuffer::from_rgba8_top_down(width as usize, height as usize, img.as_raw())
}

/// Tile source rooted at a directory on disk.
///
/// Layout:
/// ```text
/// <root>/<tile_set>/height_x0_y0.raw
/// <root>/<tile_set>/splat_x0_y0.png
/// ```
#[derive(Debug, Clone)]
pub struct FsTileSource {
    root: PathBuf,
}

impl FsTileSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, relative: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.root.join(relative);
        std::fs::read(&full).map_err(|e| AssetError::from_io(full.display().to_string(), e))
    }
}

impl TileSource for FsTileSource {
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let bytes = self.read(path)?;
        tracing::trace!(path, len = bytes.len(), "read tile bytes");
        Ok(bytes)
    }

    fn load_image(&self, logical_path: &str) -> Result<PixelBuffer, AssetError> {
        for ext in IMAGE_EXTENSIONS {
            let relative = format!("{logical_path}.{ext}");
            match self.read(&relative) {
                Ok(bytes) => {
                    tracing::trace!(path = %relative, "read tile image");
                    return decode_image(&bytes);
                }
                Err(AssetError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(AssetError::NotFound(logical_path.to_string()))
    }
}

/// In-memory tile source for tooling and tests.
///
/// Transient failures can be scheduled per path to exercise retry handling.
#[derive(Debug, Default)]
pub struct MemoryTileSource {
    bytes: HashMap<String, Vec<u8>>,
    images: HashMap<String, PixelBuffer>,
    pending_failures: Mutex<HashMap<String, u32>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_bytes(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.bytes.insert(path.into(), bytes);
    }

    pub fn insert_image(&mut self, logical_path: impl Into<String>, pixels: PixelBuffer) {
        self.images.insert(logical_path.into(), pixels);
    }

    /// Make the next `count` requests for `path` fail with an I/O error.
    pub fn fail_next(&self, path: impl Into<String>, count: u32) {
        if let Ok(mut pending) = self.pending_failures.lock() {
            pending.insert(path.into(), count);
        }
    }

    /// Every path requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, path: &str) -> Result<(), AssetError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(path.to_string());
        }
        let mut pending = match self.pending_failures.lock() {
            Ok(p) => p,
            Err(_) => return Ok(()),
        };
        if let Some(remaining) = pending.get_mut(path) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AssetError::Io {
                    path: path.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Interrupted, "scheduled failure"),
                });
            }
        }
        Ok(())
    }
}

impl TileSource for MemoryTileSource {
    fn load_bytes(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.record(path)?;
        self.bytes
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }

    fn load_image(&self, logical_path: &str) -> Result<PixelBuffer, AssetError> {
        self.record(logical_path)?;
        self.images
            .get(logical_path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(logical_path.to_string()))
    }
}
