//! Terrain tile assets: raw heightmap and splatmap codecs, tile sources.
//!
//! Tiles are addressed by [`GridCoord`](terrastream_common::GridCoord) and
//! live under a tile-set directory. Codecs are pure; all I/O goes through a
//! [`TileSource`].
//!
//! # Layout
//! ```text
//! <root>/<tile_set>/height_x<X>_y<Y>.raw   - 16-bit LE samples, no header
//! <root>/<tile_set>/splat_x<X>_y<Y>.png    - RGBA layer weights
//! ```

mod error;
pub mod heightmap;
mod pixels;
mod source;
pub mod splatmap;

pub use error::AssetError;
pub use heightmap::Heightmap;
pub use pixels::PixelBuffer;
pub use source::{
    FsTileSource, IMAGE_EXTENSIONS, MemoryTileSource, TileSource, decode_image, heightmap_path,
    splatmap_id,
};
pub use splatmap::{SPLAT_CHANNELS, SplatWeights};

pub fn crate_info() -> &'static str {
    "terrastream-assets v0.1.0"
}
