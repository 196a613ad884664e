//! Fixture tiles shared by the unit tests of this crate.

use std::ops::Range;

use terrastream_assets::{MemoryTileSource, PixelBuffer, heightmap_path, splatmap_id};
use terrastream_common::GridCoord;

use crate::config::GridConfig;

/// Small 3x3 grid with tiny tiles.
pub fn test_config() -> GridConfig {
    GridConfig {
        tile_set: "Test".into(),
        min_visible_size: 1536,
        cell_size: 512,
        heightmap_resolution: 3,
        alphamap_resolution: 2,
        ..GridConfig::default()
    }
}

fn raw_sample(coord: GridCoord) -> u16 {
    ((coord.x + 10) * 100 + (coord.y + 10)) as u16
}

/// Every sample of a fixture tile has this height.
pub fn tile_height(coord: GridCoord) -> f32 {
    raw_sample(coord) as f32 / 65535.0
}

/// Fixture source with height and splat tiles for every coordinate in range.
///
/// Splat pixels carry `(x + 10) / 100` in red and `(y + 10) / 100` in green.
pub fn tile_source(config: &GridConfig, xs: Range<i32>, ys: Range<i32>) -> MemoryTileSource {
    let mut source = MemoryTileSource::new();
    for x in xs {
        for y in ys.clone() {
            insert_tile(&mut source, config, GridCoord::new(x, y));
        }
    }
    source
}

/// Add the height and splat fixture for one coordinate.
pub fn insert_tile(source: &mut MemoryTileSource, config: &GridConfig, coord: GridCoord) {
    let r = config.heightmap_resolution;
    let w = config.alphamap_resolution;
    let bytes = raw_sample(coord).to_le_bytes().repeat(r * r);
    source.insert_bytes(heightmap_path(&config.tile_set, coord), bytes);

    let px = [(coord.x + 10) as f32 / 100.0, (coord.y + 10) as f32 / 100.0, 0.0, 0.0];
    let pixels = PixelBuffer::new(w, w, vec![px; w * w]).unwrap();
    source.insert_image(splatmap_id(&config.tile_set, coord), pixels);
}
