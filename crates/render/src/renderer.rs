use terrastream_assets::TileSource;
use terrastream_stream::{ContentState, TerrainGrid, TerrainSurface};

/// Renderer-agnostic interface. All grid renderers implement this trait.
///
/// A renderer reads the grid as it stands after a tick and produces output.
/// It never mutates the grid.
pub trait GridRenderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the grid.
    fn render<S: TerrainSurface, L: TileSource>(&self, grid: &TerrainGrid<S, L>) -> Self::Output;
}

/// Debug text renderer.
///
/// Prints the slot matrix top row first, one `{name x,y}` entry per cell.
/// Cells showing stale content are suffixed `!`, blank placeholders `~`.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Also list each surface's world position.
    pub show_positions: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions() -> Self {
        Self {
            show_positions: true,
        }
    }
}

impl GridRenderer for DebugTextRenderer {
    type Output = String;

    fn render<S: TerrainSurface, L: TileSource>(&self, grid: &TerrainGrid<S, L>) -> String {
        let n = grid.cells_wide();
        let config = grid.config();
        let mut out = String::new();
        out.push_str(&format!(
            "=== Terrain Grid ({n}x{n}, cell={}, tile_set={}) ===\n",
            config.cell_size, config.tile_set
        ));
        let v = grid.viewer();
        let o = grid.origin();
        out.push_str(&format!(
            "Viewer: ({:.1}, {:.1}, {:.1}) index={} origin=({:.1}, {:.1}, {:.1})\n",
            v.x,
            v.y,
            v.z,
            grid.index(),
            o.x,
            o.y,
            o.z
        ));

        for row in (0..n).rev() {
            let line: Vec<String> = (0..n)
                .map(|col| {
                    let cell = grid.cell(terrastream_common::SlotPos::new(col, row));
                    let c = cell.coord();
                    let marker = match cell.content() {
                        ContentState::Fresh => "",
                        ContentState::Stale { .. } => "!",
                        ContentState::Blank => "~",
                    };
                    format!("{{{} {},{}}}{marker}", cell.name(), c.x, c.y)
                })
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }

        if self.show_positions {
            for (slot, cell) in grid.cells().iter() {
                let p = cell.surface().position();
                out.push_str(&format!(
                    "  [{},{}] {} pos=({:.1}, {:.1}, {:.1})\n",
                    slot.col,
                    slot.row,
                    cell.coord(),
                    p.x,
                    p.y,
                    p.z
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use terrastream_assets::{MemoryTileSource, PixelBuffer, heightmap, heightmap_path, splatmap_id};
    use terrastream_common::GridCoord;
    use terrastream_stream::{GridConfig, Heightfield};

    fn config() -> GridConfig {
        GridConfig {
            tile_set: "Test".into(),
            heightmap_resolution: 2,
            alphamap_resolution: 1,
            ..GridConfig::default()
        }
    }

    fn full_source(config: &GridConfig) -> MemoryTileSource {
        let mut source = MemoryTileSource::new();
        for x in -3..6 {
            for y in -3..6 {
                let coord = GridCoord::new(x, y);
                source.insert_bytes(
                    heightmap_path(&config.tile_set, coord),
                    vec![0; heightmap::byte_len(config.heightmap_resolution)],
                );
                source.insert_image(
                    splatmap_id(&config.tile_set, coord),
                    PixelBuffer::new(1, 1, vec![[1.0, 0.0, 0.0, 0.0]]).unwrap(),
                );
            }
        }
        source
    }

    #[test]
    fn renders_top_row_first() {
        let config = config();
        let source = full_source(&config);
        let grid: TerrainGrid<Heightfield, _> = TerrainGrid::new(config, source).unwrap();
        let out = DebugTextRenderer::new().render(&grid);

        assert!(out.contains("3x3, cell=512, tile_set=Test"));
        assert!(out.contains("index=(1, 1)"));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "{Terrain_0_2 0,2} {Terrain_1_2 1,2} {Terrain_2_2 2,2}");
        assert_eq!(lines[4], "{Terrain_0_0 0,0} {Terrain_1_0 1,0} {Terrain_2_0 2,0}");
    }

    #[test]
    fn names_stay_while_coords_move() {
        let config = config();
        let source = full_source(&config);
        let mut grid: TerrainGrid<Heightfield, _> = TerrainGrid::new(config, source).unwrap();
        grid.tick(Vec3::new(0.0, 0.0, 600.0)).unwrap();

        let out = DebugTextRenderer::new().render(&grid);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "{Terrain_0_0 0,3} {Terrain_1_0 1,3} {Terrain_2_0 2,3}");
    }

    #[test]
    fn marks_stale_cells() {
        let grid: TerrainGrid<Heightfield, _> =
            TerrainGrid::new(config(), MemoryTileSource::new()).unwrap();
        let out = DebugTextRenderer::with_positions().render(&grid);
        assert!(out.contains("{Terrain_1_1 1,1}!"));
        assert!(out.contains("[0,0] (0, 0) pos=(-768.0, 0.0, -768.0)"));
    }
}
