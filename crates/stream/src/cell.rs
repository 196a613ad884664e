use glam::Vec3;
use terrastream_assets::{
    AssetError, Heightmap, SPLAT_CHANNELS, SplatWeights, TileSource, heightmap, heightmap_path,
    splatmap, splatmap_id,
};
use terrastream_common::{GridCoord, SlotPos};

use crate::config::{GridConfig, MissingTilePolicy};
use crate::error::StreamError;
use crate::shift::Relabel;
use crate::surface::{SPLAT_TILE_SIZE, SplatLayer, SurfaceDesc, TerrainSurface, TextureHandle};

/// Whether a cell's surface shows the tile its coordinate names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentState {
    /// Height and splat both belong to the current coordinate.
    Fresh,
    /// A load failed; the surface still shows earlier content.
    Stale { reason: String },
    /// A load failed and a flat placeholder was applied.
    Blank,
}

/// One terrain tile occupying a slot of the active matrix.
///
/// The slot never changes. The coordinate and surface content are replaced
/// each time the slot is recycled; the surface itself lives as long as the
/// cell.
#[derive(Debug)]
pub struct TerrainCell<S> {
    slot: SlotPos,
    coord: GridCoord,
    name: String,
    surface: S,
    content: ContentState,
}

impl<S: TerrainSurface> TerrainCell<S> {
    /// Allocate the surface for `slot` and load its initial heightmap.
    ///
    /// `origin` is the grid's world origin; the surface is placed at the
    /// slot's offset from it.
    pub fn create<L: TileSource>(
        slot: SlotPos,
        coord: GridCoord,
        origin: Vec3,
        config: &GridConfig,
        source: &L,
    ) -> Result<Self, StreamError> {
        let cell_size = config.cell_size as f32;
        let name = format!("Terrain_{}_{}", coord.x, coord.y);
        let surface = S::create(&SurfaceDesc {
            name: name.clone(),
            size: Vec3::new(cell_size, cell_size / 4.0, cell_size),
            heightmap_resolution: config.heightmap_resolution,
            alphamap_resolution: config.alphamap_resolution,
            position: origin + slot.local_position(cell_size),
        });

        let mut cell = Self {
            slot,
            coord,
            name,
            surface,
            content: ContentState::Fresh,
        };
        if let Err(e) = cell.reload_heightmap(source, config) {
            cell.settle(e, config)?;
        }
        Ok(cell)
    }

    /// Register up to four splat layers, then load the splatmap.
    pub fn apply_textures<L: TileSource>(
        &mut self,
        textures: &[TextureHandle],
        source: &L,
        config: &GridConfig,
    ) -> Result<(), StreamError> {
        if textures.len() > SPLAT_CHANNELS {
            return Err(StreamError::TooManyLayers {
                max: SPLAT_CHANNELS,
                got: textures.len(),
            });
        }
        let layers: Vec<SplatLayer> = textures
            .iter()
            .map(|t| SplatLayer {
                texture: t.clone(),
                tile_size: SPLAT_TILE_SIZE,
            })
            .collect();
        self.surface.set_splat_layers(&layers);

        if let Err(e) = self.reload_splatmap(source, config) {
            self.settle(e, config)?;
        }
        Ok(())
    }

    /// Load, decode and apply the heightmap for the current coordinate.
    ///
    /// The surface is untouched on error.
    pub fn reload_heightmap<L: TileSource>(&mut self, source: &L, config: &GridConfig) -> Result<(), StreamError> {
        let heights = self
            .fetch_heights(source, config)
            .map_err(|e| StreamError::tile(self.coord, e))?;
        self.surface.set_heights(0, 0, &heights);
        Ok(())
    }

    /// Load, decode and apply the splatmap for the current coordinate.
    pub fn reload_splatmap<L: TileSource>(&mut self, source: &L, config: &GridConfig) -> Result<(), StreamError> {
        let weights = self
            .fetch_weights(source, config)
            .map_err(|e| StreamError::tile(self.coord, e))?;
        self.surface.set_alpha_weights(0, 0, &weights);
        Ok(())
    }

    /// Refresh height and splat together.
    ///
    /// Both tiles are fetched and decoded before either is applied, so the
    /// surface never mixes data from two coordinates. Failures are resolved
    /// by the configured [`MissingTilePolicy`].
    pub fn reload<L: TileSource>(&mut self, source: &L, config: &GridConfig) -> Result<&ContentState, StreamError> {
        let _span = tracing::debug_span!("cell_reload", x = self.coord.x, y = self.coord.y).entered();

        let fetched = self
            .fetch_heights(source, config)
            .and_then(|h| Ok((h, self.fetch_weights(source, config)?)));
        match fetched {
            Ok((heights, weights)) => {
                self.surface.set_heights(0, 0, &heights);
                self.surface.set_alpha_weights(0, 0, &weights);
                self.content = ContentState::Fresh;
                tracing::debug!(coord = %self.coord, slot = ?self.slot, "cell reloaded");
            }
            Err(e) => self.settle(StreamError::tile(self.coord, e), config)?,
        }
        Ok(&self.content)
    }

    fn fetch_heights<L: TileSource>(&self, source: &L, config: &GridConfig) -> Result<Heightmap, AssetError> {
        let path = heightmap_path(&config.tile_set, self.coord);
        let bytes = config.retry.run(&path, || source.load_bytes(&path))?;
        heightmap::decode(&bytes, config.heightmap_resolution)
    }

    fn fetch_weights<L: TileSource>(&self, source: &L, config: &GridConfig) -> Result<SplatWeights, AssetError> {
        let id = splatmap_id(&config.tile_set, self.coord);
        let pixels = config.retry.run(&id, || source.load_image(&id))?;
        let mut weights = self.surface.alpha_weights(0, 0, pixels.width(), pixels.width());
        splatmap::decode_into(&pixels, &mut weights, (0, 0))?;
        Ok(weights)
    }

    fn settle(&mut self, err: StreamError, config: &GridConfig) -> Result<(), StreamError> {
        match config.missing_tile {
            MissingTilePolicy::Fail => {
                self.content = ContentState::Stale {
                    reason: err.to_string(),
                };
                return Err(err);
            }
            MissingTilePolicy::Retain => {
                tracing::warn!(coord = %self.coord, error = %err, "tile load failed, keeping stale content");
                self.content = ContentState::Stale {
                    reason: err.to_string(),
                };
            }
            MissingTilePolicy::Blank => {
                tracing::warn!(coord = %self.coord, error = %err, "tile load failed, applying blank tile");
                self.surface
                    .set_heights(0, 0, &Heightmap::blank(config.heightmap_resolution));
                self.surface
                    .set_alpha_weights(0, 0, &SplatWeights::blank(config.alphamap_resolution));
                self.content = ContentState::Blank;
            }
        }
        Ok(())
    }

    pub fn slot(&self) -> SlotPos {
        self.slot
    }

    pub fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Name given at creation, after the initial coordinate.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn content(&self) -> &ContentState {
        &self.content
    }

    pub fn is_fresh(&self) -> bool {
        self.content == ContentState::Fresh
    }
}

impl<S> Relabel for TerrainCell<S> {
    fn coord(&self) -> GridCoord {
        self.coord
    }

    fn relabel(&mut self, coord: GridCoord) {
        self.coord = coord;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Heightfield;
    use crate::testutil::{test_config, tile_height, tile_source};
    use terrastream_assets::MemoryTileSource;

    fn make_cell(source: &MemoryTileSource, config: &GridConfig) -> TerrainCell<Heightfield> {
        TerrainCell::create(
            SlotPos::new(1, 2),
            GridCoord::new(1, 2),
            Vec3::new(-768.0, 0.0, -768.0),
            config,
            source,
        )
        .unwrap()
    }

    #[test]
    fn create_places_and_loads_heights() {
        let config = test_config();
        let source = tile_source(&config, 0..3, 0..3);
        let cell = make_cell(&source, &config);

        assert_eq!(cell.name(), "Terrain_1_2");
        assert_eq!(cell.surface().position(), Vec3::new(-256.0, 0.0, 256.0));
        assert_eq!(cell.surface().size(), Vec3::new(512.0, 128.0, 512.0));
        assert_eq!(cell.surface().heights().get(0, 0), tile_height(GridCoord::new(1, 2)));
        assert_eq!(cell.surface().height_writes(), 1);
        assert!(cell.is_fresh());
    }

    #[test]
    fn apply_textures_registers_layers_and_splat() {
        let config = test_config();
        let source = tile_source(&config, 0..3, 0..3);
        let mut cell = make_cell(&source, &config);

        let textures: Vec<_> = ["sand", "rock"].iter().map(|t| TextureHandle(t.to_string())).collect();
        cell.apply_textures(&textures, &source, &config).unwrap();

        let layers = cell.surface().layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].tile_size, SPLAT_TILE_SIZE);
        assert_eq!(cell.surface().alpha_writes(), 1);
        assert_eq!(cell.surface().alpha().get(0, 0, 0), 0.11);
    }

    #[test]
    fn too_many_layers() {
        let config = test_config();
        let source = tile_source(&config, 0..3, 0..3);
        let mut cell = make_cell(&source, &config);
        let textures = vec![TextureHandle("t".into()); 5];
        assert!(matches!(
            cell.apply_textures(&textures, &source, &config),
            Err(StreamError::TooManyLayers { max: 4, got: 5 })
        ));
    }

    #[test]
    fn strict_reload_reports_missing_tile() {
        let config = test_config();
        let source = tile_source(&config, 0..3, 0..3);
        let mut cell = make_cell(&source, &config);
        cell.relabel(GridCoord::new(40, 40));

        let err = cell.reload_heightmap(&source, &config).unwrap_err();
        match err {
            StreamError::Tile { coord, source } => {
                assert_eq!(coord, GridCoord::new(40, 40));
                assert!(source.is_not_found());
            }
            other => panic!("unexpected error: {other}"),
        }
        // previous content intact
        assert_eq!(cell.surface().heights().get(0, 0), tile_height(GridCoord::new(1, 2)));
    }

    #[test]
    fn reload_is_both_or_neither() {
        let config = test_config();
        let mut source = tile_source(&config, 0..3, 0..3);
        // heights exist for (1, 5) but the splat does not
        source.insert_bytes(
            heightmap_path(&config.tile_set, GridCoord::new(1, 5)),
            vec![0xFF; heightmap::byte_len(config.heightmap_resolution)],
        );
        let mut cell = make_cell(&source, &config);
        cell.reload(&source, &config).unwrap();
        let writes = cell.surface().height_writes();

        cell.relabel(GridCoord::new(1, 5));
        let state = cell.reload(&source, &config).unwrap().clone();

        assert!(matches!(state, ContentState::Stale { .. }));
        assert_eq!(cell.surface().height_writes(), writes);
        assert_eq!(cell.surface().heights().get(0, 0), tile_height(GridCoord::new(1, 2)));
    }

    #[test]
    fn blank_policy_substitutes_placeholder() {
        let config = GridConfig {
            missing_tile: MissingTilePolicy::Blank,
            ..test_config()
        };
        let source = tile_source(&config, 0..3, 0..3);
        let mut cell = make_cell(&source, &config);
        cell.relabel(GridCoord::new(-1, 2));

        assert_eq!(cell.reload(&source, &config).unwrap(), &ContentState::Blank);
        assert_eq!(cell.surface().heights().min_max(), Some((0.0, 0.0)));
        assert_eq!(cell.surface().alpha().get(1, 1, 0), 1.0);
    }

    #[test]
    fn fail_policy_propagates() {
        let config = GridConfig {
            missing_tile: MissingTilePolicy::Fail,
            ..test_config()
        };
        let source = tile_source(&config, 0..3, 0..3);
        let mut cell = make_cell(&source, &config);
        cell.relabel(GridCoord::new(9, 9));
        assert!(cell.reload(&source, &config).is_err());
        assert!(!cell.is_fresh());
    }

    #[test]
    fn create_with_missing_tile_follows_policy() {
        let config = GridConfig {
            missing_tile: MissingTilePolicy::Fail,
            ..test_config()
        };
        let source = MemoryTileSource::new();
        let result = TerrainCell::<Heightfield>::create(
            SlotPos::new(0, 0),
            GridCoord::new(0, 0),
            Vec3::ZERO,
            &config,
            &source,
        );
        assert!(result.is_err());

        let config = test_config();
        let cell = TerrainCell::<Heightfield>::create(
            SlotPos::new(0, 0),
            GridCoord::new(0, 0),
            Vec3::ZERO,
            &config,
            &source,
        )
        .unwrap();
        assert!(matches!(cell.content(), ContentState::Stale { .. }));
    }

    #[test]
    fn transient_io_is_retried() {
        let config = test_config();
        let source = tile_source(&config, 0..3, 0..3);
        let mut cell = make_cell(&source, &config);
        cell.relabel(GridCoord::new(2, 2));
        source.fail_next(heightmap_path(&config.tile_set, GridCoord::new(2, 2)), 1);

        assert_eq!(cell.reload(&source, &config).unwrap(), &ContentState::Fresh);
        assert_eq!(cell.surface().heights().get(1, 1), tile_height(GridCoord::new(2, 2)));
    }

    #[test]
    fn truncated_heightmap_keeps_previous_content() {
        let config = test_config();
        let mut source = tile_source(&config, 0..3, 0..3);
        source.insert_bytes(heightmap_path(&config.tile_set, GridCoord::new(0, 0)), vec![1, 2, 3]);
        let mut cell = make_cell(&source, &config);
        cell.relabel(GridCoord::new(0, 0));

        let state = cell.reload(&source, &config).unwrap().clone();
        match state {
            ContentState::Stale { reason } => assert!(reason.contains("incomplete data")),
            other => panic!("unexpected state: {other:?}"),
        }
        assert_eq!(cell.surface().heights().get(0, 0), tile_height(GridCoord::new(1, 2)));
    }
}
