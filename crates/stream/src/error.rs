use terrastream_assets::AssetError;
use terrastream_common::GridCoord;

use crate::config::ConfigError;

/// Errors surfaced by the streaming grid.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Loading or decoding the tile for a cell failed.
    #[error("tile {coord}: {source}")]
    Tile {
        coord: GridCoord,
        #[source]
        source: AssetError,
    },
    #[error("at most {max} splat layers supported, got {got}")]
    TooManyLayers { max: usize, got: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StreamError {
    pub(crate) fn tile(coord: GridCoord, source: AssetError) -> Self {
        StreamError::Tile { coord, source }
    }
}
