//! Streaming: an NxN toroidal window of terrain cells around the viewer.
//!
//! # Invariants
//! - N is odd; the viewer sits over the center slot.
//! - Slots are never recreated. A shift rotates contents, relabels the
//!   wrapped edge and reloads only that edge (at most N cells per step).
//! - A cell shows height and splat from the same coordinate, or keeps its
//!   previous content when a reload fails.
//!
//! Everything runs synchronously inside [`TerrainGrid::tick`].

mod cell;
mod config;
mod error;
mod grid;
pub mod shift;
mod surface;
#[cfg(test)]
mod testutil;

pub use cell::{ContentState, TerrainCell};
pub use config::{ConfigError, GridConfig, MissingTilePolicy, RetryPolicy, cells_wide};
pub use error::StreamError;
pub use grid::{GridStats, Move, TerrainGrid, TickReport};
pub use shift::{Relabel, Shift, SlotMatrix};
pub use surface::{
    Heightfield, SPLAT_TILE_SIZE, SplatLayer, SurfaceDesc, TerrainSurface, TextureHandle,
};

pub fn crate_info() -> &'static str {
    "terrastream-stream v0.1.0"
}
