//! Rendering Adapter: renderer-agnostic interface over the terrain grid.
//!
//! # Invariants
//! - Renderers read the grid; they never shift or reload cells.
//!
//! # Workaround
//! Ships a debug text renderer that dumps the slot layout. A GPU backend
//! would implement the same trait against the terrain surfaces.

mod renderer;

pub use renderer::{DebugTextRenderer, GridRenderer};

pub fn crate_info() -> &'static str {
    "terrastream-render v0.1.0"
}
