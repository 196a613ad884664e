//! Shared value types: authored tile coordinates and active-matrix slots.

mod types;

pub use types::{Axis, GridCoord, SlotPos};
