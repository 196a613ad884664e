use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Address of an authored terrain tile.
///
/// This is the coordinate a cell currently *represents*, not where it sits in
/// the active matrix. Tiles on disk are named after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset along a single axis.
    pub fn offset(self, axis: Axis, delta: i32) -> Self {
        match axis {
            Axis::X => Self::new(self.x + delta, self.y),
            Axis::Y => Self::new(self.x, self.y + delta),
        }
    }

    pub fn along(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed position of a slot in the NxN active matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotPos {
    pub col: usize,
    pub row: usize,
}

impl SlotPos {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Local placement of this slot relative to the grid origin.
    ///
    /// Columns run along world X, rows along world Z.
    pub fn local_position(self, cell_size: f32) -> Vec3 {
        Vec3::new(
            self.col as f32 * cell_size,
            0.0,
            self.row as f32 * cell_size,
        )
    }
}

/// One of the two horizontal movement axes of the grid.
///
/// `X` is lateral (world X), `Y` is forward (world Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Component of a world position that tracks this axis.
    pub fn component(self, position: Vec3) -> f32 {
        match self {
            Axis::X => position.x,
            Axis::Y => position.z,
        }
    }

    /// Unit world vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Z,
        }
    }
}
