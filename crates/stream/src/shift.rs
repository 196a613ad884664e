//! Toroidal rotation of the active cell matrix.
//!
//! Rotations move slot *contents*; the objects themselves are never rebuilt.
//! The row or column that wraps around is the recycled edge: its cells get a
//! new [`GridCoord`] and must be reloaded by the caller.

use glam::Vec3;
use terrastream_common::{Axis, GridCoord, SlotPos};

/// NxN matrix addressed by [`SlotPos`], stored column-major.
#[derive(Debug, Clone)]
pub struct SlotMatrix<T> {
    n: usize,
    slots: Vec<T>,
}

impl<T> SlotMatrix<T> {
    pub fn from_fn(n: usize, mut f: impl FnMut(SlotPos) -> T) -> Self {
        let mut slots = Vec::with_capacity(n * n);
        for col in 0..n {
            for row in 0..n {
                slots.push(f(SlotPos::new(col, row)));
            }
        }
        Self { n, slots }
    }

    pub fn try_from_fn<E>(n: usize, mut f: impl FnMut(SlotPos) -> Result<T, E>) -> Result<Self, E> {
        let mut slots = Vec::with_capacity(n * n);
        for col in 0..n {
            for row in 0..n {
                slots.push(f(SlotPos::new(col, row))?);
            }
        }
        Ok(Self { n, slots })
    }

    /// Cells along one edge.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn get(&self, slot: SlotPos) -> &T {
        &self.slots[self.index(slot)]
    }

    pub fn get_mut(&mut self, slot: SlotPos) -> &mut T {
        let i = self.index(slot);
        &mut self.slots[i]
    }

    /// All slots with their contents, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (SlotPos, &T)> {
        let n = self.n;
        self.slots
            .iter()
            .enumerate()
            .map(move |(i, t)| (SlotPos::new(i / n, i % n), t))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotPos, &mut T)> {
        let n = self.n;
        self.slots
            .iter_mut()
            .enumerate()
            .map(move |(i, t)| (SlotPos::new(i / n, i % n), t))
    }

    fn index(&self, slot: SlotPos) -> usize {
        assert!(slot.col < self.n && slot.row < self.n, "slot out of range: {slot:?}");
        slot.col * self.n + slot.row
    }
}

/// Row 0 wraps to row N-1; every other row moves one index down.
pub fn shift_down<T>(m: &mut SlotMatrix<T>) {
    let n = m.n;
    for column in m.slots.chunks_exact_mut(n.max(1)) {
        column.rotate_left(1.min(n));
    }
}

/// Row N-1 wraps to row 0; every other row moves one index up.
pub fn shift_up<T>(m: &mut SlotMatrix<T>) {
    let n = m.n;
    for column in m.slots.chunks_exact_mut(n.max(1)) {
        column.rotate_right(1.min(n));
    }
}

/// Column 0 wraps to column N-1.
pub fn shift_left<T>(m: &mut SlotMatrix<T>) {
    let n = m.n;
    m.slots.rotate_left(n);
}

/// Column N-1 wraps to column 0.
pub fn shift_right<T>(m: &mut SlotMatrix<T>) {
    let n = m.n;
    m.slots.rotate_right(n);
}

/// A one-step rotation of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    Down,
    Up,
    Left,
    Right,
}

impl Shift {
    pub fn axis(self) -> Axis {
        match self {
            Shift::Down | Shift::Up => Axis::Y,
            Shift::Left | Shift::Right => Axis::X,
        }
    }

    /// Direction non-wrapping contents travel along the axis: -1 or +1.
    fn sign(self) -> f32 {
        match self {
            Shift::Down | Shift::Left => -1.0,
            Shift::Up | Shift::Right => 1.0,
        }
    }

    /// Index of the edge the wrapped row or column lands on.
    pub fn landing_edge(self, n: usize) -> usize {
        match self {
            Shift::Down | Shift::Left => n - 1,
            Shift::Up | Shift::Right => 0,
        }
    }

    /// Coordinate change applied to recycled cells.
    pub fn coord_delta(self, n: usize) -> i32 {
        let n = n as i32;
        match self {
            Shift::Down | Shift::Left => n,
            Shift::Up | Shift::Right => -n,
        }
    }

    /// Rotate the matrix one step in this direction.
    pub fn rotate<T>(self, m: &mut SlotMatrix<T>) {
        match self {
            Shift::Down => shift_down(m),
            Shift::Up => shift_up(m),
            Shift::Left => shift_left(m),
            Shift::Right => shift_right(m),
        }
    }

    /// Slots of the edge that receives recycled contents.
    pub fn landing_slots(self, n: usize) -> Vec<SlotPos> {
        let edge = self.landing_edge(n);
        (0..n)
            .map(|i| match self.axis() {
                Axis::Y => SlotPos::new(i, edge),
                Axis::X => SlotPos::new(edge, i),
            })
            .collect()
    }

    /// World-space move for a cell after this shift.
    ///
    /// Ordinary cells follow their slot by one cell; recycled cells jump
    /// across the grid to the opposite edge.
    pub fn translation(self, cell_size: f32, n: usize, recycled: bool) -> Vec3 {
        let dir = self.axis().unit() * self.sign();
        if recycled {
            -dir * cell_size * (n as f32 - 1.0)
        } else {
            dir * cell_size
        }
    }
}

/// Anything that carries the authored coordinate of a slot.
pub trait Relabel {
    fn coord(&self) -> GridCoord;
    fn relabel(&mut self, coord: GridCoord);
}

impl Relabel for GridCoord {
    fn coord(&self) -> GridCoord {
        *self
    }

    fn relabel(&mut self, coord: GridCoord) {
        *self = coord;
    }
}

/// Rotate by one step and relabel the wrapped edge.
///
/// Returns the slots now holding recycled contents; those need a reload.
pub fn recycle<T: Relabel>(m: &mut SlotMatrix<T>, shift: Shift) -> Vec<SlotPos> {
    let n = m.n();
    if n == 0 {
        return Vec::new();
    }
    shift.rotate(m);
    let landed = shift.landing_slots(n);
    let delta = shift.coord_delta(n);
    for &slot in &landed {
        let cell = m.get_mut(slot);
        let next = cell.coord().offset(shift.axis(), delta);
        cell.relabel(next);
    }
    landed
}
