use std::time::{Duration, Instant};

use glam::Vec3;
use terrastream_assets::TileSource;
use terrastream_common::{Axis, GridCoord, SlotPos};

use crate::cell::{ContentState, TerrainCell};
use crate::config::GridConfig;
use crate::error::StreamError;
use crate::shift::{SlotMatrix, Shift, recycle};
use crate::surface::{TerrainSurface, TextureHandle};

/// A one-cell step of the active window, named by where the viewer went.
///
/// Moving up rotates the matrix down: the row behind the viewer is recycled
/// ahead of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// Viewer crossed `+cell_size` on z.
    Up,
    /// Viewer crossed `-cell_size` on z.
    Down,
    /// Viewer crossed `+cell_size` on x.
    Right,
    /// Viewer crossed `-cell_size` on x.
    Left,
}

impl Move {
    pub fn shift(self) -> Shift {
        match self {
            Move::Up => Shift::Down,
            Move::Down => Shift::Up,
            Move::Right => Shift::Left,
            Move::Left => Shift::Right,
        }
    }

    pub fn axis(self) -> Axis {
        self.shift().axis()
    }

    /// +1 for up/right, -1 for down/left.
    fn sign(self) -> i32 {
        match self {
            Move::Up | Move::Right => 1,
            Move::Down | Move::Left => -1,
        }
    }

    /// Whether `viewer` lies more than `limit` past the center in this
    /// direction.
    fn crossed(self, viewer: Vec3, limit: f32) -> bool {
        self.axis().component(viewer) * self.sign() as f32 > limit
    }
}

/// What a single `tick` did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Moves performed, in evaluation order.
    pub moves: Vec<Move>,
    /// Moves the viewer asked for but the index bounds refused.
    pub skipped: Vec<Move>,
    /// Coordinates reloaded with fresh content.
    pub reloaded: Vec<GridCoord>,
    /// Coordinates whose reload failed and were left stale or blanked.
    pub degraded: Vec<GridCoord>,
    /// Viewer position after recentering.
    pub viewer: Vec3,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.moves.is_empty() && self.skipped.is_empty()
    }
}

/// Running totals across ticks.
#[derive(Debug, Clone, Default)]
pub struct GridStats {
    pub ticks: u64,
    pub moves: u64,
    pub skipped: u64,
    pub reloads: u64,
    pub degraded: u64,
    /// Ticks that returned an error.
    pub failed: u64,
    pub last_tick_time: Duration,
}

/// Streaming terrain grid: an NxN window of cells that follows the viewer.
///
/// The viewer is kept within one cell of the center. When it crosses a cell
/// boundary the matrix rotates by one row or column, the wrapped edge is
/// relabeled and reloaded, every surface is moved one cell back, and the
/// viewer is pulled back by one cell. Invariant: the cell in slot
/// `(col, row)` is always at `origin + (col, 0, row) * cell_size`.
pub struct TerrainGrid<S, L> {
    config: GridConfig,
    source: L,
    cells: SlotMatrix<TerrainCell<S>>,
    center: usize,
    visible_size: f32,
    origin: Vec3,
    viewer: Vec3,
    index: GridCoord,
    stats: GridStats,
}

impl<S: TerrainSurface, L: TileSource> TerrainGrid<S, L> {
    /// Build the grid, load every cell and place the viewer over the center.
    pub fn new(config: GridConfig, source: L) -> Result<Self, StreamError> {
        config.validate()?;

        let n = config.cells_wide();
        let center = n / 2;
        let visible_size = (n as u32 * config.cell_size) as f32;
        tracing::info!(
            visible_size,
            cells_wide = n,
            tile_set = %config.tile_set,
            "visible size set: {visible_size}x{visible_size} -> {n}x{n}"
        );

        let origin = Vec3::new(-visible_size / 2.0, 0.0, -visible_size / 2.0);
        let mut cells = SlotMatrix::try_from_fn(n, |slot| {
            let coord = GridCoord::new(slot.col as i32, slot.row as i32);
            TerrainCell::create(slot, coord, origin, &config, &source)
        })?;

        let textures: Vec<TextureHandle> = config.textures.iter().cloned().map(TextureHandle).collect();
        for (_, cell) in cells.iter_mut() {
            cell.apply_textures(&textures, &source, &config)?;
        }

        let index = GridCoord::new(config.start_index, config.start_index);
        let viewer = Vec3::new(0.0, config.viewer_height, 0.0);
        Ok(Self {
            config,
            source,
            cells,
            center,
            visible_size,
            origin,
            viewer,
            index,
            stats: GridStats::default(),
        })
    }

    /// Evaluate the viewer position and stream in whatever it now needs.
    ///
    /// Each direction is checked once, in the order up, down, right, left,
    /// against the position left by the previous check. Returns the viewer
    /// position recentered by every move performed.
    pub fn tick(&mut self, viewer: Vec3) -> Result<TickReport, StreamError> {
        let _span = tracing::info_span!("grid_tick").entered();
        let start = Instant::now();
        let limit = self.config.cell_size as f32;
        self.viewer = viewer;

        let mut report = TickReport::default();
        let mut outcome = Ok(());
        for mv in [Move::Up, Move::Down, Move::Right, Move::Left] {
            if !mv.crossed(self.viewer, limit) {
                continue;
            }
            if let Err(err) = self.step(mv, &mut report) {
                tracing::error!(?mv, error = %err, "grid step failed");
                outcome = Err(err);
                break;
            }
        }
        report.viewer = self.viewer;

        self.stats.ticks += 1;
        self.stats.moves += report.moves.len() as u64;
        self.stats.skipped += report.skipped.len() as u64;
        self.stats.reloads += report.reloaded.len() as u64;
        self.stats.degraded += report.degraded.len() as u64;
        self.stats.last_tick_time = start.elapsed();
        if outcome.is_err() {
            self.stats.failed += 1;
        }
        outcome?;

        if !report.is_idle() {
            tracing::trace!(
                moves = report.moves.len(),
                skipped = report.skipped.len(),
                reloaded = report.reloaded.len(),
                "grid tick complete"
            );
        }
        Ok(report)
    }

    /// Perform one move if the index bounds allow it.
    ///
    /// Once admitted a move is always completed: the index stays advanced,
    /// every recycled cell gets a reload attempt and the viewer is
    /// recentered. A cell whose reload fails is left marked stale under its
    /// new coordinate, and the first such error is returned afterwards.
    pub fn step(&mut self, mv: Move, report: &mut TickReport) -> Result<(), StreamError> {
        if !self.admit(mv) {
            tracing::debug!(?mv, index = %self.index, "move outside authored bounds, skipped");
            report.skipped.push(mv);
            return Ok(());
        }

        let shift = mv.shift();
        let n = self.cells.n();
        let cell_size = self.config.cell_size as f32;
        let recycled = recycle(&mut self.cells, shift);
        tracing::debug!(?mv, ?shift, index = %self.index, "grid shifted");

        for (slot, cell) in self.cells.iter_mut() {
            let wrapped = recycled.contains(&slot);
            cell.surface_mut().translate(shift.translation(cell_size, n, wrapped));
        }

        let mut first_err = None;
        for &slot in &recycled {
            let cell = self.cells.get_mut(slot);
            let coord = cell.coord();
            match cell.reload(&self.source, &self.config) {
                Ok(ContentState::Fresh) => report.reloaded.push(coord),
                Ok(_) => report.degraded.push(coord),
                Err(err) => {
                    report.degraded.push(coord);
                    first_err.get_or_insert(err);
                }
            }
        }

        self.viewer -= mv.axis().unit() * (mv.sign() as f32 * cell_size);
        report.moves.push(mv);
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Bounds check on the tile index counters; advances the counter when
    /// the move is allowed.
    fn admit(&mut self, mv: Move) -> bool {
        let n = self.cells.n() as i32;
        let center = self.center as i32;
        let limit = self.config.index_limit;
        let axis = mv.axis();
        let counter = self.index.along(axis);
        let next = match mv {
            Move::Up | Move::Right => {
                if let (Move::Up, Some(rows)) = (mv, self.config.authored_rows) {
                    if counter >= rows - n + center - 1 {
                        return false;
                    }
                }
                if counter >= limit {
                    return false;
                }
                (counter + 1).min(limit)
            }
            Move::Down | Move::Left => {
                if counter <= center - 1 {
                    return false;
                }
                (counter - 1).max(0)
            }
        };
        self.index = self.index.offset(axis, next - counter);
        true
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn cells(&self) -> &SlotMatrix<TerrainCell<S>> {
        &self.cells
    }

    pub fn cell(&self, slot: SlotPos) -> &TerrainCell<S> {
        self.cells.get(slot)
    }

    /// Cell currently representing `coord`, if it is in the window.
    pub fn find(&self, coord: GridCoord) -> Option<&TerrainCell<S>> {
        self.cells.iter().map(|(_, c)| c).find(|c| c.coord() == coord)
    }

    pub fn cells_wide(&self) -> usize {
        self.cells.n()
    }

    pub fn center(&self) -> usize {
        self.center
    }

    pub fn visible_size(&self) -> f32 {
        self.visible_size
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Viewer position as of the last tick (or the start position).
    pub fn viewer(&self) -> Vec3 {
        self.viewer
    }

    /// Tile index counters `(x, y)` used for bounds checks.
    pub fn index(&self) -> GridCoord {
        self.index
    }

    pub fn stats(&self) -> &GridStats {
        &self.stats
    }
}
