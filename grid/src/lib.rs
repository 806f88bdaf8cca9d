#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative maze grid shared by every explorer.
//!
//! The grid is the only mutable state touched while solving. Each cell keeps
//! its raw status behind its own lock, so contention is cell-granular and an
//! explorer never needs more than one lock at a time. Once the grid has been
//! shared, [`Grid::claim_if_open`] and [`Grid::claim_with`] are the only
//! mutation paths, and both only ever move a cell from open to claimed.

#[cfg(feature = "claim_audit")]
mod audit;
mod parse;
mod snapshot;

use std::sync::{Mutex, MutexGuard, PoisonError};

use maze_solver_core::{CellStatus, ExplorerId, Position, OPEN, WALL};

#[cfg(feature = "claim_audit")]
pub use audit::ClaimRecord;
pub use parse::{parse, ParseError};
pub use snapshot::GridSnapshot;

/// Rectangular maze with one exclusive lock per cell.
#[derive(Debug)]
pub struct Grid {
    height: u32,
    width: u32,
    cells: Vec<Mutex<i32>>,
    #[cfg(feature = "claim_audit")]
    audit: audit::ClaimAudit,
}

impl Grid {
    /// Allocates a `height × width` grid where every cell is a wall.
    ///
    /// Generation starts from this state and carves passages into it.
    #[must_use]
    pub fn walled(height: u32, width: u32) -> Self {
        Self::from_raw_cells(height, width, vec![WALL; cell_count(height, width)])
    }

    /// Builds a grid from literal rows of raw statuses.
    ///
    /// Positive values are read as open cells: a grid built from a
    /// description never carries claims.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, ParseError>
    where
        R: AsRef<[i32]>,
    {
        parse::assemble(
            rows.iter()
                .enumerate()
                .map(|(index, row)| (index + 1, row.as_ref().to_vec())),
        )
    }

    pub(crate) fn from_raw_cells(height: u32, width: u32, cells: Vec<i32>) -> Self {
        debug_assert_eq!(cells.len(), cell_count(height, width));
        Self {
            height,
            width,
            cells: cells.into_iter().map(Mutex::new).collect(),
            #[cfg(feature = "claim_audit")]
            audit: audit::ClaimAudit::default(),
        }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Reports whether the position addresses a cell of this grid.
    #[must_use]
    pub const fn in_bounds(&self, position: Position) -> bool {
        position.row() < self.height && position.column() < self.width
    }

    /// Reads the status of a cell under its lock.
    ///
    /// Returns `None` for positions outside the grid.
    #[must_use]
    pub fn status_of(&self, position: Position) -> Option<CellStatus> {
        let cell = self.cell(position)?;
        let raw = *lock(cell);
        CellStatus::from_raw(raw)
    }

    /// Claims an open cell for `id`.
    ///
    /// Under the cell's lock, an open cell is set to `id` and `true` is
    /// returned. Walls, claimed cells and positions outside the grid are left
    /// untouched and yield `false`.
    pub fn claim_if_open(&self, position: Position, id: ExplorerId) -> bool {
        self.claim_with(position, || Some(id)).is_some()
    }

    /// Claims an open cell, drawing the identifier only once the cell has
    /// been observed open.
    ///
    /// `allocate` runs while the cell's lock is held and is never invoked for
    /// a cell that cannot be claimed, so no identifier is spent on a lost
    /// race. The cell stays open when `allocate` yields nothing or an
    /// identifier beyond [`ExplorerId::MAX`].
    pub fn claim_with<F>(&self, position: Position, allocate: F) -> Option<ExplorerId>
    where
        F: FnOnce() -> Option<ExplorerId>,
    {
        let cell = self.cell(position)?;
        let mut status = lock(cell);
        if *status != OPEN {
            return None;
        }

        let id = allocate()?;
        *status = CellStatus::Claimed(id).to_raw()?;
        #[cfg(feature = "claim_audit")]
        self.audit.record(position, id);
        Some(id)
    }

    /// Opens a wall cell. Returns `false` if the cell was not a wall.
    ///
    /// Requires exclusive access, so it is unavailable once the grid is
    /// shared with explorers.
    pub fn carve(&mut self, position: Position) -> bool {
        let Some(index) = self.index(position) else {
            return false;
        };
        let status = self.cells[index]
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if *status != WALL {
            return false;
        }
        *status = OPEN;
        true
    }

    /// Positions of every cell that is still open, in row-major order.
    #[must_use]
    pub fn open_cells(&self) -> Vec<Position> {
        self.positions()
            .filter(|&position| self.status_of(position) == Some(CellStatus::Open))
            .collect()
    }

    /// Captures a read-only copy of every cell status in row-major order.
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        let cells = self.cells.iter().map(|cell| *lock(cell)).collect();
        GridSnapshot::new(self.height, self.width, cells)
    }

    /// Every successful claim recorded since the grid was built.
    #[cfg(feature = "claim_audit")]
    #[must_use]
    pub fn claim_log(&self) -> Vec<ClaimRecord> {
        self.audit.records()
    }

    fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height)
            .flat_map(move |row| (0..self.width).map(move |column| Position::new(row, column)))
    }

    fn cell(&self, position: Position) -> Option<&Mutex<i32>> {
        self.index(position).and_then(|index| self.cells.get(index))
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.in_bounds(position) {
            return None;
        }
        let row = usize::try_from(position.row()).ok()?;
        let column = usize::try_from(position.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// A cell's status is a lone integer, so a poisoned lock still guards a
/// consistent value.
fn lock(cell: &Mutex<i32>) -> MutexGuard<'_, i32> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

fn cell_count(height: u32, width: u32) -> usize {
    let height = usize::try_from(height).unwrap_or(0);
    let width = usize::try_from(width).unwrap_or(0);
    height.checked_mul(width).unwrap_or(0)
}
