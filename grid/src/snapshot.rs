//! Read-only copy of a grid used by analytics and exporters.

use std::fmt;

use maze_solver_core::{CellStatus, ExplorerId, Position, OPEN};
use serde::{Deserialize, Serialize};

/// Raw cell statuses captured from a [`Grid`](crate::Grid) in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    height: u32,
    width: u32,
    cells: Vec<i32>,
}

impl GridSnapshot {
    pub(crate) fn new(height: u32, width: u32, cells: Vec<i32>) -> Self {
        Self {
            height,
            width,
            cells,
        }
    }

    /// Number of rows captured.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of columns captured.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Raw statuses in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    /// Iterator over the rows of raw statuses, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        let width = usize::try_from(self.width).unwrap_or(0).max(1);
        self.cells.chunks(width)
    }

    /// Decoded status of the cell at `position`, if it lies inside the grid.
    #[must_use]
    pub fn status(&self, position: Position) -> Option<CellStatus> {
        if position.row() >= self.height || position.column() >= self.width {
            return None;
        }
        let row = usize::try_from(position.row()).ok()?;
        let column = usize::try_from(position.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        let raw = *self.cells.get(row.checked_mul(width)?.checked_add(column)?)?;
        CellStatus::from_raw(raw)
    }

    /// Number of cells that are not walls.
    #[must_use]
    pub fn passable_count(&self) -> usize {
        self.cells.iter().filter(|&&raw| raw >= OPEN).count()
    }

    /// Number of cells still open.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|&&raw| raw == OPEN).count()
    }

    /// Highest explorer identifier found in the grid.
    #[must_use]
    pub fn max_id(&self) -> Option<ExplorerId> {
        self.cells
            .iter()
            .filter_map(|&raw| match CellStatus::from_raw(raw) {
                Some(CellStatus::Claimed(id)) => Some(id),
                _ => None,
            })
            .max()
    }
}

/// Board dump with every status right-aligned in a three-character column.
impl fmt::Display for GridSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for raw in row {
                write!(f, "{raw:>3}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
