#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomized backtracking maze generation.
//!
//! Mazes are laid out on odd/even coordinates: walls sit on even indices and
//! passages on odd ones, so every carve step opens the wall between two
//! passage cells. The carving is a full depth-first backtracker: at every
//! passage cell all four directions are attempted in a freshly shuffled
//! order before the walk backs up, which carves the whole grid into a single
//! spanning tree. Frames live on a heap stack so maze size is not bounded by
//! the call stack.

use maze_solver_core::{CellStatus, Direction, Position};
use maze_solver_grid::Grid;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::debug;

/// Passage cell where carving begins.
const SEED_CELL: Position = Position::new(1, 1);
/// Smallest extent that leaves room for a bordered passage cell.
const MIN_EXTENT: u32 = 3;

/// Configuration parameters required to construct the generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    seed: Option<u64>,
}

impl Config {
    /// Creates a configuration that draws from the provided seed, or from OS
    /// entropy when `seed` is `None`.
    #[must_use]
    pub const fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// Seed used for reproducible generation, if any.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Errors reported by the generator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The requested grid cannot hold a bordered passage cell.
    #[error("a {height}x{width} grid is too small to carve; both sides must be at least 3")]
    TooSmall {
        /// Requested number of rows.
        height: u32,
        /// Requested number of columns.
        width: u32,
    },
}

/// Single-threaded maze generator.
#[derive(Debug)]
pub struct Generator {
    rng: ChaCha8Rng,
}

impl Generator {
    /// Creates a generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }

    /// Allocates a fresh `height × width` grid and carves a perfect maze into it.
    ///
    /// Every open cell of the result is reachable from every other open cell
    /// along exactly one simple path. Grids with an even extent keep their
    /// last row or column as solid wall.
    pub fn generate(&mut self, height: u32, width: u32) -> Result<Grid, GenerationError> {
        if height < MIN_EXTENT || width < MIN_EXTENT {
            return Err(GenerationError::TooSmall { height, width });
        }

        let mut grid = Grid::walled(height, width);
        let _ = grid.carve(SEED_CELL);

        let mut stack = vec![Frame::new(SEED_CELL, self.shuffled_directions())];
        while let Some(frame) = stack.last_mut() {
            let next = frame.order.get(frame.next).copied();
            frame.next += 1;
            let cell = frame.cell;

            let Some(direction) = next else {
                let _ = stack.pop();
                continue;
            };

            let (Some(passage), Some(destination)) =
                (cell.step(direction, 1), cell.step(direction, 2))
            else {
                continue;
            };

            if !is_interior(destination, height, width)
                || grid.status_of(destination) != Some(CellStatus::Wall)
            {
                continue;
            }

            let _ = grid.carve(passage);
            let _ = grid.carve(destination);
            stack.push(Frame::new(destination, self.shuffled_directions()));
        }

        debug!(
            height,
            width,
            open_cells = grid.open_cells().len(),
            "carved maze"
        );
        Ok(grid)
    }

    fn shuffled_directions(&mut self) -> [Direction; 4] {
        let mut order = Direction::ALL;
        order.shuffle(&mut self.rng);
        order
    }
}

/// Generates a maze using OS entropy.
pub fn generate(height: u32, width: u32) -> Result<Grid, GenerationError> {
    Generator::new(Config::default()).generate(height, width)
}

/// Backtracking frame: a carved cell and the directions it has yet to try.
#[derive(Debug)]
struct Frame {
    cell: Position,
    order: [Direction; 4],
    next: usize,
}

impl Frame {
    fn new(cell: Position, order: [Direction; 4]) -> Self {
        Self {
            cell,
            order,
            next: 0,
        }
    }
}

fn is_interior(position: Position, height: u32, width: u32) -> bool {
    position.row() > 0
        && position.row() < height - 1
        && position.column() > 0
        && position.column() < width - 1
}
