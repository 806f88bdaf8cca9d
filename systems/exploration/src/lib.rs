#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Explorer walk: the unit of concurrent work while solving a maze.
//!
//! An explorer starts on a cell that is already claimed in its name. Each
//! step it tries to claim all four neighbors in [`Direction::ALL`] order.
//! The first neighbor it wins becomes its next position; every further
//! neighbor it wins is claimed under a fresh identifier and handed back to
//! the caller as a [`SpawnRequest`]. When no neighbor can be claimed the walk
//! is over. Explorers never launch work themselves.

use std::time::{Duration, Instant};

use maze_solver_core::{Direction, ExplorerId, ExplorerReport, IdSource, Position, SpawnRequest};
use maze_solver_grid::Grid;
use tracing::trace;

/// Lifecycle of an explorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// The explorer still has a cell to move into.
    Walking,
    /// The last step found no claimable neighbor.
    Done,
}

/// Single explorer walking the maze from a pre-claimed start cell.
#[derive(Debug)]
pub struct Explorer {
    id: ExplorerId,
    parent: Option<ExplorerId>,
    start: Position,
    position: Position,
    cells_claimed: u32,
    children: u32,
    state: State,
}

impl Explorer {
    /// Creates an explorer for a spawn request whose start cell is already
    /// claimed with the request's identifier.
    #[must_use]
    pub fn new(request: SpawnRequest) -> Self {
        Self {
            id: request.id,
            parent: request.parent,
            start: request.start,
            position: request.start,
            cells_claimed: 1,
            children: 0,
            state: State::Walking,
        }
    }

    /// Identifier written into every cell this explorer walks.
    #[must_use]
    pub const fn id(&self) -> ExplorerId {
        self.id
    }

    /// Cell the explorer currently stands on.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Performs one claim pass around the current cell.
    ///
    /// Returns the direction moved in, or `None` once the explorer is done.
    /// Spawn requests for additional branches are appended to `out`.
    pub fn step<I>(
        &mut self,
        grid: &Grid,
        ids: &I,
        out: &mut Vec<SpawnRequest>,
    ) -> Option<Direction>
    where
        I: IdSource + ?Sized,
    {
        if self.state == State::Done {
            return None;
        }

        let mut heading = None;
        for direction in Direction::ALL {
            let Some(neighbor) = self.position.neighbor(direction) else {
                continue;
            };

            if heading.is_none() {
                if grid.claim_if_open(neighbor, self.id) {
                    heading = Some((direction, neighbor));
                }
            } else if let Some(id) = grid.claim_with(neighbor, || ids.next_id()) {
                self.children += 1;
                out.push(SpawnRequest {
                    parent: Some(self.id),
                    id,
                    start: neighbor,
                });
            }
        }

        match heading {
            Some((direction, neighbor)) => {
                self.position = neighbor;
                self.cells_claimed += 1;
                Some(direction)
            }
            None => {
                self.state = State::Done;
                None
            }
        }
    }

    /// Walks until a dead end and reports the explorer's counters.
    pub fn run<I>(mut self, grid: &Grid, ids: &I, out: &mut Vec<SpawnRequest>) -> ExplorerReport
    where
        I: IdSource + ?Sized,
    {
        let started = Instant::now();
        while self.step(grid, ids, out).is_some() {}
        let report = self.into_report(started.elapsed());

        trace!(
            id = report.id.get(),
            cells = report.cells_claimed,
            children = report.children,
            "explorer finished"
        );
        report
    }

    fn into_report(self, elapsed: Duration) -> ExplorerReport {
        ExplorerReport {
            id: self.id,
            parent: self.parent,
            start: self.start,
            finish: self.position,
            cells_claimed: self.cells_claimed,
            children: self.children,
            elapsed,
        }
    }
}

