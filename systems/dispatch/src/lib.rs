#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave dispatcher that drives explorers across a worker pool.
//!
//! Solving proceeds in waves. The first wave holds a single explorer on the
//! start cell. Every wave runs to completion on a bounded rayon pool; the
//! spawn requests its explorers emit become the next wave. The join at the
//! end of each wave is the only synchronisation besides the per-cell locks,
//! and a wave that emits nothing ends the solve.

use std::{
    mem,
    sync::atomic::{AtomicBool, AtomicU32, Ordering},
    time::Instant,
};

use maze_solver_core::{ExplorerId, ExplorerReport, IdSource, Position, SolveStats, SpawnRequest};
use maze_solver_grid::Grid;
use maze_solver_system_exploration::Explorer;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration parameters required to construct a solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    threads: Option<usize>,
    seed: Option<u64>,
}

impl Config {
    /// Creates a configuration.
    ///
    /// `threads` bounds the worker pool (`None` lets rayon pick one worker
    /// per logical CPU); `seed` makes the random start cell reproducible.
    #[must_use]
    pub const fn new(threads: Option<usize>, seed: Option<u64>) -> Self {
        Self { threads, seed }
    }

    /// Requested worker count, if bounded explicitly.
    #[must_use]
    pub const fn threads(&self) -> Option<usize> {
        self.threads
    }

    /// Seed used when picking a random start cell.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Errors reported while solving.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The grid has no open cell for the first explorer.
    #[error("the maze has no open cell to start from")]
    NoStartCell,
    /// The requested start cell is a wall, already claimed, or outside the grid.
    #[error("start cell {position:?} is not an open cell of the maze")]
    StartNotOpen {
        /// Requested start position.
        position: Position,
    },
    /// Every identifier up to [`ExplorerId::MAX`] was handed out, so some
    /// branches were left unexplored.
    #[error("ran out of explorer identifiers after {max}", max = ExplorerId::MAX.get())]
    IdsExhausted,
    /// The worker pool could not be created.
    #[error("failed to build the explorer worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Monotonic identifier counter shared by every explorer of one solve.
///
/// Stops at [`ExplorerId::MAX`] and remembers that a request was refused.
#[derive(Debug)]
struct IdCounter {
    next: AtomicU32,
    exhausted: AtomicBool,
}

impl IdCounter {
    fn starting_at(first: ExplorerId) -> Self {
        Self {
            next: AtomicU32::new(first.get()),
            exhausted: AtomicBool::new(false),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Relaxed)
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::starting_at(ExplorerId::FIRST)
    }
}

impl IdSource for IdCounter {
    fn next_id(&self) -> Option<ExplorerId> {
        let issued = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                (next <= ExplorerId::MAX.get()).then_some(next + 1)
            });
        match issued {
            Ok(value) => Some(ExplorerId::new(value)),
            Err(_) => {
                self.exhausted.store(true, Ordering::Relaxed);
                None
            }
        }
    }
}

/// Owns the identifier counter and worker pool for the duration of one solve.
#[derive(Debug)]
pub struct Dispatcher {
    ids: IdCounter,
    pool: ThreadPool,
}

impl Dispatcher {
    /// Creates a dispatcher with a fresh counter and a worker pool sized by
    /// `config`.
    pub fn new(config: &Config) -> Result<Self, SolveError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|index| format!("explorer-{index}"));
        if let Some(threads) = config.threads {
            builder = builder.num_threads(threads);
        }

        Ok(Self {
            ids: IdCounter::default(),
            pool: builder.build()?,
        })
    }

    /// Returns a fresh explorer identifier. The first call yields
    /// [`ExplorerId::FIRST`]; `None` once [`ExplorerId::MAX`] was handed out.
    pub fn next_id(&self) -> Option<ExplorerId> {
        self.ids.next_id()
    }

    /// Claims `start` for the first explorer and runs waves until one of
    /// them emits no spawn requests.
    ///
    /// Fails with [`SolveError::IdsExhausted`] if any branch could not get an
    /// identifier.
    pub fn run(self, grid: &Grid, start: Position) -> Result<SolveStats, SolveError> {
        let started = Instant::now();
        let id = self.next_id().ok_or(SolveError::IdsExhausted)?;
        if !grid.claim_if_open(start, id) {
            return Err(SolveError::StartNotOpen { position: start });
        }

        let mut wave = vec![SpawnRequest {
            parent: None,
            id,
            start,
        }];
        let mut reports = Vec::new();
        let mut waves = 0_u32;

        while !wave.is_empty() {
            waves += 1;
            let launched = wave.len();
            let outcomes = self.run_wave(grid, mem::take(&mut wave));

            for (report, spawned) in outcomes {
                reports.push(report);
                wave.extend(spawned);
            }
            debug!(
                wave = waves,
                launched,
                spawned = wave.len(),
                "wave joined"
            );
        }

        if self.ids.is_exhausted() {
            return Err(SolveError::IdsExhausted);
        }

        let stats = SolveStats::new(start, waves, started.elapsed(), reports);
        info!(
            explorers = stats.total_explorers(),
            waves = stats.waves,
            elapsed_us = stats.elapsed.as_micros(),
            "maze solved"
        );
        Ok(stats)
    }

    /// Runs every explorer of the wave on the pool and waits for all of them.
    fn run_wave(
        &self,
        grid: &Grid,
        wave: Vec<SpawnRequest>,
    ) -> Vec<(ExplorerReport, Vec<SpawnRequest>)> {
        let ids = &self.ids;
        self.pool.install(|| {
            wave.into_par_iter()
                .map(|request| {
                    let mut spawned = Vec::new();
                    let report = Explorer::new(request).run(grid, ids, &mut spawned);
                    (report, spawned)
                })
                .collect()
        })
    }
}

/// Entry point that picks start cells and hands grids to a [`Dispatcher`].
#[derive(Debug)]
pub struct Solver {
    config: Config,
    rng: ChaCha8Rng,
}

impl Solver {
    /// Creates a solver using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Solves the maze from a randomly chosen open cell.
    pub fn solve(&mut self, grid: Grid) -> Result<(Grid, SolveStats), SolveError> {
        let start = *grid
            .open_cells()
            .choose(&mut self.rng)
            .ok_or(SolveError::NoStartCell)?;
        self.solve_from(grid, start)
    }

    /// Solves the maze from the provided start cell.
    pub fn solve_from(
        &self,
        grid: Grid,
        start: Position,
    ) -> Result<(Grid, SolveStats), SolveError> {
        let dispatcher = Dispatcher::new(&self.config)?;
        let stats = dispatcher.run(&grid, start)?;
        Ok((grid, stats))
    }
}

/// Solves the maze from a random open cell with the default configuration.
pub fn solve(grid: Grid) -> Result<(Grid, SolveStats), SolveError> {
    Solver::new(Config::default()).solve(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_exposes_its_parameters() {
        let config = Config::new(Some(3), Some(99));
        assert_eq!(config.threads(), Some(3));
        assert_eq!(config.seed(), Some(99));
        assert_eq!(Config::default().threads(), None);
        assert_eq!(Config::default().seed(), None);
    }

    #[test]
    fn identifiers_start_at_one_and_increase() {
        let dispatcher = Dispatcher::new(&Config::new(Some(1), None)).expect("pool");
        assert_eq!(dispatcher.next_id(), Some(ExplorerId::FIRST));
        assert_eq!(dispatcher.next_id(), Some(ExplorerId::new(2)));
        assert_eq!(dispatcher.next_id(), Some(ExplorerId::new(3)));
    }

    #[test]
    fn counter_stops_at_the_largest_marker() {
        let ids = IdCounter::starting_at(ExplorerId::new(ExplorerId::MAX.get() - 1));
        assert_eq!(ids.next_id(), Some(ExplorerId::new(ExplorerId::MAX.get() - 1)));
        assert_eq!(ids.next_id(), Some(ExplorerId::MAX));
        assert!(!ids.is_exhausted());
        assert_eq!(ids.next_id(), None);
        assert_eq!(ids.next_id(), None);
        assert!(ids.is_exhausted());
    }

    #[test]
    fn running_out_of_identifiers_fails_the_solve() {
        let grid = Grid::from_rows(&[
            [-1, -1, -1, -1, -1],
            [-1, -1, 0, -1, -1],
            [-1, 0, 0, 0, -1],
            [-1, -1, 0, -1, -1],
            [-1, -1, -1, -1, -1],
        ])
        .expect("rows");
        let dispatcher = Dispatcher {
            ids: IdCounter::starting_at(ExplorerId::new(ExplorerId::MAX.get() - 1)),
            pool: ThreadPoolBuilder::new().num_threads(1).build().expect("pool"),
        };

        let error = dispatcher
            .run(&grid, Position::new(2, 2))
            .expect_err("three branches need more identifiers than remain");
        assert!(matches!(error, SolveError::IdsExhausted));
        assert_eq!(grid.snapshot().open_count(), 2);
    }

    #[test]
    fn wall_start_is_rejected() {
        let grid = Grid::from_rows(&[[-1, 0, -1]]).expect("rows");
        let dispatcher = Dispatcher::new(&Config::new(Some(1), None)).expect("pool");

        let error = dispatcher
            .run(&grid, Position::new(0, 0))
            .expect_err("wall start");
        assert!(matches!(error, SolveError::StartNotOpen { .. }));
    }
}
