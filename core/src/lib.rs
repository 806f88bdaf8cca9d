#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the maze solver.
//!
//! This crate defines the vocabulary that connects the grid, the generator,
//! the explorers and the dispatcher. The grid stores [`CellStatus`] values
//! addressed by [`Position`], explorers walk in a fixed [`Direction`] order
//! and hand freshly claimed cells back to the dispatcher as
//! [`SpawnRequest`] values, and every finished explorer publishes an
//! [`ExplorerReport`] that the analytics system aggregates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Raw status stored for a wall cell.
pub const WALL: i32 = -1;

/// Raw status stored for an open, unclaimed cell.
pub const OPEN: i32 = 0;

/// Cardinal directions an explorer may step in.
///
/// [`Direction::ALL`] is the canonical exploration order. The first
/// direction in this order that an explorer manages to claim is the one it
/// walks itself; every later success is handed off as a new explorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in canonical exploration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: u32,
    column: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Returns the adjacent position in the provided direction.
    ///
    /// Yields `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are the grid's concern.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<Position> {
        self.step(direction, 1)
    }

    /// Returns the position `distance` cells away in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction, distance: u32) -> Option<Position> {
        match direction {
            Direction::Up => self
                .row
                .checked_sub(distance)
                .map(|row| Position::new(row, self.column)),
            Direction::Down => self
                .row
                .checked_add(distance)
                .map(|row| Position::new(row, self.column)),
            Direction::Left => self
                .column
                .checked_sub(distance)
                .map(|column| Position::new(self.row, column)),
            Direction::Right => self
                .column
                .checked_add(distance)
                .map(|column| Position::new(self.row, column)),
        }
    }
}

/// Unique identifier assigned to an explorer.
///
/// Identifiers start at one and double as the claim marker written into the
/// grid, so a value of zero is never handed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExplorerId(u32);

impl ExplorerId {
    /// Identifier handed to the explorer that starts every solve.
    pub const FIRST: ExplorerId = ExplorerId(1);

    /// Largest identifier that still fits the grid's claim marker.
    pub const MAX: ExplorerId = ExplorerId(i32::MAX as u32);

    /// Creates a new explorer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Decoded contents of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellStatus {
    /// Impassable cell fixed at generation time.
    Wall,
    /// Passable cell that no explorer has claimed yet.
    Open,
    /// Passable cell owned by the identified explorer.
    Claimed(ExplorerId),
}

impl CellStatus {
    /// Decodes a raw status value.
    ///
    /// Returns `None` for negative values other than [`WALL`] and for
    /// positive values that do not fit an [`ExplorerId`].
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            WALL => Some(Self::Wall),
            OPEN => Some(Self::Open),
            positive if positive > 0 => u32::try_from(positive)
                .ok()
                .map(|value| Self::Claimed(ExplorerId::new(value))),
            _ => None,
        }
    }

    /// Encodes the status into the raw integer stored by the grid.
    ///
    /// Returns `None` for identifiers beyond [`ExplorerId::MAX`].
    #[must_use]
    pub fn to_raw(self) -> Option<i32> {
        match self {
            Self::Wall => Some(WALL),
            Self::Open => Some(OPEN),
            Self::Claimed(id) => i32::try_from(id.get()).ok(),
        }
    }

    /// Reports whether the cell can be walked through.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

/// Request to launch a new explorer on a cell that has already been claimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// Explorer that discovered the branch, or `None` for the initial request.
    pub parent: Option<ExplorerId>,
    /// Identifier already written into the start cell.
    pub id: ExplorerId,
    /// Pre-claimed cell the new explorer starts from.
    pub start: Position,
}

/// Counters published by an explorer once its walk ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerReport {
    /// Identifier of the explorer.
    pub id: ExplorerId,
    /// Explorer that requested this one, if any.
    pub parent: Option<ExplorerId>,
    /// Cell the explorer started from.
    pub start: Position,
    /// Cell where the walk reached a dead end.
    pub finish: Position,
    /// Cells owned by the explorer, including its start cell.
    pub cells_claimed: u32,
    /// Spawn requests emitted while walking.
    pub children: u32,
    /// Wall-clock time spent walking.
    pub elapsed: Duration,
}

/// Outcome of a complete solve: every explorer report plus wave bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Cell the first explorer started from.
    pub start: Position,
    /// Number of waves launched, including the final one that spawned nothing.
    pub waves: u32,
    /// Wall-clock time from the first claim to the last join.
    pub elapsed: Duration,
    reports: Vec<ExplorerReport>,
}

impl SolveStats {
    /// Creates solve statistics, ordering the reports by explorer identifier.
    #[must_use]
    pub fn new(
        start: Position,
        waves: u32,
        elapsed: Duration,
        mut reports: Vec<ExplorerReport>,
    ) -> Self {
        reports.sort_by_key(|report| report.id);
        Self {
            start,
            waves,
            elapsed,
            reports,
        }
    }

    /// Reports of every explorer, in identifier order.
    #[must_use]
    pub fn reports(&self) -> &[ExplorerReport] {
        &self.reports
    }

    /// Number of explorers that ran.
    #[must_use]
    pub fn total_explorers(&self) -> usize {
        self.reports.len()
    }
}

/// Source of fresh explorer identifiers shared by every running explorer.
pub trait IdSource: Sync {
    /// Returns a fresh identifier, strictly greater than every previous one,
    /// or `None` once no identifier up to [`ExplorerId::MAX`] is left.
    fn next_id(&self) -> Option<ExplorerId>;
}

#[cfg(test)]
mod tests {
    use super::{
        CellStatus, Direction, ExplorerId, ExplorerReport, Position, SolveStats, SpawnRequest,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    #[test]
    fn neighbor_follows_direction_axes() {
        let origin = Position::new(3, 5);
        assert_eq!(origin.neighbor(Direction::Up), Some(Position::new(2, 5)));
        assert_eq!(origin.neighbor(Direction::Down), Some(Position::new(4, 5)));
        assert_eq!(origin.neighbor(Direction::Left), Some(Position::new(3, 4)));
        assert_eq!(origin.neighbor(Direction::Right), Some(Position::new(3, 6)));
    }

    #[test]
    fn neighbor_rejects_negative_coordinates() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.neighbor(Direction::Up), None);
        assert_eq!(corner.neighbor(Direction::Left), None);
        assert_eq!(Position::new(1, 1).step(Direction::Up, 2), None);
    }

    #[test]
    fn raw_status_decoding_matches_grid_encoding() {
        assert_eq!(CellStatus::from_raw(-1), Some(CellStatus::Wall));
        assert_eq!(CellStatus::from_raw(0), Some(CellStatus::Open));
        assert_eq!(
            CellStatus::from_raw(7),
            Some(CellStatus::Claimed(ExplorerId::new(7)))
        );
        assert_eq!(CellStatus::from_raw(-2), None);
        assert_eq!(CellStatus::Claimed(ExplorerId::new(9)).to_raw(), Some(9));
        assert!(!CellStatus::Wall.is_passable());
        assert!(CellStatus::Open.is_passable());
    }

    #[test]
    fn identifiers_past_the_marker_range_cannot_be_encoded() {
        assert_eq!(
            CellStatus::Claimed(ExplorerId::MAX).to_raw(),
            Some(i32::MAX)
        );
        let overflow = ExplorerId::new(ExplorerId::MAX.get() + 1);
        assert_eq!(CellStatus::Claimed(overflow).to_raw(), None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn spawn_request_round_trips_through_bincode() {
        assert_round_trip(&SpawnRequest {
            parent: Some(ExplorerId::new(3)),
            id: ExplorerId::new(11),
            start: Position::new(4, 9),
        });
    }

    fn report(id: u32, children: u32) -> ExplorerReport {
        ExplorerReport {
            id: ExplorerId::new(id),
            parent: None,
            start: Position::new(1, 1),
            finish: Position::new(1, 7),
            cells_claimed: 7,
            children,
            elapsed: Duration::from_micros(42),
        }
    }

    #[test]
    fn explorer_report_round_trips_through_bincode() {
        assert_round_trip(&report(1, 2));
    }

    #[test]
    fn solve_stats_orders_reports_by_id() {
        let stats = SolveStats::new(
            Position::new(1, 1),
            2,
            Duration::from_millis(1),
            vec![report(3, 0), report(1, 2), report(2, 0)],
        );

        let ids: Vec<u32> = stats.reports().iter().map(|report| report.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(stats.total_explorers(), 3);
        assert_round_trip(&stats);
    }
}
