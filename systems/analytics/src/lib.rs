#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Statistics collected from a finished solve.
//!
//! The analytics system is a pure reader: it summarises the explorer reports
//! returned by the dispatcher and cross-checks them against the final grid.

use std::{collections::BTreeMap, fmt, time::Duration};

use maze_solver_core::{CellStatus, ExplorerId, SolveStats};
use maze_solver_grid::GridSnapshot;
use serde::Serialize;
use thiserror::Error;

/// Number of children spawned by one explorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChildCount {
    /// Explorer the count belongs to.
    pub id: ExplorerId,
    /// Spawn requests the explorer emitted.
    pub children: u32,
}

/// Aggregated solve statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    explorers: usize,
    control_sum: usize,
    waves: u32,
    longest_walk: Option<(ExplorerId, u32)>,
    elapsed: Duration,
    children: Vec<ChildCount>,
}

impl StatsReport {
    /// Summarises the explorer reports of a solve.
    #[must_use]
    pub fn from_stats(stats: &SolveStats) -> Self {
        let children: Vec<ChildCount> = stats
            .reports()
            .iter()
            .map(|report| ChildCount {
                id: report.id,
                children: report.children,
            })
            .collect();
        let spawned: usize = children
            .iter()
            .map(|count| count.children as usize)
            .sum();
        let longest_walk = stats
            .reports()
            .iter()
            .max_by_key(|report| (report.cells_claimed, std::cmp::Reverse(report.id)))
            .map(|report| (report.id, report.cells_claimed));

        Self {
            explorers: stats.total_explorers(),
            control_sum: spawned + 1,
            waves: stats.waves,
            longest_walk,
            elapsed: stats.elapsed,
            children,
        }
    }

    /// Total number of explorers that ran.
    #[must_use]
    pub const fn explorers(&self) -> usize {
        self.explorers
    }

    /// One plus the sum of every explorer's children.
    #[must_use]
    pub const fn control_sum(&self) -> usize {
        self.control_sum
    }

    /// Number of waves the dispatcher launched.
    #[must_use]
    pub const fn waves(&self) -> u32 {
        self.waves
    }

    /// Explorer that claimed the most cells, with its cell count.
    #[must_use]
    pub const fn longest_walk(&self) -> Option<(ExplorerId, u32)> {
        self.longest_walk
    }

    /// Per-explorer child counts in identifier order.
    #[must_use]
    pub fn children(&self) -> &[ChildCount] {
        &self.children
    }

    /// Reports whether every explorer except the first was spawned by
    /// another explorer.
    #[must_use]
    pub const fn is_conserved(&self) -> bool {
        self.control_sum == self.explorers
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Explorers spawned: {}", self.explorers)?;
        for count in &self.children {
            writeln!(
                f,
                "Explorer {} had {} children",
                count.id.get(),
                count.children
            )?;
        }
        writeln!(f, "Control sum: {}", self.control_sum)?;
        writeln!(f, "Waves: {}", self.waves)?;
        if let Some((id, cells)) = self.longest_walk {
            writeln!(f, "Longest walk: explorer {} claimed {cells} cells", id.get())?;
        }
        write!(f, "Elapsed: {:?}", self.elapsed)
    }
}

/// Inconsistencies between a solve's reports and its final grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuditError {
    /// Explorer count and spawned children disagree.
    #[error("{explorers} explorers ran but the control sum is {control_sum}")]
    ConservationViolated {
        /// Explorers that reported.
        explorers: usize,
        /// One plus the children they reported.
        control_sum: usize,
    },
    /// Open cells remain after the solve.
    #[error("{count} open cells were never claimed")]
    Unclaimed {
        /// Number of cells still open.
        count: usize,
    },
    /// A reporting explorer owns no cell of the grid.
    #[error("explorer {} owns no cell", id.get())]
    Ownerless {
        /// Explorer without a cell.
        id: ExplorerId,
    },
    /// Reported cell counts do not add up to the claimed cells of the grid.
    #[error("explorers report {reported} claimed cells but the grid holds {claimed}")]
    CellCountMismatch {
        /// Sum of per-explorer cell counts.
        reported: u64,
        /// Claimed cells found in the grid.
        claimed: u64,
    },
}

/// Cross-checks a solve against the grid it produced.
///
/// Verifies the conservation law, that no open cell survived, that every
/// explorer owns at least one cell and that the per-explorer cell counts
/// add up to the claimed cells of the grid.
pub fn audit(stats: &SolveStats, grid: &GridSnapshot) -> Result<StatsReport, AuditError> {
    let report = StatsReport::from_stats(stats);
    if !report.is_conserved() {
        return Err(AuditError::ConservationViolated {
            explorers: report.explorers,
            control_sum: report.control_sum,
        });
    }

    let open = grid.open_count();
    if open > 0 {
        return Err(AuditError::Unclaimed { count: open });
    }

    let mut owned = BTreeMap::new();
    for &raw in grid.cells() {
        if let Some(CellStatus::Claimed(id)) = CellStatus::from_raw(raw) {
            *owned.entry(id).or_insert(0_u64) += 1;
        }
    }

    for explorer in stats.reports() {
        if !owned.contains_key(&explorer.id) {
            return Err(AuditError::Ownerless { id: explorer.id });
        }
    }

    let reported: u64 = stats
        .reports()
        .iter()
        .map(|explorer| u64::from(explorer.cells_claimed))
        .sum();
    let claimed: u64 = owned.values().sum();
    if reported != claimed {
        return Err(AuditError::CellCountMismatch { reported, claimed });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_solver_core::{ExplorerReport, Position};

    fn report(id: u32, cells_claimed: u32, children: u32) -> ExplorerReport {
        ExplorerReport {
            id: ExplorerId::new(id),
            parent: None,
            start: Position::new(1, 1),
            finish: Position::new(1, 1),
            cells_claimed,
            children,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn control_sum_counts_the_first_explorer() {
        let stats = SolveStats::new(
            Position::new(1, 1),
            2,
            Duration::ZERO,
            vec![report(1, 4, 2), report(2, 1, 0), report(3, 6, 0)],
        );

        let summary = StatsReport::from_stats(&stats);
        assert_eq!(summary.explorers(), 3);
        assert_eq!(summary.control_sum(), 3);
        assert_eq!(summary.waves(), 2);
        assert!(summary.is_conserved());
        assert_eq!(summary.longest_walk(), Some((ExplorerId::new(3), 6)));
    }

    #[test]
    fn missing_spawns_break_conservation() {
        let stats = SolveStats::new(
            Position::new(1, 1),
            1,
            Duration::ZERO,
            vec![report(1, 4, 0), report(2, 1, 0)],
        );
        assert!(!StatsReport::from_stats(&stats).is_conserved());
    }

    #[test]
    fn display_lists_children_and_control_sum() {
        let stats = SolveStats::new(
            Position::new(1, 1),
            2,
            Duration::ZERO,
            vec![report(1, 4, 1), report(2, 1, 0)],
        );

        let text = StatsReport::from_stats(&stats).to_string();
        assert!(text.starts_with("Explorers spawned: 2\n"));
        assert!(text.contains("Explorer 1 had 1 children\n"));
        assert!(text.contains("Explorer 2 had 0 children\n"));
        assert!(text.contains("Control sum: 2\n"));
    }
}
