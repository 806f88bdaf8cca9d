//! Claim log compiled in with the `claim_audit` feature.

use std::sync::{Mutex, PoisonError};

use maze_solver_core::{ExplorerId, Position};

/// Successful claim observed by the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClaimRecord {
    /// Cell that was claimed.
    pub position: Position,
    /// Identifier written into the cell.
    pub id: ExplorerId,
}

#[derive(Debug, Default)]
pub(crate) struct ClaimAudit {
    records: Mutex<Vec<ClaimRecord>>,
}

impl ClaimAudit {
    /// Appends a claim. Called while the claimed cell's lock is held; this
    /// lock is always taken last.
    pub(crate) fn record(&self, position: Position, id: ExplorerId) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ClaimRecord { position, id });
    }

    pub(crate) fn records(&self) -> Vec<ClaimRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
