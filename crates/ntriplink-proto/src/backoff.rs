//! Reconnect backoff schedule.
//!
//! Maps a connection attempt count to the delay observed before the next
//! connect. The table is clamped at its last entry, so the delay is
//! monotonic non-decreasing by construction and the client can retry forever
//! without a reconnect storm. The table length doubles as the attempt cap
//! for one activation cycle.

use crate::constants::DEFAULT_BACKOFF_MS;

/// An attempt-indexed delay table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule {
    table_ms: Vec<u64>,
}

impl BackoffSchedule {
    /// Build a schedule from a delay table in milliseconds.
    ///
    /// An empty table degenerates to a single zero-delay entry so that
    /// `delay_for` stays total.
    pub fn new(table_ms: Vec<u64>) -> Self {
        let table_ms = if table_ms.is_empty() {
            vec![0]
        } else {
            table_ms
        };
        Self { table_ms }
    }

    /// Delay before connection attempt number `attempt` (zero-based),
    /// clamped to the last table entry.
    pub fn delay_for(&self, attempt: u32) -> u64 {
        let index = (attempt as usize).min(self.table_ms.len() - 1);
        self.table_ms[index]
    }

    /// Number of attempts allowed per activation cycle.
    pub fn attempt_limit(&self) -> u32 {
        self.table_ms.len() as u32
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_MS.to_vec())
    }
}
