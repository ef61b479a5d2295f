//! Automatic rebase schedule.

use serde::{Deserialize, Serialize};

/// When and by how much the token rebases on its own.
///
/// Consulted at the top of every admitted transfer: if the schedule is due,
/// the stored delta is applied before the transfer amounts are evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebasePolicy {
    /// Automatic rebasing toggle.
    pub enabled: bool,
    /// Seconds between automatic rebases.
    pub period_secs: u64,
    /// Unix time at or after which the next automatic rebase fires.
    pub next_rebase_at: u64,
    /// Fragment delta applied by an automatic rebase.
    pub rebase_amount: i128,
}

impl RebasePolicy {
    pub fn new(enabled: bool, now: u64) -> Self {
        RebasePolicy {
            enabled,
            period_secs: 0,
            next_rebase_at: now,
            rebase_amount: 0,
        }
    }

    /// Whether an automatic rebase should fire at `now`.
    pub fn due(&self, now: u64) -> bool {
        self.enabled && now >= self.next_rebase_at
    }

    /// Re-arm the schedule after a fired rebase.
    ///
    /// The new deadline is anchored at `now`, not at the stale deadline, so
    /// a schedule that fell far behind fires once rather than repeatedly.
    pub fn advance(&mut self, now: u64) {
        self.next_rebase_at = now.saturating_add(self.period_secs);
    }

    /// Change the period and re-arm from `now`.
    pub fn change_rate(&mut self, now: u64, period_secs: u64) {
        self.period_secs = period_secs;
        self.next_rebase_at = now.saturating_add(period_secs);
    }
}
