//! Maps failure kinds to what the proposer does next.

use crate::foundation::{FailureKind, BACKOFF_DIVISOR, MIN_BACKOFF_MS};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Short wait, then retry the same cycle from the top.
    Backoff(Duration),
    /// Wait out a fraction of the anchoring period before asking validators again.
    Cooldown(Duration),
    /// The submission was rejected or lost a race. Pause, then re-read chain
    /// state from the top.
    RestartCycle(Duration),
    /// Stop the task; nothing a retry can fix.
    Abort,
}

/// `t_anchor / 10` blocks of wall time, floored at [`MIN_BACKOFF_MS`].
pub fn short_backoff(t_anchor: u64, block_time_ms: u64) -> Duration {
    let blocks = t_anchor / BACKOFF_DIVISOR;
    let millis = blocks.saturating_mul(block_time_ms).max(MIN_BACKOFF_MS);
    Duration::from_millis(millis)
}

pub fn recovery_for(kind: FailureKind, t_anchor: u64, block_time_ms: u64) -> RecoveryAction {
    match kind {
        FailureKind::Transient | FailureKind::Rejected => RecoveryAction::Backoff(short_backoff(t_anchor, block_time_ms)),
        FailureKind::QuorumFailure => RecoveryAction::Cooldown(short_backoff(t_anchor, block_time_ms)),
        FailureKind::StaleState => RecoveryAction::RestartCycle(short_backoff(t_anchor, block_time_ms)),
        FailureKind::Fatal => RecoveryAction::Abort,
    }
}
