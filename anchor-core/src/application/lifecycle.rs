use crate::domain::{Direction, SettingChange};
use crate::foundation::TxId;
use std::fmt;

/// Where a proposer task currently is in its anchoring cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorState {
    Idle,
    AwaitingAnchorHeight,
    GatheringSignatures,
    SubmittingAnchor,
    CoolingDown,
}

impl AnchorState {
    pub fn as_str(self) -> &'static str {
        match self {
            AnchorState::Idle => "idle",
            AnchorState::AwaitingAnchorHeight => "awaiting_anchor_height",
            AnchorState::GatheringSignatures => "gathering_signatures",
            AnchorState::SubmittingAnchor => "submitting_anchor",
            AnchorState::CoolingDown => "cooling_down",
        }
    }
}

impl fmt::Display for AnchorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hooks for metrics and tests. Every method defaults to a no-op.
pub trait ProposerObserver: Send + Sync {
    fn on_state_changed(&self, _direction: Direction, _from: AnchorState, _to: AnchorState) {}
    fn on_anchor_submitted(&self, _direction: Direction, _height: u64, _tx_id: &TxId) {}
    fn on_anchor_failed(&self, _direction: Direction, _reason: &str) {}
    fn on_quorum_failure(&self, _direction: Direction) {}
    fn on_race_lost(&self, _direction: Direction, _height: u64) {}
    fn on_settings_updated(&self, _direction: Direction, _change: &SettingChange) {}
}

pub struct NoopObserver;

impl ProposerObserver for NoopObserver {}
