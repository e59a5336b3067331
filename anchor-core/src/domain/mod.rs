//! Pure bridge logic: no I/O, no clocks.

pub mod anchor_rule;
pub mod digest;
pub mod proposal;
pub mod quorum;
pub mod recovery;
pub mod roster;
pub mod settings;
pub mod signature;

pub use anchor_rule::{check_anchor, next_anchor_height, AnchorObservation, AnchorRejection};
pub use proposal::{
    AnchorProposal, Approval, Direction, OracleProposal, SettingChange, SettingProposal, TempoKind, TempoProposal,
    ValidatorSetProposal,
};
pub use quorum::{aggregate, has_majority, quorum_size, QuorumResult};
pub use recovery::{recovery_for, short_backoff, RecoveryAction};
pub use roster::{RosterEntry, ValidatorRoster};
pub use settings::{check_setting, OracleSettings, SettingRejection};
pub use signature::{DigestSigner, EcdsaSigner};
