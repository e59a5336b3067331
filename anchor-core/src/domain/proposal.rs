use crate::foundation::{ContractAddress, StateRoot, ValidatorAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way an anchor flows. `PrimaryToSecondary` anchors the primary chain's
/// root onto the secondary chain's oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    PrimaryToSecondary,
    SecondaryToPrimary,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::PrimaryToSecondary, Direction::SecondaryToPrimary];

    pub fn from_source_is_primary(source_is_primary: bool) -> Self {
        if source_is_primary {
            Direction::PrimaryToSecondary
        } else {
            Direction::SecondaryToPrimary
        }
    }

    pub fn source_is_primary(self) -> bool {
        matches!(self, Direction::PrimaryToSecondary)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::PrimaryToSecondary => "primary_to_secondary",
            Direction::SecondaryToPrimary => "secondary_to_primary",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to anchor `state_root` at `height` of the source chain onto the destination oracle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorProposal {
    pub source_is_primary: bool,
    pub state_root: StateRoot,
    pub height: u64,
    pub destination_nonce: u64,
}

impl AnchorProposal {
    pub fn direction(&self) -> Direction {
        Direction::from_source_is_primary(self.source_is_primary)
    }
}

impl fmt::Display for AnchorProposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "direction={} height={} root={} nonce={}",
            self.direction(),
            self.height,
            self.state_root,
            self.destination_nonce
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoKind {
    /// Minimum number of source blocks between two anchors.
    Anchor,
    /// Number of blocks after which a source block is considered final.
    Final,
}

impl TempoKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TempoKind::Anchor => "t_anchor",
            TempoKind::Final => "t_final",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingChange {
    NewValidatorSet(Vec<ValidatorAddress>),
    NewTempo { kind: TempoKind, value: u64 },
    NewOracle(ContractAddress),
}

impl SettingChange {
    pub fn label(&self) -> &'static str {
        match self {
            SettingChange::NewValidatorSet(_) => "validators",
            SettingChange::NewTempo { kind, .. } => kind.as_str(),
            SettingChange::NewOracle(_) => "oracle",
        }
    }
}

/// A signed change to the destination oracle's settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingProposal {
    pub source_is_primary: bool,
    pub destination_nonce: u64,
    pub change: SettingChange,
}

impl SettingProposal {
    pub fn direction(&self) -> Direction {
        Direction::from_source_is_primary(self.source_is_primary)
    }
}

impl fmt::Display for SettingProposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "direction={} setting={} nonce={}", self.direction(), self.change.label(), self.destination_nonce)?;
        match &self.change {
            SettingChange::NewTempo { value, .. } => write!(f, " value={}", value),
            SettingChange::NewValidatorSet(validators) => write!(f, " validators={}", validators.len()),
            SettingChange::NewOracle(oracle) => write!(f, " oracle={}", oracle),
        }
    }
}

/// Wire form of a tempo update request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoProposal {
    pub source_is_primary: bool,
    pub tempo: u64,
    pub destination_nonce: u64,
}

/// Wire form of a validator-set update request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSetProposal {
    pub source_is_primary: bool,
    pub validators: Vec<ValidatorAddress>,
    pub destination_nonce: u64,
}

/// Wire form of an oracle-address update request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleProposal {
    pub source_is_primary: bool,
    pub oracle: ContractAddress,
    pub destination_nonce: u64,
}

impl TempoProposal {
    pub fn into_setting(self, kind: TempoKind) -> SettingProposal {
        SettingProposal {
            source_is_primary: self.source_is_primary,
            destination_nonce: self.destination_nonce,
            change: SettingChange::NewTempo { kind, value: self.tempo },
        }
    }
}

impl From<ValidatorSetProposal> for SettingProposal {
    fn from(value: ValidatorSetProposal) -> Self {
        SettingProposal {
            source_is_primary: value.source_is_primary,
            destination_nonce: value.destination_nonce,
            change: SettingChange::NewValidatorSet(value.validators),
        }
    }
}

impl From<OracleProposal> for SettingProposal {
    fn from(value: OracleProposal) -> Self {
        SettingProposal {
            source_is_primary: value.source_is_primary,
            destination_nonce: value.destination_nonce,
            change: SettingChange::NewOracle(value.oracle),
        }
    }
}

/// A validator's answer to a signature request: a signature or a reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Approval {
    Signed { address: ValidatorAddress, signature: String },
    Rejected { error: String },
}

impl Approval {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Approval::Rejected { error: reason.into() }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Approval::Signed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Approval::Rejected { error } => Some(error),
            Approval::Signed { .. } => None,
        }
    }
}
