use crate::domain::proposal::AnchorProposal;
use crate::foundation::StateRoot;
use std::fmt;

/// What a validator observed on both chains while checking an anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorObservation {
    /// Last irreversible height of the source chain.
    pub source_lib: u64,
    /// Source block root at the proposed height, when the height is final.
    pub source_root: Option<StateRoot>,
    pub oracle_nonce: u64,
    pub last_anchor_height: u64,
    pub t_anchor: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnchorRejection {
    NotFinal { height: u64, lib: u64 },
    RootUnavailable { height: u64 },
    RootMismatch { height: u64, expected: StateRoot, proposed: StateRoot },
    NonceMismatch { expected: u64, proposed: u64 },
    TooSoon { height: u64, last_anchor_height: u64, t_anchor: u64 },
}

impl fmt::Display for AnchorRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorRejection::NotFinal { height, lib } => {
                write!(f, "anchor height not finalized: height={} last_irreversible={}", height, lib)
            }
            AnchorRejection::RootUnavailable { height } => write!(f, "source block root unavailable at height={}", height),
            AnchorRejection::RootMismatch { height, expected, proposed } => {
                write!(f, "root doesn't match height: height={} expected={} proposed={}", height, expected, proposed)
            }
            AnchorRejection::NonceMismatch { expected, proposed } => {
                write!(f, "incorrect destination nonce: expected={} proposed={}", expected, proposed)
            }
            AnchorRejection::TooSoon { height, last_anchor_height, t_anchor } => write!(
                f,
                "anchor height too soon: height={} last_anchor={} t_anchor={} next_allowed={}",
                height,
                last_anchor_height,
                t_anchor,
                next_anchor_height(*last_anchor_height, *t_anchor)
            ),
        }
    }
}

/// Smallest height admissible after `last_anchor_height`.
pub fn next_anchor_height(last_anchor_height: u64, t_anchor: u64) -> u64 {
    last_anchor_height.saturating_add(t_anchor)
}

/// Applies the four anchor conditions in order and reports the first one that fails.
pub fn check_anchor(proposal: &AnchorProposal, observed: &AnchorObservation) -> Result<(), AnchorRejection> {
    if proposal.height > observed.source_lib {
        return Err(AnchorRejection::NotFinal { height: proposal.height, lib: observed.source_lib });
    }
    let Some(expected) = observed.source_root else {
        return Err(AnchorRejection::RootUnavailable { height: proposal.height });
    };
    if !expected.ct_eq(&proposal.state_root) {
        return Err(AnchorRejection::RootMismatch { height: proposal.height, expected, proposed: proposal.state_root });
    }
    if proposal.destination_nonce != observed.oracle_nonce {
        return Err(AnchorRejection::NonceMismatch { expected: observed.oracle_nonce, proposed: proposal.destination_nonce });
    }
    if next_anchor_height(observed.last_anchor_height, observed.t_anchor) > proposal.height {
        return Err(AnchorRejection::TooSoon {
            height: proposal.height,
            last_anchor_height: observed.last_anchor_height,
            t_anchor: observed.t_anchor,
        });
    }
    Ok(())
}
