//! Two-thirds quorum selection over validator approvals.

use crate::domain::proposal::Approval;
use crate::domain::roster::ValidatorRoster;
use crate::domain::signature;
use crate::foundation::{BridgeError, Digest, Result, QUORUM_DENOMINATOR, QUORUM_NUMERATOR};
use log::debug;
use serde::{Deserialize, Serialize};

/// Witness set submitted with an anchor or settings update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumResult {
    pub signatures: Vec<String>,
    pub signer_indexes: Vec<u32>,
}

impl QuorumResult {
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// `ceil(2N/3)`: the number of signatures submitted on chain.
pub fn quorum_size(total: usize) -> usize {
    (QUORUM_NUMERATOR * total).div_ceil(QUORUM_DENOMINATOR)
}

/// `3 * valid >= 2 * total`, and never for an empty set.
pub fn has_majority(valid: usize, total: usize) -> bool {
    total > 0 && QUORUM_DENOMINATOR * valid >= QUORUM_NUMERATOR * total
}

/// Filters `responses` (one slot per roster position, `None` for no vote) down to
/// the signatures that verify for the validator at that position, then keeps the
/// first `ceil(2N/3)` in roster order.
pub fn aggregate(digest: &Digest, roster: &ValidatorRoster, responses: &[Option<Approval>]) -> Result<QuorumResult> {
    let total = roster.len();
    let mut valid = QuorumResult::default();

    for (index, entry) in roster.entries().iter().enumerate() {
        let Some(Some(approval)) = responses.get(index) else {
            continue;
        };
        let Approval::Signed { address, signature: sig } = approval else {
            continue;
        };
        if !address.matches(&entry.address) {
            debug!("quorum: discarding approval with mismatched address index={} expected={} got={}", index + 1, entry.address, address);
            continue;
        }
        if !signature::verify(digest, sig, &entry.address) {
            debug!("quorum: discarding invalid signature index={} validator={}", index + 1, entry.address);
            continue;
        }
        valid.signatures.push(sig.to_ascii_lowercase());
        valid.signer_indexes.push((index + 1) as u32);
    }

    let received = valid.len();
    if !has_majority(received, total) {
        return Err(BridgeError::ValidatorMajority { required: quorum_size(total), received, total });
    }

    let keep = quorum_size(total);
    valid.signatures.truncate(keep);
    valid.signer_indexes.truncate(keep);
    Ok(valid)
}
