//! Canonical signing digests.
//!
//! Every message a validator signs is the SHA-256 of a UTF-8 preimage that ends
//! with the destination oracle's contract id and a one-letter role suffix.
//! Integers are rendered base-10 without padding.

use crate::domain::proposal::{AnchorProposal, SettingChange, SettingProposal, TempoKind};
use crate::foundation::{
    ContractAddress, ContractId, Digest, StateRoot, ValidatorAddress, DIGEST_SUFFIX_ANCHOR, DIGEST_SUFFIX_ORACLE,
    DIGEST_SUFFIX_T_ANCHOR, DIGEST_SUFFIX_T_FINAL, DIGEST_SUFFIX_VALIDATORS,
};
use sha2::{Digest as _, Sha256};

fn sha256(preimage: &str) -> Digest {
    let out: [u8; 32] = Sha256::digest(preimage.as_bytes()).into();
    Digest::from(out)
}

pub fn anchor_preimage(root: &StateRoot, height: u64, nonce: u64, contract_id: &ContractId) -> String {
    format!("{},{}{}{}{}", root.to_hex(), height, nonce, contract_id, DIGEST_SUFFIX_ANCHOR)
}

pub fn tempo_preimage(kind: TempoKind, value: u64, nonce: u64, contract_id: &ContractId) -> String {
    let suffix = match kind {
        TempoKind::Anchor => DIGEST_SUFFIX_T_ANCHOR,
        TempoKind::Final => DIGEST_SUFFIX_T_FINAL,
    };
    format!("{}{}{}{}", value, nonce, contract_id, suffix)
}

pub fn validators_preimage(validators: &[ValidatorAddress], nonce: u64, contract_id: &ContractId) -> String {
    let mut out = String::with_capacity(validators.iter().map(|v| v.len()).sum::<usize>() + 32);
    for validator in validators {
        out.push_str(validator.as_str());
    }
    out.push_str(&nonce.to_string());
    out.push_str(contract_id.as_str());
    out.push_str(DIGEST_SUFFIX_VALIDATORS);
    out
}

pub fn oracle_preimage(oracle: &ContractAddress, nonce: u64, contract_id: &ContractId) -> String {
    format!("{}{}{}{}", oracle, nonce, contract_id, DIGEST_SUFFIX_ORACLE)
}

pub fn anchor_digest(root: &StateRoot, height: u64, nonce: u64, contract_id: &ContractId) -> Digest {
    sha256(&anchor_preimage(root, height, nonce, contract_id))
}

pub fn tempo_digest(kind: TempoKind, value: u64, nonce: u64, contract_id: &ContractId) -> Digest {
    sha256(&tempo_preimage(kind, value, nonce, contract_id))
}

pub fn validators_digest(validators: &[ValidatorAddress], nonce: u64, contract_id: &ContractId) -> Digest {
    sha256(&validators_preimage(validators, nonce, contract_id))
}

pub fn oracle_digest(oracle: &ContractAddress, nonce: u64, contract_id: &ContractId) -> Digest {
    sha256(&oracle_preimage(oracle, nonce, contract_id))
}

pub fn anchor_proposal_digest(proposal: &AnchorProposal, contract_id: &ContractId) -> Digest {
    anchor_digest(&proposal.state_root, proposal.height, proposal.destination_nonce, contract_id)
}

pub fn setting_digest(proposal: &SettingProposal, contract_id: &ContractId) -> Digest {
    let nonce = proposal.destination_nonce;
    match &proposal.change {
        SettingChange::NewValidatorSet(validators) => validators_digest(validators, nonce, contract_id),
        SettingChange::NewTempo { kind, value } => tempo_digest(*kind, *value, nonce, contract_id),
        SettingChange::NewOracle(oracle) => oracle_digest(oracle, nonce, contract_id),
    }
}
