use crate::domain::signature::parse_address;
use crate::foundation::{BridgeError, Hash32, Result, ValidatorAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub address: ValidatorAddress,
    pub endpoint: String,
}

/// Ordered validator set. Position `i` is on-chain signer index `i + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorRoster {
    entries: Vec<RosterEntry>,
}

impl ValidatorRoster {
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(BridgeError::ConfigError("validator roster is empty".to_string()));
        }
        let mut seen = HashSet::with_capacity(entries.len());
        let mut normalized = Vec::with_capacity(entries.len());
        for entry in entries {
            parse_address(&entry.address)?;
            let address = entry.address.normalized();
            if !seen.insert(address.clone()) {
                return Err(BridgeError::ConfigError(format!("duplicate validator in roster: {}", address)));
            }
            normalized.push(RosterEntry { address, endpoint: entry.endpoint });
        }
        Ok(Self { entries: normalized })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn addresses(&self) -> Vec<ValidatorAddress> {
        self.entries.iter().map(|e| e.address.clone()).collect()
    }

    pub fn address_at(&self, index: usize) -> Option<&ValidatorAddress> {
        self.entries.get(index).map(|e| &e.address)
    }

    /// 1-based on-chain signer index of `address`.
    pub fn signer_index(&self, address: &ValidatorAddress) -> Option<u32> {
        let wanted = address.normalized();
        self.entries.iter().position(|e| e.address == wanted).and_then(|i| u32::try_from(i + 1).ok())
    }

    pub fn contains(&self, address: &ValidatorAddress) -> bool {
        self.signer_index(address).is_some()
    }

    /// True when `onchain` lists the same addresses in the same order.
    pub fn matches_onchain(&self, onchain: &[ValidatorAddress]) -> bool {
        onchain.len() == self.entries.len() && self.entries.iter().zip(onchain).all(|(entry, other)| entry.address.matches(other))
    }

    /// Order-sensitive fingerprint used in logs to tell roster versions apart.
    pub fn fingerprint(&self) -> Hash32 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"anchor:roster:v1:");
        hasher.update(&(self.entries.len() as u64).to_le_bytes());
        for entry in &self.entries {
            hasher.update(entry.address.as_bytes());
            hasher.update(&[0u8]);
        }
        *hasher.finalize().as_bytes()
    }
}
