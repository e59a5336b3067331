use crate::domain::proposal::{SettingChange, SettingProposal, TempoKind};
use crate::foundation::{ContractAddress, ValidatorAddress};
use std::fmt;

/// The subset of oracle state that settings updates can change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleSettings {
    pub t_anchor: u64,
    pub t_final: u64,
    pub validators: Vec<ValidatorAddress>,
    pub oracle: ContractAddress,
}

impl OracleSettings {
    fn validators_equal(a: &[ValidatorAddress], b: &[ValidatorAddress]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches(y))
    }

    /// Changes required to bring `self` (on chain) in line with `configured`.
    pub fn diverged(&self, configured: &OracleSettings) -> Vec<SettingChange> {
        let mut changes = Vec::new();
        if self.t_anchor != configured.t_anchor {
            changes.push(SettingChange::NewTempo { kind: TempoKind::Anchor, value: configured.t_anchor });
        }
        if self.t_final != configured.t_final {
            changes.push(SettingChange::NewTempo { kind: TempoKind::Final, value: configured.t_final });
        }
        if !Self::validators_equal(&self.validators, &configured.validators) {
            changes.push(SettingChange::NewValidatorSet(configured.validators.clone()));
        }
        if self.oracle != configured.oracle {
            changes.push(SettingChange::NewOracle(configured.oracle.clone()));
        }
        changes
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingRejection {
    NonceMismatch { expected: u64, proposed: u64 },
    Unchanged { setting: &'static str },
    NotConfigured { setting: &'static str, configured: String, proposed: String },
}

impl fmt::Display for SettingRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingRejection::NonceMismatch { expected, proposed } => {
                write!(f, "incorrect destination nonce: expected={} proposed={}", expected, proposed)
            }
            SettingRejection::Unchanged { setting } => write!(f, "{} already active on chain", setting),
            SettingRejection::NotConfigured { setting, configured, proposed } => {
                write!(f, "{} doesn't match local configuration: configured={} proposed={}", setting, configured, proposed)
            }
        }
    }
}

/// Checks a settings proposal: the nonce is current, the value differs from the
/// active one, and the value matches what this validator has configured.
pub fn check_setting(
    proposal: &SettingProposal,
    oracle_nonce: u64,
    onchain: &OracleSettings,
    configured: &OracleSettings,
) -> Result<(), SettingRejection> {
    if proposal.destination_nonce != oracle_nonce {
        return Err(SettingRejection::NonceMismatch { expected: oracle_nonce, proposed: proposal.destination_nonce });
    }
    let setting = proposal.change.label();
    match &proposal.change {
        SettingChange::NewTempo { kind, value } => {
            let (active, local) = match kind {
                TempoKind::Anchor => (onchain.t_anchor, configured.t_anchor),
                TempoKind::Final => (onchain.t_final, configured.t_final),
            };
            if *value == active {
                return Err(SettingRejection::Unchanged { setting });
            }
            if *value != local {
                return Err(SettingRejection::NotConfigured { setting, configured: local.to_string(), proposed: value.to_string() });
            }
        }
        SettingChange::NewValidatorSet(validators) => {
            if OracleSettings::validators_equal(validators, &onchain.validators) {
                return Err(SettingRejection::Unchanged { setting });
            }
            if !OracleSettings::validators_equal(validators, &configured.validators) {
                return Err(SettingRejection::NotConfigured {
                    setting,
                    configured: format!("{} validators", configured.validators.len()),
                    proposed: format!("{} validators", validators.len()),
                });
            }
        }
        SettingChange::NewOracle(oracle) => {
            if *oracle == onchain.oracle {
                return Err(SettingRejection::Unchanged { setting });
            }
            if *oracle != configured.oracle {
                return Err(SettingRejection::NotConfigured {
                    setting,
                    configured: configured.oracle.to_string(),
                    proposed: oracle.to_string(),
                });
            }
        }
    }
    Ok(())
}
