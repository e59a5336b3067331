use crate::domain::{DigestSigner, ValidatorRoster};
use crate::foundation::{BridgeError, Result};
use crate::infrastructure::config::AppConfig;
use log::info;

/// A validator must appear in the roster it signs for.
pub fn verify_validator_membership(config: &AppConfig, signer: &dyn DigestSigner) -> Result<u32> {
    let roster = ValidatorRoster::new(config.validators.clone())?;
    let index = roster.signer_index(signer.address()).ok_or_else(|| {
        BridgeError::ConfigurationMismatch(format!("validator {} is not in the configured roster of {}", signer.address(), roster.len()))
    })?;
    info!("validator identity address={} signer_index={} roster_size={}", signer.address(), index, roster.len());
    Ok(index)
}
