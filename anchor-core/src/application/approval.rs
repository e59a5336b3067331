//! Validator-side decision logic: check a proposal against both chains and the
//! local configuration, then sign it or explain why not.

use crate::application::chains::BridgeChains;
use crate::application::snapshot::ConfigSnapshot;
use crate::domain::digest::{anchor_proposal_digest, setting_digest};
use crate::domain::{
    check_anchor, check_setting, AnchorObservation, AnchorProposal, Approval, DigestSigner, OracleProposal, OracleSettings,
    SettingChange, SettingProposal, TempoKind, TempoProposal, ValidatorSetProposal,
};
use crate::foundation::{BridgeError, Result, ValidatorAddress};
use crate::infrastructure::config::{AppConfig, FeatureFlags};
use log::{debug, info, warn};
use std::sync::Arc;

pub struct ValidatorApprovalService {
    signer: Arc<dyn DigestSigner>,
    chains: Arc<BridgeChains>,
    snapshot: Arc<ConfigSnapshot>,
}

impl ValidatorApprovalService {
    pub fn new(signer: Arc<dyn DigestSigner>, chains: Arc<BridgeChains>, snapshot: Arc<ConfigSnapshot>) -> Self {
        Self { signer, chains, snapshot }
    }

    pub fn address(&self) -> &ValidatorAddress {
        self.signer.address()
    }

    pub fn chains(&self) -> &Arc<BridgeChains> {
        &self.chains
    }

    /// Flags are read from the current snapshot so a reload takes effect on the next request.
    pub fn features(&self) -> FeatureFlags {
        self.snapshot.load().validator.features()
    }

    fn sign(&self, digest: &crate::foundation::Digest) -> Result<Approval> {
        let signature = self.signer.sign_digest(digest)?;
        Ok(Approval::Signed { address: self.signer.address().clone(), signature })
    }

    fn reject(&self, what: &str, summary: &dyn std::fmt::Display, reason: String) -> Approval {
        warn!("rejecting {} proposal validator={} {} reason={}", what, self.signer.address(), summary, reason);
        Approval::rejected(reason)
    }

    pub async fn get_anchor_signature(&self, proposal: &AnchorProposal) -> Result<Approval> {
        if !self.features().anchoring_enabled {
            return Err(BridgeError::feature_disabled("anchoring"));
        }
        let config = self.snapshot.load();
        let direction = proposal.direction();
        let source = self.chains.source(direction);

        let Some(source_lib) = source.last_irreversible_height().await? else {
            return Ok(self.reject("anchor", proposal, format!("{} reports no irreversible height", source.name())));
        };
        let source_root = if proposal.height <= source_lib { source.block_root(proposal.height).await? } else { None };

        let oracle = self.chains.oracle(direction, config.bridge.direction(direction)).await?;
        let state = oracle.state().await?;
        let observed = AnchorObservation {
            source_lib,
            source_root,
            oracle_nonce: state.nonce,
            last_anchor_height: state.anchor_height,
            t_anchor: state.t_anchor,
        };
        if let Err(rejection) = check_anchor(proposal, &observed) {
            return Ok(self.reject("anchor", proposal, rejection.to_string()));
        }

        let contract_id = oracle.contract_id().await?;
        let approval = self.sign(&anchor_proposal_digest(proposal, &contract_id))?;
        info!("signed anchor validator={} {}", self.signer.address(), proposal);
        Ok(approval)
    }

    pub async fn get_t_anchor_signature(&self, proposal: TempoProposal) -> Result<Approval> {
        self.get_setting_signature(&proposal.into_setting(TempoKind::Anchor)).await
    }

    pub async fn get_t_final_signature(&self, proposal: TempoProposal) -> Result<Approval> {
        self.get_setting_signature(&proposal.into_setting(TempoKind::Final)).await
    }

    pub async fn get_validators_signature(&self, proposal: ValidatorSetProposal) -> Result<Approval> {
        self.get_setting_signature(&proposal.into()).await
    }

    pub async fn get_oracle_signature(&self, proposal: OracleProposal) -> Result<Approval> {
        self.get_setting_signature(&proposal.into()).await
    }

    /// Tempo changes need auto-update; roster and oracle changes also need oracle updates.
    pub async fn get_setting_signature(&self, proposal: &SettingProposal) -> Result<Approval> {
        let features = self.features();
        if !features.auto_update_enabled {
            return Err(BridgeError::feature_disabled("auto_update"));
        }
        if matches!(proposal.change, SettingChange::NewValidatorSet(_) | SettingChange::NewOracle(_)) && !features.oracle_update_enabled {
            return Err(BridgeError::feature_disabled("oracle_update"));
        }

        let config = self.snapshot.load();
        let direction = proposal.direction();
        let oracle = self.chains.oracle(direction, config.bridge.direction(direction)).await?;
        let state = oracle.state().await?;
        let configured = configured_settings(&config, direction);
        debug!("checking setting proposal validator={} {} onchain_nonce={}", self.signer.address(), proposal, state.nonce);

        if let Err(rejection) = check_setting(proposal, state.nonce, &state.settings(), &configured) {
            return Ok(self.reject("setting", proposal, rejection.to_string()));
        }

        let contract_id = oracle.contract_id().await?;
        let approval = self.sign(&setting_digest(proposal, &contract_id))?;
        info!("signed setting update validator={} {}", self.signer.address(), proposal);
        Ok(approval)
    }
}

/// The settings this process wants on the destination oracle of `direction`.
pub fn configured_settings(config: &AppConfig, direction: crate::domain::Direction) -> OracleSettings {
    let dir = config.bridge.direction(direction);
    OracleSettings {
        t_anchor: dir.t_anchor,
        t_final: dir.t_final,
        validators: config.validators.iter().map(|entry| entry.address.normalized()).collect(),
        oracle: dir.oracle_address.clone(),
    }
}
