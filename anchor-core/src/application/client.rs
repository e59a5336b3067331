use crate::application::approval::ValidatorApprovalService;
use crate::domain::{AnchorProposal, Approval, OracleProposal, RosterEntry, SettingChange, SettingProposal, TempoProposal, ValidatorSetProposal};
use crate::foundation::validator_methods as methods;
use crate::foundation::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// How the proposer reaches one validator.
#[async_trait]
pub trait ValidatorClient: Send + Sync {
    fn endpoint(&self) -> &str;

    async fn anchor_signature(&self, proposal: &AnchorProposal) -> Result<Approval>;

    async fn setting_signature(&self, proposal: &SettingProposal) -> Result<Approval>;
}

/// Builds clients for roster entries; used again whenever the roster changes.
pub trait ValidatorClientFactory: Send + Sync {
    fn connect(&self, entry: &RosterEntry) -> Result<Arc<dyn ValidatorClient>>;
}

/// Calls an approval service in the same process.
pub struct LocalValidatorClient {
    endpoint: String,
    service: Arc<ValidatorApprovalService>,
}

impl LocalValidatorClient {
    pub fn new(endpoint: impl Into<String>, service: Arc<ValidatorApprovalService>) -> Self {
        Self { endpoint: endpoint.into(), service }
    }
}

#[async_trait]
impl ValidatorClient for LocalValidatorClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn anchor_signature(&self, proposal: &AnchorProposal) -> Result<Approval> {
        self.service.get_anchor_signature(proposal).await
    }

    async fn setting_signature(&self, proposal: &SettingProposal) -> Result<Approval> {
        self.service.get_setting_signature(proposal).await
    }
}

/// Splits a setting proposal back into the wire request of its RPC method.
pub enum SettingRequest {
    TAnchor(TempoProposal),
    TFinal(TempoProposal),
    Validators(ValidatorSetProposal),
    Oracle(OracleProposal),
}

impl SettingRequest {
    pub fn method(&self) -> &'static str {
        match self {
            SettingRequest::TAnchor(_) => methods::GET_T_ANCHOR_SIGNATURE,
            SettingRequest::TFinal(_) => methods::GET_T_FINAL_SIGNATURE,
            SettingRequest::Validators(_) => methods::GET_VALIDATORS_SIGNATURE,
            SettingRequest::Oracle(_) => methods::GET_ORACLE_SIGNATURE,
        }
    }
}

impl From<&SettingProposal> for SettingRequest {
    fn from(proposal: &SettingProposal) -> Self {
        let source_is_primary = proposal.source_is_primary;
        let destination_nonce = proposal.destination_nonce;
        match &proposal.change {
            SettingChange::NewTempo { kind, value } => {
                let tempo = TempoProposal { source_is_primary, tempo: *value, destination_nonce };
                match kind {
                    crate::domain::TempoKind::Anchor => SettingRequest::TAnchor(tempo),
                    crate::domain::TempoKind::Final => SettingRequest::TFinal(tempo),
                }
            }
            SettingChange::NewValidatorSet(validators) => {
                SettingRequest::Validators(ValidatorSetProposal { source_is_primary, validators: validators.clone(), destination_nonce })
            }
            SettingChange::NewOracle(oracle) => {
                SettingRequest::Oracle(OracleProposal { source_is_primary, oracle: oracle.clone(), destination_nonce })
            }
        }
    }
}
