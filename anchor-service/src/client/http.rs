use anchor_core::application::{SettingRequest, ValidatorClient, ValidatorClientFactory};
use anchor_core::domain::{AnchorProposal, Approval, RosterEntry, SettingProposal};
use anchor_core::foundation::validator_methods::GET_ANCHOR_SIGNATURE;
use anchor_core::foundation::{BridgeError, Result};
use anchor_core::infrastructure::jsonrpc::{JsonRpcClient, RpcFailure};
use async_trait::async_trait;
use log::trace;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Talks to one validator's `/rpc` endpoint.
pub struct HttpValidatorClient {
    endpoint: String,
    timeout: Duration,
    rpc: JsonRpcClient,
}

impl HttpValidatorClient {
    pub fn new(endpoint: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let rpc = JsonRpcClient::new(endpoint, timeout, token)?;
        Ok(Self { endpoint: endpoint.to_string(), timeout, rpc })
    }

    async fn request<P: Serialize + Send + Sync>(&self, method: &str, params: &P) -> Result<Approval> {
        trace!("validator request endpoint={} method={}", self.endpoint, method);
        self.rpc.call(method, params).await.map_err(|failure| self.failure(failure))
    }

    fn failure(&self, failure: RpcFailure) -> BridgeError {
        match failure {
            RpcFailure::Timeout => BridgeError::ValidatorTimeout {
                validator: self.endpoint.clone(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            },
            other => BridgeError::ValidatorRpc { validator: self.endpoint.clone(), details: other.summary() },
        }
    }
}

#[async_trait]
impl ValidatorClient for HttpValidatorClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn anchor_signature(&self, proposal: &AnchorProposal) -> Result<Approval> {
        self.request(GET_ANCHOR_SIGNATURE, proposal).await
    }

    async fn setting_signature(&self, proposal: &SettingProposal) -> Result<Approval> {
        let request = SettingRequest::from(proposal);
        let method = request.method();
        match &request {
            SettingRequest::TAnchor(tempo) | SettingRequest::TFinal(tempo) => self.request(method, tempo).await,
            SettingRequest::Validators(set) => self.request(method, set).await,
            SettingRequest::Oracle(oracle) => self.request(method, oracle).await,
        }
    }
}

pub struct HttpValidatorClientFactory {
    timeout: Duration,
    token: Option<String>,
}

impl HttpValidatorClientFactory {
    pub fn new(timeout: Duration, token: Option<String>) -> Self {
        Self { timeout, token }
    }
}

impl ValidatorClientFactory for HttpValidatorClientFactory {
    fn connect(&self, entry: &RosterEntry) -> Result<Arc<dyn ValidatorClient>> {
        Ok(Arc::new(HttpValidatorClient::new(&entry.endpoint, self.timeout, self.token.clone())?))
    }
}
