//! Chain capability consumed by both roles, with a JSON-RPC gateway adapter and
//! an in-memory model of the oracle and bridge contracts.

pub mod http;
pub mod memory;
pub mod oracle;

pub use http::HttpChainClient;
pub use memory::InMemoryChain;
pub use oracle::{OracleState, OracleView};

use crate::foundation::{BridgeError, ChainName, ContractAddress, Result, StateRoot, TxId, TX_RESULT_POLL_INTERVAL_MS};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle {
    pub tx_id: TxId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Success,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    pub status: TxStatus,
    #[serde(default)]
    pub detail: String,
}

impl TxResult {
    pub fn success() -> Self {
        Self { status: TxStatus::Success, detail: String::new() }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self { status: TxStatus::Failed, detail: detail.into() }
    }

    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainEvent {
    pub height: u64,
    pub contract: ContractAddress,
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Raw contract storage values keyed by state variable name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractState(pub BTreeMap<String, serde_json::Value>);

impl ContractState {
    fn value(&self, contract: &ContractAddress, key: &str) -> Result<&serde_json::Value> {
        match self.0.get(key) {
            Some(serde_json::Value::Null) | None => Err(BridgeError::missing_state(contract.as_str(), key)),
            Some(value) => Ok(value),
        }
    }

    /// Numbers may come back as JSON numbers or decimal strings.
    pub fn u64(&self, contract: &ContractAddress, key: &str) -> Result<u64> {
        match self.value(contract, key)? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| BridgeError::InvalidContractState { key: key.to_string(), details: "expected unsigned integer".to_string() })
    }

    pub fn string(&self, contract: &ContractAddress, key: &str) -> Result<String> {
        match self.value(contract, key)? {
            serde_json::Value::String(s) => Ok(s.clone()),
            other => Err(BridgeError::InvalidContractState { key: key.to_string(), details: format!("expected string, got {}", other) }),
        }
    }

    pub fn strings(&self, contract: &ContractAddress, key: &str) -> Result<Vec<String>> {
        let value = self.value(contract, key)?;
        let items = value
            .as_array()
            .ok_or_else(|| BridgeError::InvalidContractState { key: key.to_string(), details: "expected array".to_string() })?;
        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| BridgeError::InvalidContractState {
                    key: key.to_string(),
                    details: "expected array of strings".to_string(),
                })
            })
            .collect()
    }

    /// A missing or empty root reads as the zero root (no anchor yet).
    pub fn root(&self, key: &str) -> Result<StateRoot> {
        match self.0.get(key).and_then(|v| v.as_str()).map(str::trim) {
            None | Some("") => Ok(StateRoot::default()),
            Some(s) => StateRoot::from_str(s),
        }
    }
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    fn name(&self) -> &ChainName;

    /// `None` while the node cannot report finality.
    async fn last_irreversible_height(&self) -> Result<Option<u64>>;

    async fn block_root(&self, height: u64) -> Result<Option<StateRoot>>;

    async fn query_contract_state(&self, address: &ContractAddress, keys: &[&str]) -> Result<ContractState>;

    /// Returns once the transaction is committed to the mempool; a rejection is `TxCommitFailed`.
    async fn submit_contract_call(&self, address: &ContractAddress, function: &str, args: Vec<serde_json::Value>) -> Result<TxHandle>;

    /// `None` while the transaction has not executed.
    async fn tx_result(&self, handle: &TxHandle) -> Result<Option<TxResult>>;

    async fn subscribe_event(&self, address: &ContractAddress, event: &str, from_height: u64) -> Result<BoxStream<'static, ChainEvent>>;

    async fn wait_for_result(&self, handle: &TxHandle, timeout: Duration) -> Result<TxResult> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(result) = self.tx_result(handle).await? {
                return Ok(result);
            }
            if Instant::now() >= deadline {
                return Err(BridgeError::TxResultTimeout { tx_id: handle.tx_id.to_string() });
            }
            debug!("tx result pending chain={} tx_id={}", self.name(), handle.tx_id);
            tokio::time::sleep(Duration::from_millis(TX_RESULT_POLL_INTERVAL_MS)).await;
        }
    }
}
