//! `ChainClient` over a chain node's JSON-RPC gateway.

use crate::foundation::{BridgeError, ChainName, ContractAddress, Result, StateRoot, DEFAULT_BLOCK_TIME_MS};
use crate::infrastructure::chain::{ChainClient, ChainEvent, ContractState, TxHandle, TxResult};
use crate::infrastructure::config::ChainConfig;
use crate::infrastructure::jsonrpc::{JsonRpcClient, RpcFailure};
use crate::infrastructure::rpc::{CircuitBreaker, CircuitBreakerConfig};
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

mod methods {
    pub const LAST_IRREVERSIBLE_HEIGHT: &str = "chain_getLastIrreversibleHeight";
    pub const BLOCK_ROOT: &str = "chain_getBlockRoot";
    pub const QUERY_STATE: &str = "contract_queryState";
    pub const CALL: &str = "contract_call";
    pub const TX_RESULT: &str = "tx_getResult";
    pub const EVENTS: &str = "contract_getEvents";
}

/// Shared between the client and its event pollers.
struct Gateway {
    name: ChainName,
    rpc: JsonRpcClient,
    breaker: CircuitBreaker,
}

impl Gateway {
    async fn call_with<P, R, F>(&self, method: &str, params: P, on_error: F) -> Result<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
        F: FnOnce(RpcFailure) -> BridgeError,
    {
        if !self.breaker.allow() {
            return Err(BridgeError::CircuitOpen { target: self.name.to_string() });
        }
        match self.rpc.call(method, params).await {
            Ok(value) => {
                self.breaker.record_success();
                Ok(value)
            }
            Err(failure) => {
                if failure.is_transport() {
                    self.breaker.record_failure();
                } else {
                    self.breaker.record_success();
                }
                debug!("chain rpc failed chain={} method={} {}", self.name, method, failure.summary());
                Err(on_error(failure))
            }
        }
    }

    async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        self.call_with(method, params, |failure| BridgeError::node_rpc(method, failure.summary())).await
    }
}

pub struct HttpChainClient {
    gateway: Arc<Gateway>,
    poll_interval: Duration,
}

impl HttpChainClient {
    pub fn new(config: &ChainConfig, token: Option<String>, breaker: CircuitBreakerConfig) -> Result<Self> {
        let timeout_ms = if config.request_timeout_ms == 0 { DEFAULT_REQUEST_TIMEOUT_MS } else { config.request_timeout_ms };
        let block_time_ms = if config.block_time_ms == 0 { DEFAULT_BLOCK_TIME_MS } else { config.block_time_ms };
        let rpc = JsonRpcClient::new(&config.rpc_url, Duration::from_millis(timeout_ms), token)?;
        let breaker = CircuitBreaker::new(format!("chain:{}", config.name), breaker);
        Ok(Self {
            gateway: Arc::new(Gateway { name: config.name.clone(), rpc, breaker }),
            poll_interval: Duration::from_millis(block_time_ms),
        })
    }

    pub fn url(&self) -> &str {
        self.gateway.rpc.url()
    }
}

struct EventPoller {
    gateway: Arc<Gateway>,
    address: ContractAddress,
    event: String,
    next_height: u64,
    buffered: VecDeque<ChainEvent>,
    interval: Duration,
}

impl EventPoller {
    async fn next_event(mut self) -> Option<(ChainEvent, Self)> {
        loop {
            if let Some(event) = self.buffered.pop_front() {
                self.next_height = self.next_height.max(event.height.saturating_add(1));
                return Some((event, self));
            }
            let fetched: Result<Vec<ChainEvent>> =
                self.gateway.call(methods::EVENTS, json!([self.address, self.event, self.next_height])).await;
            match fetched {
                Ok(events) if !events.is_empty() => self.buffered.extend(events),
                Ok(_) => tokio::time::sleep(self.interval).await,
                Err(err) => {
                    warn!("event poll failed chain={} contract={} event={} error={}", self.gateway.name, self.address, self.event, err);
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    fn name(&self) -> &ChainName {
        &self.gateway.name
    }

    async fn last_irreversible_height(&self) -> Result<Option<u64>> {
        self.gateway.call(methods::LAST_IRREVERSIBLE_HEIGHT, json!([])).await
    }

    async fn block_root(&self, height: u64) -> Result<Option<StateRoot>> {
        let root: Option<String> = self.gateway.call(methods::BLOCK_ROOT, json!([height])).await?;
        root.filter(|r| !r.trim().is_empty()).map(|r| StateRoot::from_str(&r)).transpose()
    }

    async fn query_contract_state(&self, address: &ContractAddress, keys: &[&str]) -> Result<ContractState> {
        self.gateway.call(methods::QUERY_STATE, json!([address, keys])).await
    }

    async fn submit_contract_call(&self, address: &ContractAddress, function: &str, args: Vec<Value>) -> Result<TxHandle> {
        self.gateway
            .call_with(methods::CALL, json!([address, function, args]), |failure| match failure {
                RpcFailure::JsonRpc { message, .. } => BridgeError::TxCommitFailed(message),
                other => BridgeError::node_rpc(methods::CALL, other.summary()),
            })
            .await
    }

    async fn tx_result(&self, handle: &TxHandle) -> Result<Option<TxResult>> {
        self.gateway.call(methods::TX_RESULT, json!([handle.tx_id])).await
    }

    async fn subscribe_event(&self, address: &ContractAddress, event: &str, from_height: u64) -> Result<BoxStream<'static, ChainEvent>> {
        let poller = EventPoller {
            gateway: Arc::clone(&self.gateway),
            address: address.clone(),
            event: event.to_string(),
            next_height: from_height,
            buffered: VecDeque::new(),
            interval: self.poll_interval,
        };
        Ok(stream::unfold(poller, EventPoller::next_event).boxed())
    }
}
