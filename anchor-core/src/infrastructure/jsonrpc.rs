//! Minimal JSON-RPC 2.0 client over HTTP POST, shared by the chain gateway
//! adapter and the proposer's validator clients.

use crate::foundation::BridgeError;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcEnvelope {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcFailure {
    Transport(String),
    Timeout,
    Http { status: StatusCode, body: String },
    InvalidJson { error: String },
    JsonRpc { code: i64, message: String },
}

impl RpcFailure {
    pub fn summary(&self) -> String {
        match self {
            RpcFailure::Transport(message) => format!("transport_error={message}"),
            RpcFailure::Timeout => "timeout".to_string(),
            RpcFailure::Http { status, body } => format!("http_status={status} body={body}"),
            RpcFailure::InvalidJson { error } => format!("invalid_json_error={error}"),
            RpcFailure::JsonRpc { code, message } => format!("json_rpc_error code={code} message={message}"),
        }
    }

    /// True when the remote end was never reached or did not answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcFailure::Transport(_) | RpcFailure::Timeout | RpcFailure::Http { .. })
    }
}

pub struct JsonRpcClient {
    client: Client,
    url: String,
    token: Option<String>,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// `base_url` may or may not end with `/rpc`.
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BridgeError::NetworkError(format!("http client build failed: {}", err)))?;
        let trimmed = base_url.trim_end_matches('/');
        let url = if trimmed.ends_with("/rpc") { trimmed.to_string() } else { format!("{}/rpc", trimmed) };
        Ok(Self { client, url, token, next_id: AtomicU64::new(1) })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn call<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: P) -> Result<R, RpcFailure> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        let mut req = self.client.post(&self.url).json(&payload);
        if let Some(token) = self.token.as_deref() {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let resp = req.send().await.map_err(|err| {
            if err.is_timeout() {
                RpcFailure::Timeout
            } else {
                RpcFailure::Transport(err.to_string())
            }
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|err| RpcFailure::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(RpcFailure::Http { status, body });
        }
        let envelope: JsonRpcEnvelope =
            serde_json::from_str(&body).map_err(|err| RpcFailure::InvalidJson { error: err.to_string() })?;
        if let Some(err) = envelope.error {
            return Err(RpcFailure::JsonRpc { code: err.code, message: err.message });
        }
        serde_json::from_value(envelope.result.unwrap_or(serde_json::Value::Null))
            .map_err(|err| RpcFailure::InvalidJson { error: err.to_string() })
    }
}
