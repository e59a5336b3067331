use anchor_core::foundation::BridgeError;
use serde::{Deserialize, Serialize};

#[repr(i64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
    Unauthorized = -32001,
    FeatureDisabled = -32002,
    ChainUnavailable = -32003,
    SigningFailed = -32004,
}

impl RpcErrorCode {
    /// Code for an approval-service error that is not a plain rejection.
    pub fn for_error(err: &BridgeError) -> Self {
        match err {
            BridgeError::FeatureDisabled { .. } => RpcErrorCode::FeatureDisabled,
            BridgeError::NodeRpc { .. }
            | BridgeError::NodeNotSynced(_)
            | BridgeError::CircuitOpen { .. }
            | BridgeError::MissingContractState { .. }
            | BridgeError::InvalidContractState { .. } => RpcErrorCode::ChainUnavailable,
            BridgeError::CryptoError(_) | BridgeError::KeyNotFound(_) => RpcErrorCode::SigningFailed,
            _ => RpcErrorCode::InternalError,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: serde_json::Value,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse<T> {
    jsonrpc: &'static str,
    id: serde_json::Value,
    result: T,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    jsonrpc: &'static str,
    id: serde_json::Value,
    error: JsonRpcErrorBody,
}

#[derive(Debug, Serialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

pub fn json_ok<T: Serialize>(id: serde_json::Value, result: T) -> serde_json::Value {
    serde_json::to_value(JsonRpcResponse { jsonrpc: "2.0", id, result }).unwrap_or(serde_json::Value::Null)
}

pub fn json_err(id: serde_json::Value, code: RpcErrorCode, message: impl Into<String>) -> serde_json::Value {
    serde_json::to_value(JsonRpcError { jsonrpc: "2.0", id, error: JsonRpcErrorBody { code: code as i64, message: message.into() } })
        .unwrap_or(serde_json::Value::Null)
}
