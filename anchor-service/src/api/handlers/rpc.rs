use super::types::{json_err, json_ok, JsonRpcRequest, RpcErrorCode};
use crate::api::middleware::auth::authorize;
use crate::api::state::RpcState;
use anchor_core::domain::{AnchorProposal, Approval, OracleProposal, TempoProposal, ValidatorSetProposal};
use anchor_core::foundation::validator_methods::{
    GET_ANCHOR_SIGNATURE, GET_ORACLE_SIGNATURE, GET_T_ANCHOR_SIGNATURE, GET_T_FINAL_SIGNATURE, GET_VALIDATORS_SIGNATURE,
};
use anchor_core::foundation::{Result, MAX_RPC_BATCH_SIZE};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

pub async fn handle_rpc(State(state): State<Arc<RpcState>>, headers: HeaderMap, body: String) -> Response {
    let started = Instant::now();
    let Ok(value) = serde_json::from_str::<Value>(&body) else {
        debug!("rpc parse error body_len={}", body.len());
        return Json(json_err(Value::Null, RpcErrorCode::ParseError, "parse error")).into_response();
    };

    let outcome = match value {
        Value::Array(batch) if batch.is_empty() => Json(json_err(Value::Null, RpcErrorCode::InvalidRequest, "empty batch")).into_response(),
        Value::Array(batch) if batch.len() > MAX_RPC_BATCH_SIZE => Json(json_err(
            Value::Null,
            RpcErrorCode::InvalidRequest,
            format!("batch too large: {} > {}", batch.len(), MAX_RPC_BATCH_SIZE),
        ))
        .into_response(),
        Value::Array(batch) => {
            debug!("rpc batch request batch_size={}", batch.len());
            let mut out = Vec::with_capacity(batch.len());
            for item in batch {
                out.push(handle_value(&state, &headers, item).await);
            }
            Json(Value::Array(out)).into_response()
        }
        other => Json(handle_value(&state, &headers, other).await).into_response(),
    };

    debug!("rpc handled elapsed_ms={}", started.elapsed().as_millis());
    outcome
}

async fn handle_value(state: &RpcState, headers: &HeaderMap, value: Value) -> Value {
    match serde_json::from_value::<JsonRpcRequest>(value) {
        Ok(req) => handle_single(state, headers, req).await,
        Err(err) => json_err(Value::Null, RpcErrorCode::InvalidRequest, err.to_string()),
    }
}

async fn handle_single(state: &RpcState, headers: &HeaderMap, req: JsonRpcRequest) -> Value {
    let id = req.id;
    let method = req.method.as_str();
    let correlation_id = headers.get("x-request-id").and_then(|v| v.to_str().ok()).unwrap_or("");
    debug!("rpc request correlation_id={} method={} has_id={}", correlation_id, method, !id.is_null());

    if req.jsonrpc.as_deref().is_some_and(|version| version != "2.0") {
        state.metrics.inc_rpc_request(method, "invalid_request");
        return json_err(id, RpcErrorCode::InvalidRequest, "jsonrpc must be '2.0'");
    }

    if let Err(reason) = authorize(headers, state.rpc_token.as_deref()) {
        state.metrics.inc_rpc_request(method, "unauthorized");
        warn!("rpc unauthorized correlation_id={} method={}", correlation_id, method);
        return json_err(id, RpcErrorCode::Unauthorized, reason);
    }

    let approval = &state.approval;
    match method {
        GET_ANCHOR_SIGNATURE => {
            dispatch(state, id, method, req.params, |p: AnchorProposal| async move { approval.get_anchor_signature(&p).await }).await
        }
        GET_T_ANCHOR_SIGNATURE => dispatch(state, id, method, req.params, |p: TempoProposal| approval.get_t_anchor_signature(p)).await,
        GET_T_FINAL_SIGNATURE => dispatch(state, id, method, req.params, |p: TempoProposal| approval.get_t_final_signature(p)).await,
        GET_VALIDATORS_SIGNATURE => {
            dispatch(state, id, method, req.params, |p: ValidatorSetProposal| approval.get_validators_signature(p)).await
        }
        GET_ORACLE_SIGNATURE => dispatch(state, id, method, req.params, |p: OracleProposal| approval.get_oracle_signature(p)).await,
        _ => {
            state.metrics.inc_rpc_request(method, "not_found");
            debug!("rpc method not found method={}", method);
            json_err(id, RpcErrorCode::MethodNotFound, "method not found")
        }
    }
}

/// Accepts the proposal as a params object or as a one-element positional array.
fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> std::result::Result<T, String> {
    let value = match params {
        Some(Value::Array(mut items)) if items.len() == 1 => items.remove(0),
        Some(value) => value,
        None => return Err("missing params".to_string()),
    };
    serde_json::from_value(value).map_err(|err| err.to_string())
}

async fn dispatch<T, F, Fut>(state: &RpcState, id: Value, method: &str, params: Option<Value>, call: F) -> Value
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<Approval>>,
{
    let proposal = match parse_params::<T>(params) {
        Ok(proposal) => proposal,
        Err(err) => {
            state.metrics.inc_rpc_request(method, "invalid_params");
            return json_err(id, RpcErrorCode::InvalidParams, err);
        }
    };

    match call(proposal).await {
        Ok(approval) => {
            let outcome = if approval.is_signed() { "signed" } else { "rejected" };
            state.metrics.inc_approval(method, outcome);
            state.metrics.inc_rpc_request(method, "ok");
            json_ok(id, approval)
        }
        Err(err) => {
            let code = RpcErrorCode::for_error(&err);
            state.metrics.inc_approval(method, "error");
            state.metrics.inc_rpc_request(method, "error");
            info!("approval request failed method={} code={:?} error={}", method, err.code(), err);
            json_err(id, code, err.to_string())
        }
    }
}
