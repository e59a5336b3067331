use super::super::middleware::auth::authorize;
use super::super::state::RpcState;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, trace};
use std::sync::Arc;

pub async fn handle_health() -> impl IntoResponse {
    trace!("health check: ok");
    Json(serde_json::json!({
        "status": "healthy",
    }))
}

/// Ready once both chain gateways report a last irreversible height.
pub async fn handle_ready(State(state): State<Arc<RpcState>>, headers: HeaderMap) -> Response {
    if let Err(reason) = authorize(&headers, state.rpc_token.as_deref()) {
        return (StatusCode::UNAUTHORIZED, reason).into_response();
    }

    let chains = state.approval.chains();
    match chains.check_ready().await {
        Ok(()) => {
            trace!("ready check: ok");
            Json(serde_json::json!({
                "status": "ready",
                "address": state.approval.address().to_string(),
            }))
            .into_response()
        }
        Err(err) => {
            debug!("ready check: degraded error={}", err);
            let body = Json(serde_json::json!({
                "status": "degraded",
                "error": err.to_string(),
            }));
            (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
        }
    }
}

pub async fn handle_metrics(State(state): State<Arc<RpcState>>, headers: HeaderMap) -> Response {
    if let Err(reason) = authorize(&headers, state.rpc_token.as_deref()) {
        return (StatusCode::UNAUTHORIZED, reason).into_response();
    }

    match state.metrics.encode() {
        Ok(body) => {
            let mut response = body.into_response();
            response.headers_mut().insert(axum::http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"));
            response
        }
        Err(err) => {
            debug!("metrics encode failed error={}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics_error: {}", err)).into_response()
        }
    }
}
