use super::correlation::CorrelationId;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use log::{debug, error, trace, warn};
use std::net::SocketAddr;
use std::time::Instant;

const REDACTED_HEADERS: &[&str] = &["authorization", "x-api-key", "cookie"];
const MAX_HEADER_VALUE_LEN: usize = 128;

fn sanitize_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if REDACTED_HEADERS.contains(&name.as_str()) {
                "<redacted>".to_string()
            } else {
                match value.to_str() {
                    Ok(text) if text.len() > MAX_HEADER_VALUE_LEN => format!("{}...", &text[..MAX_HEADER_VALUE_LEN]),
                    Ok(text) => text.to_string(),
                    Err(_) => "<non-utf8>".to_string(),
                }
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers.get(axum::http::header::CONTENT_LENGTH).and_then(|v| v.to_str().ok()).and_then(|s| s.parse().ok()).unwrap_or(0)
}

pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client_ip = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip().to_string()).unwrap_or_default();
    let correlation_id = req.extensions().get::<CorrelationId>().map(|id| id.0.clone()).unwrap_or_default();
    debug!(
        "request headers correlation_id={} client_ip={} method={} path={} headers={:?} body_size={}",
        correlation_id,
        client_ip,
        method,
        path,
        sanitize_headers(req.headers()),
        content_length(req.headers())
    );
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    let probe = matches!(path.as_str(), "/health" | "/ready" | "/metrics");
    if status.is_server_error() {
        error!(
            "request failed correlation_id={} client_ip={} method={} path={} status={} duration_ms={}",
            correlation_id,
            client_ip,
            method,
            path,
            status.as_u16(),
            elapsed_ms
        );
    } else if status.is_client_error() {
        warn!(
            "request rejected correlation_id={} client_ip={} method={} path={} status={} duration_ms={}",
            correlation_id,
            client_ip,
            method,
            path,
            status.as_u16(),
            elapsed_ms
        );
    } else if probe {
        trace!("probe correlation_id={} path={} status={} duration_ms={}", correlation_id, path, status.as_u16(), elapsed_ms);
    } else {
        debug!(
            "request correlation_id={} client_ip={} method={} path={} status={} duration_ms={} response_size={}",
            correlation_id,
            client_ip,
            method,
            path,
            status.as_u16(),
            elapsed_ms,
            content_length(response.headers())
        );
    }
    response
}
