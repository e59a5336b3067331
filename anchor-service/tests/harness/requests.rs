use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower::ServiceExt;

pub fn client_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

pub fn rpc_request(method: &str, params: Value, id: u64) -> Value {
    json!({ "jsonrpc": "2.0", "method": method, "params": params, "id": id })
}

pub async fn send(router: &Router, mut request: Request<Body>, client: SocketAddr) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    request.extensions_mut().insert(ConnectInfo(client));
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    (status, headers, bytes.to_vec())
}

pub async fn call_rpc(router: &Router, client: SocketAddr, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri("/rpc").header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = builder.body(Body::from(body.to_string())).expect("request");
    let (status, _, bytes) = send(router, request, client).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub async fn get(router: &Router, path: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder().method("GET").uri(path).body(Body::empty()).expect("request");
    send(router, request, client_addr(40000)).await
}
