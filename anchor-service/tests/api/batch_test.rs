use crate::harness::*;
use anchor_core::foundation::MAX_RPC_BATCH_SIZE;
use anchor_core::domain::Direction;
use serde_json::{json, Value};

#[tokio::test]
async fn rpc_batch_returns_one_response_per_entry() {
    let harness = ServiceHarness::new(3);
    harness.finalize_source(Direction::PrimaryToSecondary, T_ANCHOR);
    let proposal = harness.anchor_proposal(Direction::PrimaryToSecondary, T_ANCHOR);
    let router = harness.nodes[0].router();

    let body = json!([
        rpc_request("validator.get_anchor_signature", json!(proposal), 1),
        rpc_request("does.not.exist", json!({}), 2),
        { "not": "a request" }
    ]);
    let (status, value) = call_rpc(&router, client_addr(10201), None, body).await;

    assert!(status.is_success());
    let responses = value.as_array().expect("array response");
    assert_eq!(responses.len(), 3);
    assert!(responses[0]["result"]["signature"].is_string());
    assert_eq!(responses[1]["error"]["code"], -32601);
    assert_eq!(responses[2]["error"]["code"], -32600);
}

#[tokio::test]
async fn empty_and_oversized_batches_are_invalid() {
    let harness = ServiceHarness::new(3);
    let router = harness.nodes[0].router();

    let (_, value) = call_rpc(&router, client_addr(10202), None, json!([])).await;
    assert_eq!(value["error"]["code"], -32600);

    let batch: Vec<Value> = (0..=MAX_RPC_BATCH_SIZE as u64).map(|id| rpc_request("does.not.exist", json!({}), id)).collect();
    let (_, value) = call_rpc(&router, client_addr(10203), None, Value::Array(batch)).await;
    assert_eq!(value["error"]["code"], -32600);
}

#[tokio::test]
async fn unparseable_body_is_a_parse_error() {
    use axum::body::Body;
    use axum::http::Request;

    let harness = ServiceHarness::new(3);
    let router = harness.nodes[0].router();
    let request = Request::builder().method("POST").uri("/rpc").body(Body::from("{not json")).expect("request");
    let (status, _, bytes) = send(&router, request, client_addr(10204)).await;

    assert!(status.is_success());
    let value: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(value["error"]["code"], -32700);
}
