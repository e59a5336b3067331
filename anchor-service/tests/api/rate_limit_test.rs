use crate::harness::*;
use anchor_service::api::build_router;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn rpc_is_rate_limited_per_client() {
    let harness = ServiceHarness::new(3);
    let mut state = (*harness.nodes[0].state).clone();
    state.rate_limit_rps = 1;
    state.rate_limit_burst = 0;
    let router = build_router(Arc::new(state));
    let request = rpc_request("does.not.exist", json!({}), 1);

    let (status, _) = call_rpc(&router, client_addr(10301), None, request.clone()).await;
    assert!(status.is_success());
    let (status, _) = call_rpc(&router, client_addr(10301), None, request.clone()).await;
    assert_eq!(status.as_u16(), 429);

    let other = std::net::SocketAddr::from(([127, 0, 0, 2], 10301));
    let (status, _) = call_rpc(&router, other, None, request).await;
    assert!(status.is_success());
}
