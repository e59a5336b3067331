use crate::harness::*;
use anchor_core::domain::digest::{anchor_proposal_digest, setting_digest};
use anchor_core::domain::signature::verify;
use anchor_core::domain::{AnchorProposal, DigestSigner, Direction, TempoKind, TempoProposal};
use anchor_core::foundation::{ContractId, StateRoot, ValidatorAddress};
use serde_json::json;

const DIRECTION: Direction = Direction::PrimaryToSecondary;

fn contract_id() -> ContractId {
    ContractId::from(CONTRACT_ID_ON_SECONDARY)
}

#[tokio::test]
async fn anchor_signature_verifies_against_the_validator_address() {
    let harness = ServiceHarness::new(3);
    harness.finalize_source(DIRECTION, T_ANCHOR);
    let proposal = harness.anchor_proposal(DIRECTION, T_ANCHOR);

    let router = harness.nodes[0].router();
    let (status, body) =
        call_rpc(&router, client_addr(10001), None, rpc_request("validator.get_anchor_signature", json!(proposal), 1)).await;

    assert!(status.is_success());
    assert_eq!(body["id"], 1);
    let address = ValidatorAddress::from(body["result"]["address"].as_str().expect("address"));
    let signature = body["result"]["signature"].as_str().expect("signature");
    assert_eq!(&address, harness.nodes[0].signer.address());
    assert!(verify(&anchor_proposal_digest(&proposal, &contract_id()), signature, &address));

    let snapshot = harness.nodes[0].state.metrics.snapshot();
    assert_eq!(snapshot.approvals_signed, 1);
    assert_eq!(snapshot.rpc_ok, 1);
}

#[tokio::test]
async fn positional_params_are_accepted() {
    let harness = ServiceHarness::new(3);
    harness.finalize_source(DIRECTION, T_ANCHOR);
    let proposal = harness.anchor_proposal(DIRECTION, T_ANCHOR);

    let router = harness.nodes[1].router();
    let (_, body) =
        call_rpc(&router, client_addr(10002), None, rpc_request("validator.get_anchor_signature", json!([proposal]), 2)).await;
    assert!(body["result"]["signature"].is_string());
}

#[tokio::test]
async fn tampered_root_comes_back_as_an_error_approval() {
    let harness = ServiceHarness::new(3);
    harness.finalize_source(DIRECTION, T_ANCHOR);
    let proposal = AnchorProposal { state_root: StateRoot::from([0xee; 32]), ..harness.anchor_proposal(DIRECTION, T_ANCHOR) };

    let router = harness.nodes[0].router();
    let (_, body) =
        call_rpc(&router, client_addr(10003), None, rpc_request("validator.get_anchor_signature", json!(proposal), 3)).await;

    assert!(body.get("error").is_none());
    let reason = body["result"]["error"].as_str().expect("rejection reason");
    assert!(reason.contains("root doesn't match"), "{reason}");
    assert!(body["result"].get("signature").is_none());
    assert_eq!(harness.nodes[0].state.metrics.snapshot().approvals_rejected, 1);
}

#[tokio::test]
async fn disabled_anchoring_is_a_json_rpc_error() {
    let harness = ServiceHarness::with_config(3, |config| config.validator.anchoring_enabled = false);
    harness.finalize_source(DIRECTION, T_ANCHOR);
    let proposal = harness.anchor_proposal(DIRECTION, T_ANCHOR);

    let router = harness.nodes[0].router();
    let (_, body) =
        call_rpc(&router, client_addr(10004), None, rpc_request("validator.get_anchor_signature", json!(proposal), 4)).await;
    assert_eq!(body["error"]["code"], -32002);
    assert!(body["error"]["message"].as_str().unwrap_or_default().contains("anchoring"));
}

#[tokio::test]
async fn tempo_update_is_signed_when_local_config_diverges() {
    let harness = ServiceHarness::with_config(3, |config| {
        config.validator.auto_update_enabled = true;
        config.bridge.primary_to_secondary.t_anchor = 25;
    });
    let proposal = TempoProposal { source_is_primary: true, tempo: 25, destination_nonce: 0 };

    let router = harness.nodes[2].router();
    let (_, body) =
        call_rpc(&router, client_addr(10005), None, rpc_request("validator.get_t_anchor_signature", json!(proposal), 5)).await;

    let signature = body["result"]["signature"].as_str().expect("signature");
    let digest = setting_digest(&proposal.clone().into_setting(TempoKind::Anchor), &contract_id());
    assert!(verify(&digest, signature, harness.nodes[2].signer.address()));
}

#[tokio::test]
async fn setting_update_without_auto_update_is_rejected() {
    let harness = ServiceHarness::new(3);
    let proposal = TempoProposal { source_is_primary: true, tempo: 25, destination_nonce: 0 };

    let router = harness.nodes[0].router();
    let (_, body) =
        call_rpc(&router, client_addr(10006), None, rpc_request("validator.get_t_final_signature", json!(proposal), 6)).await;
    assert_eq!(body["error"]["code"], -32002);
    assert!(body["error"]["message"].as_str().unwrap_or_default().contains("auto_update"));
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn malformed_params_are_invalid_params() {
    let harness = ServiceHarness::new(3);
    let router = harness.nodes[0].router();

    let (_, body) =
        call_rpc(&router, client_addr(10007), None, rpc_request("validator.get_anchor_signature", json!({ "height": "ten" }), 7)).await;
    assert_eq!(body["error"]["code"], -32602);

    let (_, body) = call_rpc(
        &router,
        client_addr(10007),
        None,
        json!({ "jsonrpc": "2.0", "method": "validator.get_oracle_signature", "id": 8 }),
    )
    .await;
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn unknown_method_and_bad_version_are_reported() {
    let harness = ServiceHarness::new(3);
    let router = harness.nodes[0].router();

    let (_, body) = call_rpc(&router, client_addr(10008), None, rpc_request("validator.get_everything", json!({}), 9)).await;
    assert_eq!(body["error"]["code"], -32601);

    let (_, body) = call_rpc(
        &router,
        client_addr(10008),
        None,
        json!({ "jsonrpc": "1.0", "method": "validator.get_anchor_signature", "params": {}, "id": 10 }),
    )
    .await;
    assert_eq!(body["error"]["code"], -32600);
}
