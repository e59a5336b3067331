use crate::fixtures::*;
use anchor_core::application::{watch_anchor_events, CycleOutcome};
use anchor_core::domain::Direction;
use anchor_core::foundation::{BridgeError, FailureKind};
use serde_json::json;
use std::time::Duration;

const DIRECTION: Direction = Direction::PrimaryToSecondary;

#[tokio::test]
async fn anchors_with_validators_one_and_three_when_two_is_offline() {
    let harness = BridgeHarness::new(3);
    harness.finalize_source(DIRECTION, T_ANCHOR);
    harness.set_offline(2, true);

    let mut proposer = harness.proposer(DIRECTION);
    let outcome = proposer.run_cycle().await.expect("anchor cycle");
    assert!(matches!(outcome, CycleOutcome::Anchored { height: T_ANCHOR, .. }));

    let oracle = harness.oracle(DIRECTION);
    assert_eq!(oracle.anchor_height, T_ANCHOR);
    assert_eq!(oracle.anchor_root, harness.primary.root_at(T_ANCHOR).unwrap());
    assert_eq!(oracle.nonce, 1);

    let call = harness.secondary.calls().pop().expect("anchor call");
    assert_eq!(call.function, "newStateAnchor");
    assert_eq!(call.args[2], json!([1, 3]));
}

#[tokio::test]
async fn single_signature_of_three_is_a_quorum_failure() {
    let harness = BridgeHarness::new(3);
    harness.finalize_source(DIRECTION, T_ANCHOR);
    harness.set_offline(2, true);
    harness.set_offline(3, true);

    let mut proposer = harness.proposer(DIRECTION);
    let err = proposer.run_cycle().await.unwrap_err();
    match &err {
        BridgeError::ValidatorMajority { required, received, total } => assert_eq!((*required, *received, *total), (2, 1, 3)),
        other => panic!("expected majority error, got {other}"),
    }
    assert_eq!(err.kind(), FailureKind::QuorumFailure);
    assert!(harness.secondary.calls().is_empty());
    assert_eq!(harness.oracle(DIRECTION).nonce, 0);
}

#[tokio::test]
async fn four_validators_submit_exactly_three_signatures() {
    let harness = BridgeHarness::new(4);
    harness.finalize_source(DIRECTION, T_ANCHOR);

    let mut proposer = harness.proposer(DIRECTION);
    proposer.run_cycle().await.expect("anchor cycle");

    let call = harness.secondary.calls().pop().expect("anchor call");
    assert_eq!(call.args[2], json!([1, 2, 3]));
    assert_eq!(call.args[3].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn consecutive_cycles_advance_by_the_anchor_period() {
    let harness = BridgeHarness::new(3);
    harness.finalize_source(DIRECTION, 2 * T_ANCHOR);
    let mut proposer = harness.proposer(DIRECTION);

    proposer.run_cycle().await.expect("first anchor");
    let second = proposer.run_cycle().await.expect("second anchor");
    assert!(matches!(second, CycleOutcome::Anchored { height, .. } if height == 2 * T_ANCHOR));
    assert_eq!(harness.oracle(DIRECTION).nonce, 2);
}

#[tokio::test]
async fn both_directions_anchor_independently() {
    let harness = BridgeHarness::new(3);
    for direction in Direction::ALL {
        harness.finalize_source(direction, T_ANCHOR);
    }
    let mut forward = harness.proposer(Direction::PrimaryToSecondary);
    let mut backward = harness.proposer(Direction::SecondaryToPrimary);
    let (a, b) = tokio::join!(forward.run_cycle(), backward.run_cycle());
    a.expect("primary to secondary");
    b.expect("secondary to primary");

    assert_eq!(harness.oracle(Direction::PrimaryToSecondary).anchor_root, harness.primary.root_at(T_ANCHOR).unwrap());
    assert_eq!(harness.oracle(Direction::SecondaryToPrimary).anchor_root, harness.secondary.root_at(T_ANCHOR).unwrap());
}

#[tokio::test]
async fn disabled_anchoring_only_observes() {
    let harness = BridgeHarness::with_config(3, |config| config.proposer.anchoring_enabled = false);
    harness.finalize_source(DIRECTION, T_ANCHOR);

    let mut proposer = harness.proposer(DIRECTION);
    let outcome = proposer.run_cycle().await.expect("monitor cycle");
    assert_eq!(outcome, CycleOutcome::Monitoring { height: T_ANCHOR });
    assert!(harness.secondary.calls().is_empty());
}

#[tokio::test]
async fn missing_finality_is_transient() {
    let harness = BridgeHarness::new(3);
    harness.finalize_source(DIRECTION, T_ANCHOR);
    harness.primary.set_lib_unavailable(true);

    let mut proposer = harness.proposer(DIRECTION);
    let err = proposer.run_cycle().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transient);
}

#[tokio::test]
async fn roster_check_detects_reordered_configuration() {
    let harness = BridgeHarness::new(3);
    harness.proposer(DIRECTION).verify_roster().await.expect("roster matches");

    harness.update_configs(|config| config.validators.reverse());
    let err = harness.proposer(DIRECTION).verify_roster().await.unwrap_err();
    assert!(matches!(err, BridgeError::ConfigurationMismatch(_)));
    assert_eq!(err.kind(), FailureKind::Fatal);
}

#[tokio::test]
async fn anchor_events_reach_watchers() {
    let harness = BridgeHarness::new(3);
    harness.finalize_source(DIRECTION, T_ANCHOR);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let chains = harness.chains.clone();
    let config = harness.proposer_snapshot.load().bridge.primary_to_secondary.clone();
    let watcher = tokio::spawn(async move {
        watch_anchor_events(&chains, DIRECTION, &config, 0, move |event| {
            let _ = tx.send(event.args.clone());
        })
        .await
    });

    harness.proposer(DIRECTION).run_cycle().await.expect("anchor cycle");
    let args = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.expect("event in time").expect("event");
    assert_eq!(args["height"], json!(T_ANCHOR));
    watcher.abort();
}
