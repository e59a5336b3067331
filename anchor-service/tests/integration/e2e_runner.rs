use crate::harness::*;
use anchor_core::application::ProposerObserver;
use anchor_core::domain::Direction;
use anchor_core::foundation::{BridgeError, FailureKind};
use anchor_service::service::{run_proposer_loops, Metrics};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn runner_anchors_both_directions_until_shutdown() {
    let mut harness = ServiceHarness::new(3);
    for index in 0..3 {
        harness.serve(index).await;
    }
    for direction in Direction::ALL {
        harness.finalize_source(direction, T_ANCHOR);
    }

    let metrics = Arc::new(Metrics::new().expect("metrics"));
    let observer: Arc<dyn ProposerObserver> = metrics.clone();
    let loops = Direction::ALL.into_iter().map(|direction| harness.proposer(direction, observer.clone())).collect();

    let both_anchored = async {
        while Direction::ALL.into_iter().any(|direction| harness.oracle(direction).nonce == 0) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(20), run_proposer_loops(loops, both_anchored))
        .await
        .expect("runner finished in time")
        .expect("clean shutdown");

    for direction in Direction::ALL {
        assert_eq!(harness.oracle(direction).anchor_height, T_ANCHOR);
    }
    assert_eq!(metrics.snapshot().anchors_submitted, 2);
}

#[tokio::test]
async fn runner_refuses_to_start_on_roster_mismatch() {
    let mut harness = ServiceHarness::new(3);
    harness.config.validators.swap(0, 1);
    let loops = vec![harness.proposer(Direction::PrimaryToSecondary, Arc::new(anchor_core::application::NoopObserver))];

    let err = run_proposer_loops(loops, std::future::pending()).await.unwrap_err();
    assert!(matches!(err, BridgeError::ConfigurationMismatch(_)), "{err}");
    assert_eq!(err.kind(), FailureKind::Fatal);
}

#[tokio::test]
async fn runner_needs_at_least_one_direction() {
    let err = run_proposer_loops(Vec::new(), std::future::pending()).await.unwrap_err();
    assert!(matches!(err, BridgeError::ConfigError(_)));
}
