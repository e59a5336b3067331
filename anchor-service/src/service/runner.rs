//! Process wiring for the proposer: one task per direction, a status reporter,
//! and shutdown on a caller-supplied signal.

use crate::service::metrics::Metrics;
use anchor_core::application::ProposerAnchorLoop;
use anchor_core::foundation::{BridgeError, Result, STARTUP_RETRY_ATTEMPTS, STARTUP_RETRY_DELAY_MS};
use anchor_core::infrastructure::rpc::retry_transient;
use log::{error, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Verifies every loop's roster against the chain, then runs them until
/// `shutdown` resolves or one aborts. A startup roster mismatch fails before
/// any loop is spawned; unreachable gateways are retried a few times first.
pub async fn run_proposer_loops<S>(loops: Vec<ProposerAnchorLoop>, shutdown: S) -> Result<()>
where
    S: Future<Output = ()>,
{
    if loops.is_empty() {
        return Err(BridgeError::ConfigError("no anchoring direction selected".to_string()));
    }
    for anchor_loop in &loops {
        let delay = Duration::from_millis(STARTUP_RETRY_DELAY_MS);
        retry_transient(STARTUP_RETRY_ATTEMPTS, delay, || anchor_loop.verify_roster()).await?;
    }

    let mut tasks = JoinSet::new();
    for anchor_loop in loops {
        let direction = anchor_loop.direction();
        info!("spawning proposer task direction={}", direction);
        tasks.spawn(async move { (direction, anchor_loop.run().await) });
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested; stopping proposer tasks count={}", tasks.len());
                tasks.abort_all();
                return Ok(());
            }
            joined = tasks.join_next() => match joined {
                None => return Ok(()),
                Some(Ok((direction, Ok(())))) => info!("proposer task finished direction={}", direction),
                Some(Ok((direction, Err(err)))) => {
                    error!("proposer task aborted direction={} error={}", direction, err);
                    tasks.abort_all();
                    return Err(err);
                }
                Some(Err(err)) => {
                    tasks.abort_all();
                    return Err(BridgeError::Message(format!("proposer task panicked: {}", err)));
                }
            }
        }
    }
}

pub fn spawn_status_reporter(metrics: Arc<Metrics>, interval: Duration) {
    if interval.is_zero() {
        warn!("status reporter disabled");
        return;
    }
    tokio::spawn(async move {
        info!("status reporter started interval_seconds={}", interval.as_secs());
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let snapshot = metrics.snapshot();
            info!(
                "periodic status report uptime_minutes={} approvals_signed={} approvals_rejected={} anchors_submitted={} anchor_failures={} quorum_failures={} races_lost={} settings_updates={} rpc_ok={} rpc_error={}",
                snapshot.uptime.as_secs() / 60,
                snapshot.approvals_signed,
                snapshot.approvals_rejected,
                snapshot.anchors_submitted,
                snapshot.anchor_failures,
                snapshot.quorum_failures,
                snapshot.races_lost,
                snapshot.settings_updates,
                snapshot.rpc_ok,
                snapshot.rpc_error
            );
        }
    });
}
