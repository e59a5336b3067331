use crate::foundation::{BridgeError, FailureKind};
use log::debug;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retries `op` up to `attempts` times with a fixed `delay`, but only while the
/// error is transient. Any other failure is returned at once.
pub async fn retry_transient<F, Fut, T>(attempts: usize, delay: Duration, mut op: F) -> Result<T, BridgeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BridgeError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.kind() == FailureKind::Transient && attempt < attempts => {
                debug!("retrying transient failure attempt={} of={} error={}", attempt, attempts, err);
                attempt += 1;
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
