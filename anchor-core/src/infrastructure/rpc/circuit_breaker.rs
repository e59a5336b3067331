use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::foundation::CIRCUIT_BREAKER_BASE_BACKOFF_SECS;

const MAX_BACKOFF_EXPONENT_SHIFT: u32 = 30;
/// Open duration is scaled by a factor in `[1 - JITTER, 1 + JITTER]`.
const JITTER_FRACTION: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Cap on the open interval (seconds).
    #[serde(default = "default_open_duration_secs")]
    pub open_duration_secs: u64,
    /// Successes required in half-open before closing.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_open_duration_secs() -> u64 {
    30
}

const fn default_success_threshold() -> u32 {
    2
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            open_duration_secs: default_open_duration_secs(),
            success_threshold: default_success_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed { failures: u32 },
    Open { until: Instant, open_count: u32 },
    HalfOpen { successes: u32, open_count: u32 },
}

/// Closed/Open/HalfOpen breaker guarding one chain endpoint.
pub struct CircuitBreaker {
    name: String,
    cfg: CircuitBreakerConfig,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, cfg: CircuitBreakerConfig) -> Self {
        Self { name: name.into(), cfg, state: Mutex::new(State::Closed { failures: 0 }) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), State::Open { until, .. } if Instant::now() < until)
    }

    pub fn allow(&self) -> bool {
        let now = Instant::now();
        let mut guard = self.state.lock();
        match *guard {
            State::Closed { .. } | State::HalfOpen { .. } => true,
            State::Open { until, open_count } if now < until => {
                debug!(
                    "circuit breaker open; denying request name={} open_for_ms={} open_count={}",
                    self.name,
                    until.saturating_duration_since(now).as_millis(),
                    open_count
                );
                false
            }
            State::Open { open_count, .. } => {
                info!("circuit breaker open->half_open name={} open_count={}", self.name, open_count);
                *guard = State::HalfOpen { successes: 0, open_count };
                true
            }
        }
    }

    pub fn record_success(&self) {
        let mut guard = self.state.lock();
        match *guard {
            State::Closed { failures } => {
                if failures > 0 {
                    debug!("circuit breaker success; resetting name={} failures={}", self.name, failures);
                }
                *guard = State::Closed { failures: 0 };
            }
            State::HalfOpen { successes, open_count } => {
                let next = successes.saturating_add(1);
                if next >= self.cfg.success_threshold.max(1) {
                    info!("circuit breaker half_open->closed name={} successes={}", self.name, next);
                    *guard = State::Closed { failures: 0 };
                } else {
                    *guard = State::HalfOpen { successes: next, open_count };
                }
            }
            State::Open { .. } => {}
        }
    }

    pub fn record_failure(&self) {
        let mut guard = self.state.lock();
        match *guard {
            State::Closed { failures } => {
                let next = failures.saturating_add(1);
                if next >= self.cfg.failure_threshold.max(1) {
                    let open_for = self.open_duration(1);
                    warn!(
                        "circuit breaker opened name={} failures={} open_for_ms={}",
                        self.name,
                        next,
                        open_for.as_millis()
                    );
                    *guard = State::Open { until: Instant::now() + open_for, open_count: 1 };
                } else {
                    *guard = State::Closed { failures: next };
                }
            }
            State::HalfOpen { open_count, .. } => {
                let next_count = open_count.saturating_add(1);
                let open_for = self.open_duration(next_count);
                warn!(
                    "circuit breaker re-opened from half-open name={} open_for_ms={} open_count={}",
                    self.name,
                    open_for.as_millis(),
                    next_count
                );
                *guard = State::Open { until: Instant::now() + open_for, open_count: next_count };
            }
            State::Open { .. } => {}
        }
    }

    /// Exponential in `open_count`, capped at `open_duration_secs`, with jitter.
    fn open_duration(&self, open_count: u32) -> Duration {
        let base = Duration::from_secs(CIRCUIT_BREAKER_BASE_BACKOFF_SECS);
        let max = Duration::from_secs(self.cfg.open_duration_secs.max(1));
        let shift = open_count.saturating_sub(1).min(MAX_BACKOFF_EXPONENT_SHIFT);
        let capped = base.checked_mul(1u32 << shift).unwrap_or(max).min(max);
        let factor = rand::thread_rng().gen_range((1.0 - JITTER_FRACTION)..=(1.0 + JITTER_FRACTION));
        capped.mul_f64(factor).max(Duration::from_millis(1))
    }
}
