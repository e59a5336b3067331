use anchor_core::application::{AnchorState, ProposerObserver};
use anchor_core::domain::{Direction, SettingChange};
use anchor_core::foundation::{BridgeError, TxId};
use log::debug;
use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Registry, TextEncoder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub approvals_signed: u64,
    pub approvals_rejected: u64,
    pub anchors_submitted: u64,
    pub anchor_failures: u64,
    pub quorum_failures: u64,
    pub races_lost: u64,
    pub settings_updates: u64,
    pub rpc_ok: u64,
    pub rpc_error: u64,
}

pub struct Metrics {
    registry: Registry,
    approvals_total: IntCounterVec,
    rpc_requests_total: IntCounterVec,
    anchors_submitted_total: IntCounterVec,
    anchor_failures_total: IntCounterVec,
    quorum_failures_total: IntCounterVec,
    races_lost_total: IntCounterVec,
    settings_updates_total: IntCounterVec,
    last_anchor_height: IntGaugeVec,
    proposer_state: IntGaugeVec,
    started_at: Instant,
    approvals_signed: AtomicU64,
    approvals_rejected: AtomicU64,
    anchors_submitted: AtomicU64,
    anchor_failures: AtomicU64,
    quorum_failures: AtomicU64,
    races_lost: AtomicU64,
    settings_updates: AtomicU64,
    rpc_ok: AtomicU64,
    rpc_error: AtomicU64,
}

fn metric_err(err: prometheus::Error) -> BridgeError {
    BridgeError::Message(format!("metrics: {}", err))
}

fn state_code(state: AnchorState) -> i64 {
    match state {
        AnchorState::Idle => 0,
        AnchorState::AwaitingAnchorHeight => 1,
        AnchorState::GatheringSignatures => 2,
        AnchorState::SubmittingAnchor => 3,
        AnchorState::CoolingDown => 4,
    }
}

impl Metrics {
    pub fn new() -> Result<Self, BridgeError> {
        debug!("initializing prometheus metrics");
        let registry = Registry::new();
        let approvals_total =
            IntCounterVec::new(prometheus::Opts::new("approvals_total", "Validator approvals by method and outcome"), &["method", "outcome"])
                .map_err(metric_err)?;
        let rpc_requests_total = IntCounterVec::new(
            prometheus::Opts::new("rpc_requests_total", "RPC requests by method and status"),
            &["method", "status"],
        )
        .map_err(metric_err)?;
        let anchors_submitted_total =
            IntCounterVec::new(prometheus::Opts::new("anchors_submitted_total", "Anchors confirmed on chain"), &["direction"])
                .map_err(metric_err)?;
        let anchor_failures_total =
            IntCounterVec::new(prometheus::Opts::new("anchor_failures_total", "Anchor cycles that ended in an error"), &["direction"])
                .map_err(metric_err)?;
        let quorum_failures_total =
            IntCounterVec::new(prometheus::Opts::new("quorum_failures_total", "Cycles without a validator majority"), &["direction"])
                .map_err(metric_err)?;
        let races_lost_total =
            IntCounterVec::new(prometheus::Opts::new("races_lost_total", "Anchors already landed by another proposer"), &["direction"])
                .map_err(metric_err)?;
        let settings_updates_total = IntCounterVec::new(
            prometheus::Opts::new("settings_updates_total", "Oracle settings pushed on chain"),
            &["direction", "setting"],
        )
        .map_err(metric_err)?;
        let last_anchor_height =
            IntGaugeVec::new(prometheus::Opts::new("last_anchor_height", "Height of the last anchor this proposer landed"), &["direction"])
                .map_err(metric_err)?;
        let proposer_state =
            IntGaugeVec::new(prometheus::Opts::new("proposer_state", "Current anchor loop state code"), &["direction"]).map_err(metric_err)?;

        registry.register(Box::new(approvals_total.clone())).map_err(metric_err)?;
        registry.register(Box::new(rpc_requests_total.clone())).map_err(metric_err)?;
        registry.register(Box::new(anchors_submitted_total.clone())).map_err(metric_err)?;
        registry.register(Box::new(anchor_failures_total.clone())).map_err(metric_err)?;
        registry.register(Box::new(quorum_failures_total.clone())).map_err(metric_err)?;
        registry.register(Box::new(races_lost_total.clone())).map_err(metric_err)?;
        registry.register(Box::new(settings_updates_total.clone())).map_err(metric_err)?;
        registry.register(Box::new(last_anchor_height.clone())).map_err(metric_err)?;
        registry.register(Box::new(proposer_state.clone())).map_err(metric_err)?;

        let out = Self {
            registry,
            approvals_total,
            rpc_requests_total,
            anchors_submitted_total,
            anchor_failures_total,
            quorum_failures_total,
            races_lost_total,
            settings_updates_total,
            last_anchor_height,
            proposer_state,
            started_at: Instant::now(),
            approvals_signed: AtomicU64::new(0),
            approvals_rejected: AtomicU64::new(0),
            anchors_submitted: AtomicU64::new(0),
            anchor_failures: AtomicU64::new(0),
            quorum_failures: AtomicU64::new(0),
            races_lost: AtomicU64::new(0),
            settings_updates: AtomicU64::new(0),
            rpc_ok: AtomicU64::new(0),
            rpc_error: AtomicU64::new(0),
        };
        debug!("prometheus metrics registered metric_count=9");
        Ok(out)
    }

    /// `outcome` is `signed`, `rejected` or `error`.
    pub fn inc_approval(&self, method: &str, outcome: &str) {
        self.approvals_total.with_label_values(&[method, outcome]).inc();
        match outcome {
            "signed" => {
                self.approvals_signed.fetch_add(1, Ordering::Relaxed);
            }
            "rejected" => {
                self.approvals_rejected.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    pub fn inc_rpc_request(&self, method: &str, status: &str) {
        self.rpc_requests_total.with_label_values(&[method, status]).inc();
        match status {
            "ok" => {
                self.rpc_ok.fetch_add(1, Ordering::Relaxed);
            }
            "error" => {
                self.rpc_error.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.started_at.elapsed(),
            approvals_signed: self.approvals_signed.load(Ordering::Relaxed),
            approvals_rejected: self.approvals_rejected.load(Ordering::Relaxed),
            anchors_submitted: self.anchors_submitted.load(Ordering::Relaxed),
            anchor_failures: self.anchor_failures.load(Ordering::Relaxed),
            quorum_failures: self.quorum_failures.load(Ordering::Relaxed),
            races_lost: self.races_lost.load(Ordering::Relaxed),
            settings_updates: self.settings_updates.load(Ordering::Relaxed),
            rpc_ok: self.rpc_ok.load(Ordering::Relaxed),
            rpc_error: self.rpc_error.load(Ordering::Relaxed),
        }
    }

    pub fn encode(&self) -> Result<String, BridgeError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer).map_err(metric_err)?;
        String::from_utf8(buffer).map_err(|err| BridgeError::Message(err.to_string()))
    }
}

impl ProposerObserver for Metrics {
    fn on_state_changed(&self, direction: Direction, _from: AnchorState, to: AnchorState) {
        self.proposer_state.with_label_values(&[direction.as_str()]).set(state_code(to));
    }

    fn on_anchor_submitted(&self, direction: Direction, height: u64, _tx_id: &TxId) {
        self.anchors_submitted_total.with_label_values(&[direction.as_str()]).inc();
        self.last_anchor_height.with_label_values(&[direction.as_str()]).set(i64::try_from(height).unwrap_or(i64::MAX));
        self.anchors_submitted.fetch_add(1, Ordering::Relaxed);
    }

    fn on_anchor_failed(&self, direction: Direction, _reason: &str) {
        self.anchor_failures_total.with_label_values(&[direction.as_str()]).inc();
        self.anchor_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn on_quorum_failure(&self, direction: Direction) {
        self.quorum_failures_total.with_label_values(&[direction.as_str()]).inc();
        self.quorum_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn on_race_lost(&self, direction: Direction, _height: u64) {
        self.races_lost_total.with_label_values(&[direction.as_str()]).inc();
        self.races_lost.fetch_add(1, Ordering::Relaxed);
    }

    fn on_settings_updated(&self, direction: Direction, change: &SettingChange) {
        self.settings_updates_total.with_label_values(&[direction.as_str(), change.label()]).inc();
        self.settings_updates.fetch_add(1, Ordering::Relaxed);
    }
}
