//! Per-direction anchoring loop run by the proposer.

use crate::application::chains::BridgeChains;
use crate::application::client::ValidatorClientFactory;
use crate::application::gather::ValidatorPool;
use crate::application::lifecycle::{AnchorState, NoopObserver, ProposerObserver};
use crate::application::settings_monitor::SettingsMonitor;
use crate::application::snapshot::{ConfigSnapshot, ConfigSource};
use crate::application::submission::{anchor_args, submit_and_confirm};
use crate::domain::digest::anchor_proposal_digest;
use crate::domain::{next_anchor_height, recovery_for, AnchorProposal, Direction, RecoveryAction, ValidatorRoster};
use crate::foundation::oracle_functions as functions;
use crate::foundation::util::time::blocks_to_duration;
use crate::foundation::{BridgeError, Result, TxId, MILLIS_PER_SECOND, SETTINGS_CHECK_INTERVAL_SECS};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// How one pass through the cycle ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Anchored { height: u64, tx_id: TxId },
    /// Anchoring is disabled; the target root was only observed.
    Monitoring { height: u64 },
    /// Someone else anchored `height` (or later) first.
    RaceLost { height: u64 },
}

pub struct ProposerAnchorLoop {
    direction: Direction,
    chains: Arc<BridgeChains>,
    snapshot: Arc<ConfigSnapshot>,
    pool: ValidatorPool,
    monitor: SettingsMonitor,
    observer: Arc<dyn ProposerObserver>,
    state: AnchorState,
    /// Last on-chain anchor period seen, used to size backoffs.
    t_anchor: u64,
}

impl ProposerAnchorLoop {
    pub fn new(
        direction: Direction,
        chains: Arc<BridgeChains>,
        snapshot: Arc<ConfigSnapshot>,
        factory: Arc<dyn ValidatorClientFactory>,
        source: Option<Arc<dyn ConfigSource>>,
    ) -> Result<Self> {
        Self::with_observer(direction, chains, snapshot, factory, source, Arc::new(NoopObserver))
    }

    pub fn with_observer(
        direction: Direction,
        chains: Arc<BridgeChains>,
        snapshot: Arc<ConfigSnapshot>,
        factory: Arc<dyn ValidatorClientFactory>,
        source: Option<Arc<dyn ConfigSource>>,
        observer: Arc<dyn ProposerObserver>,
    ) -> Result<Self> {
        let config = snapshot.load();
        let pool = ValidatorPool::from_config(&config, factory.as_ref())?;
        let monitor =
            SettingsMonitor::new(direction, Arc::clone(&chains), Arc::clone(&snapshot), source, factory, Arc::clone(&observer));
        let t_anchor = config.bridge.direction(direction).t_anchor;
        Ok(Self { direction, chains, snapshot, pool, monitor, observer, state: AnchorState::Idle, t_anchor })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> AnchorState {
        self.state
    }

    pub fn roster(&self) -> &ValidatorRoster {
        self.pool.roster()
    }

    fn transition(&mut self, next: AnchorState) {
        if self.state != next {
            debug!("proposer state direction={} from={} to={}", self.direction, self.state, next);
            self.observer.on_state_changed(self.direction, self.state, next);
            self.state = next;
        }
    }

    fn block_time_ms(&self) -> u64 {
        self.snapshot.load().block_time_ms(self.direction)
    }

    /// Fails with `ConfigurationMismatch` when the configured roster differs
    /// from the one the destination oracle enforces.
    pub async fn verify_roster(&self) -> Result<()> {
        let config = self.snapshot.load();
        let oracle = self.chains.oracle(self.direction, config.bridge.direction(self.direction)).await?;
        let onchain = oracle.validators().await?;
        if !self.pool.roster().matches_onchain(&onchain) {
            return Err(BridgeError::ConfigurationMismatch(format!(
                "direction={} configured roster ({} validators) differs from oracle {} ({} validators)",
                self.direction,
                self.pool.roster().len(),
                oracle.address(),
                onchain.len()
            )));
        }
        info!("roster matches oracle direction={} oracle={} validators={}", self.direction, oracle.address(), onchain.len());
        Ok(())
    }

    /// Sleeps `duration`, running a settings check every ten seconds when the
    /// sleep is at least that long.
    async fn sleep_with_settings(&mut self, duration: Duration) {
        let slice = Duration::from_secs(SETTINGS_CHECK_INTERVAL_SECS);
        let check = duration >= slice && self.snapshot.load().proposer.auto_update_enabled;
        let mut remaining = duration;
        while !remaining.is_zero() {
            let step = remaining.min(slice);
            tokio::time::sleep(step).await;
            remaining -= step;
            if check {
                self.check_settings().await;
            }
        }
    }

    pub async fn check_settings(&mut self) {
        match self.monitor.check(&mut self.pool).await {
            Ok(report) if report.roster_rebuilt => {
                info!("validator pool rebuilt after roster update direction={} validators={}", self.direction, self.pool.roster().len())
            }
            Ok(_) => {}
            Err(err) => warn!("settings check failed direction={} error={}", self.direction, err),
        }
    }

    async fn wait_for_height(&mut self, target: u64) -> Result<()> {
        self.transition(AnchorState::AwaitingAnchorHeight);
        let source = Arc::clone(self.chains.source(self.direction));
        loop {
            let lib = source
                .last_irreversible_height()
                .await?
                .ok_or_else(|| BridgeError::NodeNotSynced(format!("{} reports no irreversible height", source.name())))?;
            if lib >= target {
                return Ok(());
            }
            let wait = blocks_to_duration(target - lib, self.block_time_ms());
            debug!("waiting for anchor height direction={} target={} lib={} wait_ms={}", self.direction, target, lib, wait.as_millis());
            self.sleep_with_settings(wait).await;
        }
    }

    /// One full pass: read the oracle, wait for the next admissible height,
    /// collect a quorum and submit.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let config = self.snapshot.load();
        let features = config.proposer.features();
        let oracle = self.chains.oracle(self.direction, config.bridge.direction(self.direction)).await?;
        let state = oracle.state().await?;
        self.t_anchor = state.t_anchor;
        let target = next_anchor_height(state.anchor_height, state.t_anchor);
        debug!(
            "oracle state direction={} last_height={} t_anchor={} t_final={} nonce={} target={}",
            self.direction,
            state.anchor_height,
            state.t_anchor,
            state.t_final,
            state.nonce,
            target
        );

        self.wait_for_height(target).await?;
        let source = Arc::clone(self.chains.source(self.direction));
        let root = source
            .block_root(target)
            .await?
            .ok_or_else(|| BridgeError::node_rpc("block_root", format!("{} has no root at height {}", source.name(), target)))?;

        if !features.anchoring_enabled {
            info!("anchoring disabled; observed root direction={} height={} root={}", self.direction, target, root);
            return Ok(CycleOutcome::Monitoring { height: target });
        }

        self.transition(AnchorState::GatheringSignatures);
        let proposal = AnchorProposal {
            source_is_primary: self.direction.source_is_primary(),
            state_root: root,
            height: target,
            destination_nonce: oracle.nonce().await?,
        };
        let contract_id = oracle.contract_id().await?;
        let digest = anchor_proposal_digest(&proposal, &contract_id);
        info!("requesting anchor signatures {} validators={}", proposal, self.pool.roster().len());
        let quorum = self.pool.gather_anchor(&proposal, &digest).await?;

        let onchain_height = oracle.anchor_height().await?;
        if onchain_height >= target {
            info!("anchor already present; abandoning direction={} target={} onchain={}", self.direction, target, onchain_height);
            self.observer.on_race_lost(self.direction, target);
            return Ok(CycleOutcome::RaceLost { height: target });
        }

        self.transition(AnchorState::SubmittingAnchor);
        let timeout = Duration::from_millis(config.tx_result_timeout_ms());
        let args = anchor_args(&proposal, &quorum);
        let tx_id = submit_and_confirm(oracle.chain().as_ref(), oracle.address(), functions::NEW_STATE_ANCHOR, args, timeout).await?;
        info!(
            "anchor accepted direction={} height={} signers={:?} tx_id={}",
            self.direction,
            target,
            quorum.signer_indexes,
            tx_id
        );
        self.observer.on_anchor_submitted(self.direction, target, &tx_id);
        Ok(CycleOutcome::Anchored { height: target, tx_id })
    }

    /// Decides what to do after a failed cycle. `None` means stop.
    async fn recover(&mut self, err: BridgeError) -> Option<BridgeError> {
        match recovery_for(err.kind(), self.t_anchor, self.block_time_ms()) {
            RecoveryAction::Backoff(wait) => {
                warn!("anchor cycle failed; backing off direction={} wait_ms={} error={}", self.direction, wait.as_millis(), err);
                self.observer.on_anchor_failed(self.direction, &err.to_string());
                self.sleep_with_settings(wait).await;
                None
            }
            RecoveryAction::Cooldown(wait) => {
                self.transition(AnchorState::CoolingDown);
                warn!("quorum not reached; cooling down direction={} wait_ms={} error={}", self.direction, wait.as_millis(), err);
                self.observer.on_quorum_failure(self.direction);
                self.sleep_with_settings(wait).await;
                None
            }
            RecoveryAction::RestartCycle(wait) => {
                warn!("anchor submission failed; re-reading state direction={} wait_ms={} error={}", self.direction, wait.as_millis(), err);
                self.observer.on_anchor_failed(self.direction, &err.to_string());
                self.transition(AnchorState::CoolingDown);
                self.sleep_with_settings(wait).await;
                None
            }
            RecoveryAction::Abort => Some(err),
        }
    }

    /// Runs until a fatal error. I/O failures never end the loop.
    pub async fn run(mut self) -> Result<()> {
        info!("proposer loop started direction={} validators={}", self.direction, self.pool.roster().len());
        loop {
            match self.run_cycle().await {
                Ok(CycleOutcome::Anchored { .. }) | Ok(CycleOutcome::RaceLost { .. }) => {
                    self.transition(AnchorState::CoolingDown);
                }
                Ok(CycleOutcome::Monitoring { .. }) => {
                    self.transition(AnchorState::CoolingDown);
                    let period = blocks_to_duration(self.t_anchor.max(1), self.block_time_ms());
                    self.sleep_with_settings(period.max(Duration::from_millis(MILLIS_PER_SECOND))).await;
                }
                Err(err) => {
                    if let Some(fatal) = self.recover(err).await {
                        error!("proposer loop aborting direction={} error={}", self.direction, fatal);
                        return Err(fatal);
                    }
                }
            }
        }
    }
}
