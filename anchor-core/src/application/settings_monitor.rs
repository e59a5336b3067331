//! Keeps the destination oracle's settings in line with the local configuration.

use crate::application::approval::configured_settings;
use crate::application::chains::BridgeChains;
use crate::application::client::ValidatorClientFactory;
use crate::application::gather::ValidatorPool;
use crate::application::lifecycle::ProposerObserver;
use crate::application::snapshot::{ConfigSnapshot, ConfigSource};
use crate::application::submission::{setting_call, submit_and_confirm};
use crate::domain::digest::setting_digest;
use crate::domain::{Direction, SettingChange, SettingProposal};
use crate::foundation::{Result, TxId};
use crate::infrastructure::chain::OracleView;
use crate::infrastructure::config::AppConfig;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct SettingsReport {
    pub applied: Vec<SettingChange>,
    pub failed: Vec<(SettingChange, String)>,
    pub roster_rebuilt: bool,
}

pub struct SettingsMonitor {
    direction: Direction,
    chains: Arc<BridgeChains>,
    snapshot: Arc<ConfigSnapshot>,
    source: Option<Arc<dyn ConfigSource>>,
    factory: Arc<dyn ValidatorClientFactory>,
    observer: Arc<dyn ProposerObserver>,
}

impl SettingsMonitor {
    pub fn new(
        direction: Direction,
        chains: Arc<BridgeChains>,
        snapshot: Arc<ConfigSnapshot>,
        source: Option<Arc<dyn ConfigSource>>,
        factory: Arc<dyn ValidatorClientFactory>,
        observer: Arc<dyn ProposerObserver>,
    ) -> Self {
        Self { direction, chains, snapshot, source, factory, observer }
    }

    fn reload(&self) {
        let Some(source) = &self.source else {
            return;
        };
        match source.load() {
            Ok(config) => self.snapshot.store(config),
            Err(err) => warn!("settings reload failed; keeping previous configuration direction={} error={}", self.direction, err),
        }
    }

    /// Reloads configuration, diffs it against the oracle and pushes every
    /// divergence through sign-and-submit. Rebuilds `pool` after a confirmed
    /// roster change.
    pub async fn check(&self, pool: &mut ValidatorPool) -> Result<SettingsReport> {
        self.reload();
        let config = self.snapshot.load();
        let mut report = SettingsReport::default();
        if !config.proposer.auto_update_enabled {
            return Ok(report);
        }

        let dir_cfg = config.bridge.direction(self.direction);
        let oracle = self.chains.oracle(self.direction, dir_cfg).await?;
        let onchain = oracle.state().await?.settings();
        let changes = onchain.diverged(&configured_settings(&config, self.direction));
        if changes.is_empty() {
            debug!("oracle settings in sync direction={}", self.direction);
            return Ok(report);
        }

        for change in changes {
            let needs_oracle_update = matches!(change, SettingChange::NewValidatorSet(_) | SettingChange::NewOracle(_));
            if needs_oracle_update && !config.proposer.oracle_update_enabled {
                debug!("skipping setting update; oracle updates disabled direction={} setting={}", self.direction, change.label());
                continue;
            }
            // The replacement pool is connected before the roster change is
            // submitted; once the oracle switches rosters the old pool is useless.
            let replacement = if matches!(change, SettingChange::NewValidatorSet(_)) {
                match ValidatorPool::from_config(&config, self.factory.as_ref()) {
                    Ok(next) => Some(next),
                    Err(err) => {
                        warn!("cannot connect to new roster; skipping update direction={} error={}", self.direction, err);
                        report.failed.push((change, err.to_string()));
                        continue;
                    }
                }
            } else {
                None
            };
            match self.apply(&config, &oracle, pool, &change).await {
                Ok(tx_id) => {
                    info!("settings update confirmed direction={} setting={} tx_id={}", self.direction, change.label(), tx_id);
                    self.observer.on_settings_updated(self.direction, &change);
                    if let Some(next) = replacement {
                        *pool = next;
                        report.roster_rebuilt = true;
                    }
                    report.applied.push(change);
                }
                Err(err) => {
                    warn!("settings update failed direction={} setting={} error={}", self.direction, change.label(), err);
                    report.failed.push((change, err.to_string()));
                }
            }
        }
        Ok(report)
    }

    async fn apply(&self, config: &AppConfig, oracle: &OracleView, pool: &ValidatorPool, change: &SettingChange) -> Result<TxId> {
        let proposal = SettingProposal {
            source_is_primary: self.direction.source_is_primary(),
            destination_nonce: oracle.nonce().await?,
            change: change.clone(),
        };
        let contract_id = oracle.contract_id().await?;
        let digest = setting_digest(&proposal, &contract_id);
        info!("requesting setting signatures {} validators={}", proposal, pool.roster().len());
        let quorum = pool.gather_setting(&proposal, &digest).await?;

        let (function, args) = setting_call(change, &quorum);
        let timeout = Duration::from_millis(config.tx_result_timeout_ms());
        submit_and_confirm(oracle.chain().as_ref(), oracle.address(), function, args, timeout).await
    }
}
