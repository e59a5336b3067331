use crate::foundation::Result;
use crate::infrastructure::config::{AppConfig, ConfigLocation};
use arc_swap::ArcSwap;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Immutable configuration shared by every task of a process. Readers take a
/// cheap `Arc` to the current value; a reload swaps in a whole new one.
pub struct ConfigSnapshot {
    current: ArcSwap<AppConfig>,
}

impl ConfigSnapshot {
    pub fn new(config: AppConfig) -> Self {
        Self { current: ArcSwap::from_pointee(config) }
    }

    pub fn load(&self) -> Arc<AppConfig> {
        self.current.load_full()
    }

    pub fn store(&self, config: AppConfig) {
        self.current.store(Arc::new(config));
    }
}

/// Where a fresh configuration comes from on reload.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<AppConfig>;
}

impl ConfigSource for ConfigLocation {
    fn load(&self) -> Result<AppConfig> {
        ConfigLocation::load(self)
    }
}

/// Reloads `source` into `snapshot` every `interval`. A file that fails to load
/// or validate leaves the previous snapshot in place.
pub async fn reload_periodically(source: Arc<dyn ConfigSource>, snapshot: Arc<ConfigSnapshot>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match source.load() {
            Ok(config) => {
                debug!("configuration reloaded validators={}", config.validators.len());
                snapshot.store(config);
            }
            Err(err) => warn!("configuration reload failed; keeping previous snapshot error={}", err),
        }
    }
}

pub fn log_snapshot(config: &AppConfig) {
    info!(
        "configuration pair={} validators={} anchoring={} auto_update={} oracle_update={}",
        config.bridge.pair_name(),
        config.validators.len(),
        config.proposer.anchoring_enabled,
        config.proposer.auto_update_enabled,
        config.proposer.oracle_update_enabled
    );
}
