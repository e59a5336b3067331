use anchor_core::application::snapshot::log_snapshot;
use anchor_core::application::BridgeChains;
use anchor_core::foundation::BridgeError;
use anchor_core::infrastructure::chain::HttpChainClient;
use anchor_core::infrastructure::config::{resolve_log_dir, AppConfig, ConfigLocation};
use anchor_core::infrastructure::logging::init_logger;
use log::info;
use std::sync::Arc;

pub fn init_logging(filters: &str) -> Result<(), BridgeError> {
    let log_dir = resolve_log_dir();
    init_logger(log_dir.as_deref(), filters)
}

/// Resolves the config location from env and CLI, loads and validates it.
pub fn load_config(profile: Option<String>) -> Result<(ConfigLocation, AppConfig), BridgeError> {
    let profile = profile.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    let location = ConfigLocation::from_env(profile)?;
    info!(
        "loading configuration path={} data_dir={} profile={}",
        location.path.display(),
        location.data_dir.display(),
        location.profile.as_deref().unwrap_or("-")
    );
    let config = location.load()?;
    log_snapshot(&config);
    Ok((location, config))
}

pub fn build_chains(config: &AppConfig) -> Result<Arc<BridgeChains>, BridgeError> {
    let breaker = config.bridge.circuit_breaker;
    let primary = HttpChainClient::new(&config.bridge.primary, None, breaker)?;
    let secondary = HttpChainClient::new(&config.bridge.secondary, None, breaker)?;
    info!("chain gateways primary={} secondary={}", primary.url(), secondary.url());
    let chains = Arc::new(BridgeChains::new(Arc::new(primary), Arc::new(secondary)));
    chains.describe();
    Ok(chains)
}

pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => log::warn!("failed to listen for ctrl-c error={}", err),
    }
}
