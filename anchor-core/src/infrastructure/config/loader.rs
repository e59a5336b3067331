//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Profile overrides from `[profiles.<name>]`
//! 4. Environment variables (`ANCHOR_*` prefix, `__` for nesting)

use crate::foundation::BridgeError;
use crate::infrastructure::config::types::AppConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Dict;
use figment::{Figment, Profile};
use log::{debug, info};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "anchor-config.toml";
const DEFAULT_RPC_ADDR: &str = "127.0.0.1:9841";
const DEFAULT_KEY_ENV: &str = "ANCHOR_SIGNING_KEY";
const DEFAULT_STATUS_INTERVAL_SECS: u64 = 60;

/// Environment variable prefix for config overrides.
///
/// Example: `ANCHOR_PROPOSER__AUTO_UPDATE_ENABLED=true` -> `proposer.auto_update_enabled`
const ENV_PREFIX: &str = "ANCHOR_";

/// Load configuration from the default file in `data_dir`.
pub fn load_config(data_dir: &Path) -> Result<AppConfig, BridgeError> {
    load_config_from_file(&data_dir.join(DEFAULT_CONFIG_FILE), data_dir)
}

pub fn load_config_from_file(path: &Path, data_dir: &Path) -> Result<AppConfig, BridgeError> {
    info!("loading configuration path={} data_dir={}", path.display(), data_dir.display());
    let figment = figment_base(path).merge(env_provider());
    let mut config: AppConfig =
        figment.extract().map_err(|e| BridgeError::ConfigError(format!("config extraction failed: {e}")))?;
    postprocess(&mut config, data_dir);
    debug!("configuration loaded pair={} validators={} rpc_addr={}", config.bridge.pair_name(), config.validators.len(), config.rpc.addr);
    Ok(config)
}

pub fn load_config_from_file_with_profile(path: &Path, data_dir: &Path, profile: &str) -> Result<AppConfig, BridgeError> {
    info!("loading configuration with profile path={} data_dir={} profile={}", path.display(), data_dir.display(), profile);

    // Extract once to reach the `profiles.<name>` table of the file.
    let base: AppConfig =
        figment_base(path).extract().map_err(|e| BridgeError::ConfigError(format!("config extraction failed: {e}")))?;
    let overrides = profile_overrides(&base, profile)?;

    let figment = figment_base(path).merge(Serialized::from(overrides, Profile::Default)).merge(env_provider());
    let mut config: AppConfig = figment
        .extract()
        .map_err(|e| BridgeError::ConfigError(format!("config extraction failed for profile '{profile}': {e}")))?;
    config.service.active_profile = Some(profile.to_string());
    postprocess(&mut config, data_dir);
    debug!("configuration loaded profile={} pair={} rpc_addr={}", profile, config.bridge.pair_name(), config.rpc.addr);
    Ok(config)
}

/// Parse a TOML document without touching the environment; used by tests and tooling.
pub fn load_config_from_str(toml: &str) -> Result<AppConfig, BridgeError> {
    let mut config: AppConfig = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::string(toml))
        .extract()
        .map_err(|e| BridgeError::ConfigError(format!("config extraction failed: {e}")))?;
    postprocess(&mut config, Path::new(""));
    Ok(config)
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).split("__").ignore(&["CONFIG_PATH", "DATA_DIR", "SIGNING_KEY", "LOG_DIR", "LOG_LEVEL"])
}

fn figment_base(path: &Path) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("configuration file missing; using defaults and env only path={}", path.display());
    }
    figment
}

fn profile_overrides(config: &AppConfig, profile: &str) -> Result<Dict, BridgeError> {
    let profiles = config.profiles.as_ref().ok_or_else(|| BridgeError::ConfigError("no profiles section in config".to_string()))?;
    profiles.get(profile).cloned().ok_or_else(|| BridgeError::ConfigError(format!("profile '{profile}' not found in config")))
}

fn postprocess(config: &mut AppConfig, data_dir: &Path) {
    if config.service.data_dir.trim().is_empty() {
        config.service.data_dir = data_dir.to_string_lossy().to_string();
    }
    if config.service.key_env.trim().is_empty() {
        config.service.key_env = DEFAULT_KEY_ENV.to_string();
    }
    if config.service.status_interval_secs == 0 {
        config.service.status_interval_secs = DEFAULT_STATUS_INTERVAL_SECS;
    }
    if config.rpc.addr.trim().is_empty() {
        config.rpc.addr = DEFAULT_RPC_ADDR.to_string();
    }
    for entry in &mut config.validators {
        entry.address = entry.address.normalized();
    }
}
