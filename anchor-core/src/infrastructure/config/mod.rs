mod env;
mod loader;
mod types;
pub mod validation;

pub use env::{resolve_config_path, resolve_data_dir, resolve_log_dir, CONFIG_PATH_ENV, DATA_DIR_ENV, LOG_DIR_ENV};
pub use loader::{load_config, load_config_from_file, load_config_from_file_with_profile, load_config_from_str, DEFAULT_CONFIG_FILE};
pub use types::*;

use crate::foundation::BridgeError;
use std::path::{Path, PathBuf};

/// Where a process reads its configuration from. Re-read by the settings monitor.
#[derive(Clone, Debug)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub data_dir: PathBuf,
    pub profile: Option<String>,
}

impl ConfigLocation {
    pub fn from_env(profile: Option<String>) -> Result<Self, BridgeError> {
        let data_dir = resolve_data_dir()?;
        let path = resolve_config_path(&data_dir);
        Ok(Self { path, data_dir, profile })
    }

    pub fn load(&self) -> Result<AppConfig, BridgeError> {
        load_app_config_from(&self.path, &self.data_dir, self.profile.as_deref())
    }
}

pub fn load_app_config_from(path: &Path, data_dir: &Path, profile: Option<&str>) -> Result<AppConfig, BridgeError> {
    let config = match profile {
        Some(profile) => load_config_from_file_with_profile(path, data_dir, profile)?,
        None => load_config_from_file(path, data_dir)?,
    };
    config.validate().map_err(|errors| BridgeError::ConfigError(format!("validation failed: {}", errors.join("; "))))?;
    Ok(config)
}
