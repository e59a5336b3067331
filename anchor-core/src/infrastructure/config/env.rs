use crate::foundation::BridgeError;
use crate::infrastructure::config::loader::DEFAULT_CONFIG_FILE;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "ANCHOR_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "ANCHOR_DATA_DIR";
pub const LOG_DIR_ENV: &str = "ANCHOR_LOG_DIR";

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn resolve_config_path(data_dir: &Path) -> PathBuf {
    match non_empty_env(CONFIG_PATH_ENV) {
        Some(path) => PathBuf::from(path),
        None => data_dir.join(DEFAULT_CONFIG_FILE),
    }
}

pub fn resolve_data_dir() -> Result<PathBuf, BridgeError> {
    if let Some(dir) = non_empty_env(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let cwd = std::env::current_dir().map_err(|err| BridgeError::ConfigError(format!("current_dir: {}", err)))?;
    Ok(cwd.join(".anchor"))
}

pub fn resolve_log_dir() -> Option<PathBuf> {
    non_empty_env(LOG_DIR_ENV).map(PathBuf::from)
}
