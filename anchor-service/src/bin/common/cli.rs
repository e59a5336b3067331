use anchor_core::domain::Direction;
use anchor_core::infrastructure::config::{CONFIG_PATH_ENV, DATA_DIR_ENV};
use clap::Args;
use std::path::PathBuf;

/// Flags shared by both processes.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Profile from `[profiles.<name>]` to apply on top of the file
    #[arg(short, long, env = "ANCHOR_PROFILE")]
    pub profile: Option<String>,

    /// Log filters, e.g. `info,anchor_core=debug,reqwest=warn`
    #[arg(short, long, default_value = "info", env = "ANCHOR_LOG_LEVEL")]
    pub log_level: String,
}

impl CommonArgs {
    pub fn apply_to_env(&self) {
        if let Some(config_path) = &self.config {
            std::env::set_var(CONFIG_PATH_ENV, config_path);
        }
        if let Some(data_dir) = &self.data_dir {
            std::env::set_var(DATA_DIR_ENV, data_dir);
        }
    }
}

#[allow(dead_code)]
pub fn parse_direction(value: &str) -> Result<Direction, String> {
    Direction::ALL
        .into_iter()
        .find(|direction| direction.as_str() == value.trim())
        .ok_or_else(|| format!("expected one of: {}, {}", Direction::PrimaryToSecondary, Direction::SecondaryToPrimary))
}
