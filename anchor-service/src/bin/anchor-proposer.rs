#[path = "common/cli.rs"]
mod cli;
#[path = "common/setup.rs"]
mod setup;

use crate::cli::{parse_direction, CommonArgs};
use anchor_core::application::{ConfigSnapshot, ConfigSource, ProposerAnchorLoop, ProposerObserver, ValidatorClientFactory};
use anchor_core::domain::Direction;
use anchor_service::client::HttpValidatorClientFactory;
use anchor_service::service::{run_proposer_loops, spawn_status_reporter, Metrics};
use clap::Parser;
use log::info;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "anchor-proposer")]
#[command(about = "Anchors finalized source-chain roots onto the destination oracle", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Run a single direction (`primary_to_secondary` or `secondary_to_primary`)
    #[arg(long, value_parser = parse_direction)]
    direction: Option<Direction>,
}

impl Cli {
    fn apply_to_env(&self) {
        self.common.apply_to_env();
        if let Some(direction) = self.direction {
            std::env::set_var("ANCHOR_PROPOSER__DIRECTION", direction.as_str());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    args.apply_to_env();
    setup::init_logging(&args.common.log_level)?;
    info!("anchor-proposer starting log_level={}", args.common.log_level);

    let (location, config) = setup::load_config(args.common.profile.clone())?;
    let chains = setup::build_chains(&config)?;
    let snapshot = Arc::new(ConfigSnapshot::new(config.clone()));
    let source: Arc<dyn ConfigSource> = Arc::new(location);
    let factory: Arc<dyn ValidatorClientFactory> =
        Arc::new(HttpValidatorClientFactory::new(Duration::from_millis(config.validator_timeout_ms()), config.rpc.token.clone()));

    let metrics = Arc::new(Metrics::new()?);
    spawn_status_reporter(metrics.clone(), Duration::from_secs(config.service.status_interval_secs));
    let observer: Arc<dyn ProposerObserver> = metrics;

    let mut loops = Vec::new();
    for direction in config.directions() {
        loops.push(ProposerAnchorLoop::with_observer(
            direction,
            chains.clone(),
            snapshot.clone(),
            factory.clone(),
            Some(source.clone()),
            observer.clone(),
        )?);
    }
    info!("proposer ready directions={} validators={}", loops.len(), config.validators.len());

    run_proposer_loops(loops, setup::shutdown_signal()).await?;
    info!("anchor-proposer stopped");
    Ok(())
}
