#[path = "common/cli.rs"]
mod cli;
#[path = "common/setup.rs"]
mod setup;

use crate::cli::CommonArgs;
use anchor_core::application::{reload_periodically, verify_validator_membership, ConfigSnapshot, ValidatorApprovalService};
use anchor_core::domain::DigestSigner;
use anchor_core::foundation::{BridgeError, SETTINGS_CHECK_INTERVAL_SECS};
use anchor_core::infrastructure::keys::load_signer;
use anchor_service::api::{run_json_rpc_server, RpcState};
use anchor_service::service::{spawn_status_reporter, Metrics};
use clap::Parser;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "anchor-validator")]
#[command(about = "Signs anchor and oracle-settings proposals after checking them against both chains", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Override the JSON-RPC listen address
    #[arg(long)]
    rpc_addr: Option<String>,
}

impl Cli {
    fn apply_to_env(&self) {
        self.common.apply_to_env();
        if let Some(addr) = &self.rpc_addr {
            std::env::set_var("ANCHOR_RPC__ADDR", addr);
            std::env::set_var("ANCHOR_RPC__ENABLED", "true");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    args.apply_to_env();
    setup::init_logging(&args.common.log_level)?;
    info!("anchor-validator starting log_level={}", args.common.log_level);

    let (location, config) = setup::load_config(args.common.profile.clone())?;
    if !config.rpc.enabled {
        return Err(BridgeError::ConfigError("validator requires rpc.enabled = true".to_string()).into());
    }
    let (signer, _) = load_signer(&config.service)?;
    let signer_index = verify_validator_membership(&config, &signer)?;
    info!("validator identity address={} signer_index={}", signer.address(), signer_index);

    let chains = setup::build_chains(&config)?;
    let snapshot = Arc::new(ConfigSnapshot::new(config.clone()));
    tokio::spawn(reload_periodically(Arc::new(location), snapshot.clone(), Duration::from_secs(SETTINGS_CHECK_INTERVAL_SECS)));

    let metrics = Arc::new(Metrics::new()?);
    spawn_status_reporter(metrics.clone(), Duration::from_secs(config.service.status_interval_secs));

    let approval = Arc::new(ValidatorApprovalService::new(Arc::new(signer), chains, snapshot));
    let state = Arc::new(RpcState::new(approval, metrics, &config.rpc));
    let rpc_addr: SocketAddr = config.rpc.addr.parse().map_err(|err| BridgeError::ConfigError(format!("invalid rpc.addr: {}", err)))?;
    info!(
        "starting json-rpc server rpc_addr={} rate_limit_rps={} rate_limit_burst={} auth={}",
        rpc_addr,
        state.rate_limit_rps,
        state.rate_limit_burst,
        state.rpc_token.is_some()
    );

    tokio::select! {
        served = run_json_rpc_server(rpc_addr, state) => served?,
        _ = setup::shutdown_signal() => {}
    }
    info!("anchor-validator stopped");
    Ok(())
}
