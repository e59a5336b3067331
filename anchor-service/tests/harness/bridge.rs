use anchor_core::application::{BridgeChains, ConfigSnapshot, ProposerAnchorLoop, ProposerObserver, ValidatorApprovalService, ValidatorClientFactory};
use anchor_core::domain::{AnchorProposal, Direction, DigestSigner, EcdsaSigner, RosterEntry};
use anchor_core::foundation::{ChainName, ContractAddress, ContractId};
use anchor_core::infrastructure::chain::memory::{OracleDeployment, OracleSnapshot};
use anchor_core::infrastructure::chain::{ChainClient, InMemoryChain};
use anchor_core::infrastructure::config::{AppConfig, BridgeConfig, ChainConfig, DirectionConfig};
use anchor_service::api::{build_router, serve, RpcState};
use anchor_service::client::HttpValidatorClientFactory;
use anchor_service::service::Metrics;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const PRIMARY_CHAIN: &str = "alpha";
pub const SECONDARY_CHAIN: &str = "beta";
pub const ORACLE_ON_SECONDARY: &str = "oracle.beta";
pub const BRIDGE_ON_SECONDARY: &str = "bridge.beta";
pub const CONTRACT_ID_ON_SECONDARY: &str = "oracle-42";
pub const ORACLE_ON_PRIMARY: &str = "oracle.alpha";
pub const BRIDGE_ON_PRIMARY: &str = "bridge.alpha";
pub const CONTRACT_ID_ON_PRIMARY: &str = "oracle-43";
pub const T_ANCHOR: u64 = 10;
pub const T_FINAL: u64 = 2;
pub const FINALITY_LAG: u64 = 2;
pub const BLOCK_TIME_MS: u64 = 10;
pub const VALIDATOR_TIMEOUT_MS: u64 = 1_000;

/// An endpoint nothing listens on.
pub const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

fn chain_config(name: &str) -> ChainConfig {
    ChainConfig { name: ChainName::from(name), rpc_url: format!("http://{}.invalid:8545", name), block_time_ms: BLOCK_TIME_MS, request_timeout_ms: 1_000 }
}

fn deployment(oracle: &str, bridge: &str, contract_id: &str, signers: &[EcdsaSigner]) -> OracleDeployment {
    OracleDeployment {
        oracle: ContractAddress::from(oracle),
        bridge: ContractAddress::from(bridge),
        contract_id: ContractId::from(contract_id),
        t_anchor: T_ANCHOR,
        t_final: T_FINAL,
        validators: signers.iter().map(|s| s.address().clone()).collect(),
    }
}

pub fn base_config(signers: &[EcdsaSigner]) -> AppConfig {
    let mut config = AppConfig::default();
    config.bridge = BridgeConfig {
        primary: chain_config(PRIMARY_CHAIN),
        secondary: chain_config(SECONDARY_CHAIN),
        primary_to_secondary: DirectionConfig {
            bridge_address: ContractAddress::from(BRIDGE_ON_SECONDARY),
            oracle_address: ContractAddress::from(ORACLE_ON_SECONDARY),
            t_anchor: T_ANCHOR,
            t_final: T_FINAL,
        },
        secondary_to_primary: DirectionConfig {
            bridge_address: ContractAddress::from(BRIDGE_ON_PRIMARY),
            oracle_address: ContractAddress::from(ORACLE_ON_PRIMARY),
            t_anchor: T_ANCHOR,
            t_final: T_FINAL,
        },
        circuit_breaker: Default::default(),
    };
    config.validators =
        signers.iter().map(|s| RosterEntry { address: s.address().clone(), endpoint: DEAD_ENDPOINT.to_string() }).collect();
    config.proposer.validator_timeout_ms = VALIDATOR_TIMEOUT_MS;
    config.proposer.tx_result_timeout_ms = 2_000;
    config.rpc.enabled = true;
    config
}

pub struct ValidatorNode {
    pub signer: Arc<EcdsaSigner>,
    pub snapshot: Arc<ConfigSnapshot>,
    pub state: Arc<RpcState>,
}

impl ValidatorNode {
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state))
    }
}

/// Two in-memory chains and N validator API states; validators can be served
/// over real HTTP on ephemeral ports.
pub struct ServiceHarness {
    pub primary: Arc<InMemoryChain>,
    pub secondary: Arc<InMemoryChain>,
    pub chains: Arc<BridgeChains>,
    pub nodes: Vec<ValidatorNode>,
    pub config: AppConfig,
    servers: Vec<JoinHandle<()>>,
}

impl ServiceHarness {
    pub fn new(validators: usize) -> Self {
        Self::with_config(validators, |_| {})
    }

    pub fn with_config(validators: usize, tune: impl Fn(&mut AppConfig)) -> Self {
        let signers: Vec<EcdsaSigner> = (1..=validators as u8).map(|seed| EcdsaSigner::from_slice(&[seed; 32]).expect("key")).collect();
        let mut config = base_config(&signers);
        tune(&mut config);

        let primary = Arc::new(InMemoryChain::new(PRIMARY_CHAIN, FINALITY_LAG));
        let secondary = Arc::new(InMemoryChain::new(SECONDARY_CHAIN, FINALITY_LAG));
        secondary.deploy_oracle(deployment(ORACLE_ON_SECONDARY, BRIDGE_ON_SECONDARY, CONTRACT_ID_ON_SECONDARY, &signers));
        primary.deploy_oracle(deployment(ORACLE_ON_PRIMARY, BRIDGE_ON_PRIMARY, CONTRACT_ID_ON_PRIMARY, &signers));
        let primary_client: Arc<dyn ChainClient> = primary.clone();
        let secondary_client: Arc<dyn ChainClient> = secondary.clone();
        let chains = Arc::new(BridgeChains::new(primary_client, secondary_client));

        let nodes = signers
            .into_iter()
            .map(|key| {
                let signer = Arc::new(key);
                let snapshot = Arc::new(ConfigSnapshot::new(config.clone()));
                let approval = Arc::new(ValidatorApprovalService::new(
                    Arc::clone(&signer) as Arc<dyn DigestSigner>,
                    Arc::clone(&chains),
                    Arc::clone(&snapshot),
                ));
                let metrics = Arc::new(Metrics::new().expect("metrics"));
                let state = Arc::new(RpcState::new(approval, metrics, &config.rpc));
                ValidatorNode { signer, snapshot, state }
            })
            .collect();

        Self { primary, secondary, chains, nodes, config, servers: Vec::new() }
    }

    /// Serves validator `index` (0-based) on an ephemeral port and points the
    /// proposer roster at it.
    pub async fn serve(&mut self, index: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let endpoint = format!("http://{}", listener.local_addr().expect("local addr"));
        let state = Arc::clone(&self.nodes[index].state);
        self.servers.push(tokio::spawn(async move {
            let _ = serve(listener, state).await;
        }));
        self.config.validators[index].endpoint = endpoint.clone();
        endpoint
    }

    pub fn source(&self, direction: Direction) -> &Arc<InMemoryChain> {
        match direction {
            Direction::PrimaryToSecondary => &self.primary,
            Direction::SecondaryToPrimary => &self.secondary,
        }
    }

    pub fn destination(&self, direction: Direction) -> &Arc<InMemoryChain> {
        match direction {
            Direction::PrimaryToSecondary => &self.secondary,
            Direction::SecondaryToPrimary => &self.primary,
        }
    }

    pub fn oracle(&self, direction: Direction) -> OracleSnapshot {
        let address = match direction {
            Direction::PrimaryToSecondary => ContractAddress::from(ORACLE_ON_SECONDARY),
            Direction::SecondaryToPrimary => ContractAddress::from(ORACLE_ON_PRIMARY),
        };
        self.destination(direction).oracle_snapshot(&address).expect("oracle deployed")
    }

    pub fn finalize_source(&self, direction: Direction, height: u64) {
        let chain = self.source(direction);
        chain.produce_blocks((height + FINALITY_LAG).saturating_sub(chain.head()));
    }

    pub fn anchor_proposal(&self, direction: Direction, height: u64) -> AnchorProposal {
        AnchorProposal {
            source_is_primary: direction.source_is_primary(),
            state_root: self.source(direction).root_at(height).expect("block"),
            height,
            destination_nonce: self.oracle(direction).nonce,
        }
    }

    /// Proposer that reaches validators over HTTP using the current roster endpoints.
    pub fn proposer(&self, direction: Direction, observer: Arc<dyn ProposerObserver>) -> ProposerAnchorLoop {
        let factory: Arc<dyn ValidatorClientFactory> =
            Arc::new(HttpValidatorClientFactory::new(Duration::from_millis(VALIDATOR_TIMEOUT_MS), self.config.rpc.token.clone()));
        let snapshot = Arc::new(ConfigSnapshot::new(self.config.clone()));
        ProposerAnchorLoop::with_observer(direction, Arc::clone(&self.chains), snapshot, factory, None, observer).expect("proposer")
    }
}

impl Drop for ServiceHarness {
    fn drop(&mut self) {
        for server in &self.servers {
            server.abort();
        }
    }
}
