#![allow(dead_code)]

use crate::fixtures::*;
use anchor_core::application::{
    BridgeChains, ConfigSnapshot, LocalValidatorClient, ProposerAnchorLoop, ValidatorApprovalService, ValidatorClient, ValidatorClientFactory,
};
use anchor_core::domain::{AnchorProposal, Approval, Direction, DigestSigner, EcdsaSigner, RosterEntry, SettingProposal};
use anchor_core::foundation::{BridgeError, ContractAddress, Result};
use anchor_core::infrastructure::chain::memory::OracleSnapshot;
use anchor_core::infrastructure::chain::{ChainClient, InMemoryChain};
use anchor_core::infrastructure::config::AppConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Routes roster endpoints to in-process approval services and lets tests take
/// validators offline.
#[derive(Default)]
pub struct LocalClientFactory {
    services: Mutex<HashMap<String, Arc<ValidatorApprovalService>>>,
    offline: Arc<Mutex<HashSet<String>>>,
}

impl LocalClientFactory {
    pub fn register(&self, endpoint: String, service: Arc<ValidatorApprovalService>) {
        self.services.lock().insert(endpoint, service);
    }

    pub fn set_offline(&self, endpoint: &str, offline: bool) {
        let mut set = self.offline.lock();
        if offline {
            set.insert(endpoint.to_string());
        } else {
            set.remove(endpoint);
        }
    }
}

struct SwitchableClient {
    inner: LocalValidatorClient,
    endpoint: String,
    offline: Arc<Mutex<HashSet<String>>>,
}

impl SwitchableClient {
    fn check_online(&self) -> Result<()> {
        if self.offline.lock().contains(&self.endpoint) {
            return Err(BridgeError::ValidatorRpc { validator: self.endpoint.clone(), details: "connection refused".to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl ValidatorClient for SwitchableClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn anchor_signature(&self, proposal: &AnchorProposal) -> Result<Approval> {
        self.check_online()?;
        self.inner.anchor_signature(proposal).await
    }

    async fn setting_signature(&self, proposal: &SettingProposal) -> Result<Approval> {
        self.check_online()?;
        self.inner.setting_signature(proposal).await
    }
}

impl ValidatorClientFactory for LocalClientFactory {
    fn connect(&self, entry: &RosterEntry) -> Result<Arc<dyn ValidatorClient>> {
        let service = self
            .services
            .lock()
            .get(&entry.endpoint)
            .cloned()
            .ok_or_else(|| BridgeError::ConfigError(format!("no local validator at {}", entry.endpoint)))?;
        Ok(Arc::new(SwitchableClient {
            inner: LocalValidatorClient::new(entry.endpoint.clone(), service),
            endpoint: entry.endpoint.clone(),
            offline: Arc::clone(&self.offline),
        }))
    }
}

/// Two in-memory chains with an oracle per direction, N validators (each with
/// its own configuration snapshot) and a proposer snapshot.
pub struct BridgeHarness {
    pub primary: Arc<InMemoryChain>,
    pub secondary: Arc<InMemoryChain>,
    pub chains: Arc<BridgeChains>,
    pub signers: Vec<Arc<EcdsaSigner>>,
    pub validator_snapshots: Vec<Arc<ConfigSnapshot>>,
    pub services: Vec<Arc<ValidatorApprovalService>>,
    pub proposer_snapshot: Arc<ConfigSnapshot>,
    pub factory: Arc<LocalClientFactory>,
}

impl BridgeHarness {
    pub fn new(validators: usize) -> Self {
        Self::with_config(validators, |_| {})
    }

    /// `tune` adjusts the shared starting configuration (proposer and validators alike).
    pub fn with_config(validators: usize, tune: impl Fn(&mut AppConfig)) -> Self {
        let keys = signers(validators);
        let mut config = app_config(&keys);
        tune(&mut config);

        let primary = Arc::new(InMemoryChain::new(PRIMARY_CHAIN, FINALITY_LAG));
        let secondary = Arc::new(InMemoryChain::new(SECONDARY_CHAIN, FINALITY_LAG));
        secondary.deploy_oracle(deployment_on_secondary(addresses(&keys)));
        primary.deploy_oracle(deployment_on_primary(addresses(&keys)));

        let primary_client: Arc<dyn ChainClient> = primary.clone();
        let secondary_client: Arc<dyn ChainClient> = secondary.clone();
        let chains = Arc::new(BridgeChains::new(primary_client, secondary_client));

        let factory = Arc::new(LocalClientFactory::default());
        let mut harness = Self {
            primary,
            secondary,
            chains,
            signers: Vec::new(),
            validator_snapshots: Vec::new(),
            services: Vec::new(),
            proposer_snapshot: Arc::new(ConfigSnapshot::new(config.clone())),
            factory,
        };
        for key in keys {
            harness.add_validator(key, config.clone());
        }
        harness
    }

    /// Starts one more validator process with `config`; it is not in any roster yet.
    pub fn add_validator(&mut self, key: EcdsaSigner, config: AppConfig) -> usize {
        let index = self.signers.len();
        let signer = Arc::new(key);
        let snapshot = Arc::new(ConfigSnapshot::new(config));
        let service = Arc::new(ValidatorApprovalService::new(
            Arc::clone(&signer) as Arc<dyn DigestSigner>,
            Arc::clone(&self.chains),
            Arc::clone(&snapshot),
        ));
        self.factory.register(endpoint(index), Arc::clone(&service));
        self.signers.push(signer);
        self.validator_snapshots.push(snapshot);
        self.services.push(service);
        index
    }

    /// Applies `change` to the proposer's and every validator's configuration.
    pub fn update_configs(&self, change: impl Fn(&mut AppConfig)) {
        for snapshot in self.validator_snapshots.iter().chain(std::iter::once(&self.proposer_snapshot)) {
            let mut config = (*snapshot.load()).clone();
            change(&mut config);
            snapshot.store(config);
        }
    }

    /// Takes validator `index` (1-based, as on chain) offline or back online.
    pub fn set_offline(&self, index: usize, offline: bool) {
        self.factory.set_offline(&endpoint(index - 1), offline);
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

    pub fn oracle_address(direction: Direction) -> ContractAddress {
        match direction {
            Direction::PrimaryToSecondary => ContractAddress::from(ORACLE_ON_SECONDARY),
            Direction::SecondaryToPrimary => ContractAddress::from(ORACLE_ON_PRIMARY),
        }
    }

    pub fn oracle(&self, direction: Direction) -> OracleSnapshot {
        self.destination(direction).oracle_snapshot(&Self::oracle_address(direction)).expect("oracle deployed")
    }

    /// Makes `height` final on the source chain of `direction`.
    pub fn finalize_source(&self, direction: Direction, height: u64) {
        let chain = self.source(direction);
        let needed = (height + FINALITY_LAG).saturating_sub(chain.head());
        chain.produce_blocks(needed);
    }

    /// Proposal with the true source root at `height` and the current oracle nonce.
    pub fn anchor_proposal(&self, direction: Direction, height: u64) -> AnchorProposal {
        AnchorProposal {
            source_is_primary: direction.source_is_primary(),
            state_root: self.source(direction).root_at(height).expect("source block exists"),
            height,
            destination_nonce: self.oracle(direction).nonce,
        }
    }

    pub fn proposer(&self, direction: Direction) -> ProposerAnchorLoop {
        ProposerAnchorLoop::new(
            direction,
            Arc::clone(&self.chains),
            Arc::clone(&self.proposer_snapshot),
            Arc::clone(&self.factory) as Arc<dyn ValidatorClientFactory>,
            None,
        )
        .expect("proposer")
    }
}
