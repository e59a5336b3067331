use crate::domain::Direction;
use crate::foundation::oracle_keys as keys;
use crate::foundation::{BridgeError, ContractAddress, Result};
use crate::infrastructure::chain::{ChainClient, OracleView};
use crate::infrastructure::config::DirectionConfig;
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Both chains of the bridge pair plus cached oracle views.
pub struct BridgeChains {
    primary: Arc<dyn ChainClient>,
    secondary: Arc<dyn ChainClient>,
    views: Mutex<HashMap<(Direction, ContractAddress), Arc<OracleView>>>,
}

impl BridgeChains {
    pub fn new(primary: Arc<dyn ChainClient>, secondary: Arc<dyn ChainClient>) -> Self {
        Self { primary, secondary, views: Mutex::new(HashMap::new()) }
    }

    pub fn primary(&self) -> &Arc<dyn ChainClient> {
        &self.primary
    }

    pub fn secondary(&self) -> &Arc<dyn ChainClient> {
        &self.secondary
    }

    pub fn source(&self, direction: Direction) -> &Arc<dyn ChainClient> {
        match direction {
            Direction::PrimaryToSecondary => &self.primary,
            Direction::SecondaryToPrimary => &self.secondary,
        }
    }

    pub fn destination(&self, direction: Direction) -> &Arc<dyn ChainClient> {
        match direction {
            Direction::PrimaryToSecondary => &self.secondary,
            Direction::SecondaryToPrimary => &self.primary,
        }
    }

    fn view(&self, direction: Direction, oracle: &ContractAddress, bridge: &ContractAddress) -> Arc<OracleView> {
        let mut views = self.views.lock();
        views
            .entry((direction, oracle.clone()))
            .or_insert_with(|| Arc::new(OracleView::new(Arc::clone(self.destination(direction)), oracle.clone(), bridge.clone())))
            .clone()
    }

    /// The oracle the destination bridge currently points at. Falls back to the
    /// configured address while the bridge reports none.
    pub async fn oracle(&self, direction: Direction, config: &DirectionConfig) -> Result<Arc<OracleView>> {
        let destination = self.destination(direction);
        let state = destination.query_contract_state(&config.bridge_address, &[keys::ORACLE]).await?;
        let active = match state.string(&config.bridge_address, keys::ORACLE) {
            Ok(address) if !address.trim().is_empty() => ContractAddress::new(address),
            Ok(_) | Err(BridgeError::MissingContractState { .. }) => config.oracle_address.clone(),
            Err(err) => return Err(err),
        };
        if active != config.oracle_address {
            debug!("bridge points at a different oracle direction={} configured={} active={}", direction, config.oracle_address, active);
        }
        Ok(self.view(direction, &active, &config.bridge_address))
    }

    /// Both chains answer a finality query.
    pub async fn check_ready(&self) -> Result<()> {
        for chain in [&self.primary, &self.secondary] {
            let lib = chain.last_irreversible_height().await?;
            if lib.is_none() {
                return Err(BridgeError::NodeNotSynced(format!("{} reports no irreversible height", chain.name())));
            }
        }
        Ok(())
    }

    pub fn describe(&self) {
        info!("bridge chains primary={} secondary={}", self.primary.name(), self.secondary.name());
    }
}
