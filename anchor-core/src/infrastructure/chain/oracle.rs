use crate::domain::settings::OracleSettings;
use crate::foundation::oracle_keys as keys;
use crate::foundation::{ContractAddress, ContractId, Result, StateRoot, ValidatorAddress};
use crate::infrastructure::chain::ChainClient;
use log::debug;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Snapshot of the destination oracle (and the bridge pointer to it).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleState {
    pub anchor_root: StateRoot,
    pub anchor_height: u64,
    pub t_anchor: u64,
    pub t_final: u64,
    pub nonce: u64,
    pub validators: Vec<ValidatorAddress>,
    pub oracle: ContractAddress,
}

impl OracleState {
    pub fn settings(&self) -> OracleSettings {
        OracleSettings {
            t_anchor: self.t_anchor,
            t_final: self.t_final,
            validators: self.validators.clone(),
            oracle: self.oracle.clone(),
        }
    }
}

/// Typed reads of one oracle contract on its chain. The contract id never
/// changes for a deployed oracle and is fetched once.
pub struct OracleView {
    chain: Arc<dyn ChainClient>,
    oracle: ContractAddress,
    bridge: ContractAddress,
    contract_id: OnceCell<ContractId>,
}

impl OracleView {
    pub fn new(chain: Arc<dyn ChainClient>, oracle: ContractAddress, bridge: ContractAddress) -> Self {
        Self { chain, oracle, bridge, contract_id: OnceCell::new() }
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }

    pub fn address(&self) -> &ContractAddress {
        &self.oracle
    }

    pub async fn contract_id(&self) -> Result<ContractId> {
        let id = self
            .contract_id
            .get_or_try_init(|| async {
                let state = self.chain.query_contract_state(&self.oracle, &[keys::CONTRACT_ID]).await?;
                let id = ContractId::new(state.string(&self.oracle, keys::CONTRACT_ID)?);
                debug!("oracle contract id cached chain={} oracle={} contract_id={}", self.chain.name(), self.oracle, id);
                Ok::<_, crate::foundation::BridgeError>(id)
            })
            .await?;
        Ok(id.clone())
    }

    pub async fn nonce(&self) -> Result<u64> {
        let state = self.chain.query_contract_state(&self.oracle, &[keys::NONCE]).await?;
        state.u64(&self.oracle, keys::NONCE)
    }

    pub async fn anchor_height(&self) -> Result<u64> {
        let state = self.chain.query_contract_state(&self.oracle, &[keys::ANCHOR_HEIGHT]).await?;
        state.u64(&self.oracle, keys::ANCHOR_HEIGHT)
    }

    pub async fn validators(&self) -> Result<Vec<ValidatorAddress>> {
        let state = self.chain.query_contract_state(&self.oracle, &[keys::VALIDATORS]).await?;
        Ok(state.strings(&self.oracle, keys::VALIDATORS)?.into_iter().map(ValidatorAddress::from).collect())
    }

    pub async fn state(&self) -> Result<OracleState> {
        let state = self
            .chain
            .query_contract_state(
                &self.oracle,
                &[keys::ANCHOR_ROOT, keys::ANCHOR_HEIGHT, keys::T_ANCHOR, keys::T_FINAL, keys::NONCE, keys::VALIDATORS],
            )
            .await?;
        let bridge_state = self.chain.query_contract_state(&self.bridge, &[keys::ORACLE]).await?;
        Ok(OracleState {
            anchor_root: state.root(keys::ANCHOR_ROOT)?,
            anchor_height: state.u64(&self.oracle, keys::ANCHOR_HEIGHT)?,
            t_anchor: state.u64(&self.oracle, keys::T_ANCHOR)?,
            t_final: state.u64(&self.oracle, keys::T_FINAL)?,
            nonce: state.u64(&self.oracle, keys::NONCE)?,
            validators: state.strings(&self.oracle, keys::VALIDATORS)?.into_iter().map(ValidatorAddress::from).collect(),
            oracle: ContractAddress::new(bridge_state.string(&self.bridge, keys::ORACLE)?),
        })
    }
}
