#![allow(dead_code)]

use crate::fixtures::*;
use anchor_core::domain::{DigestSigner, EcdsaSigner, RosterEntry};
use anchor_core::foundation::{ChainName, ContractAddress, ContractId, ValidatorAddress};
use anchor_core::infrastructure::chain::memory::OracleDeployment;
use anchor_core::infrastructure::config::{AppConfig, BridgeConfig, ChainConfig, DirectionConfig};

/// Deterministic validator keys; seed `i` gives the `i`-th validator.
pub fn signer(seed: u8) -> EcdsaSigner {
    EcdsaSigner::from_slice(&[seed; 32]).expect("secret key")
}

pub fn signers(count: usize) -> Vec<EcdsaSigner> {
    (1..=count as u8).map(signer).collect()
}

pub fn endpoint(index: usize) -> String {
    format!("local://validator-{}", index + 1)
}

pub fn roster_entries(signers: &[EcdsaSigner]) -> Vec<RosterEntry> {
    signers.iter().enumerate().map(|(i, s)| RosterEntry { address: s.address().clone(), endpoint: endpoint(i) }).collect()
}

pub fn addresses(signers: &[EcdsaSigner]) -> Vec<ValidatorAddress> {
    signers.iter().map(|s| s.address().clone()).collect()
}

fn chain(name: &str) -> ChainConfig {
    ChainConfig {
        name: ChainName::from(name),
        rpc_url: format!("http://{}.invalid:8545", name),
        block_time_ms: BLOCK_TIME_MS,
        request_timeout_ms: 1_000,
    }
}

pub fn bridge_config() -> BridgeConfig {
    BridgeConfig {
        primary: chain(PRIMARY_CHAIN),
        secondary: chain(SECONDARY_CHAIN),
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
    }
}

pub fn app_config(signers: &[EcdsaSigner]) -> AppConfig {
    let mut config = AppConfig::default();
    config.bridge = bridge_config();
    config.validators = roster_entries(signers);
    config.proposer.validator_timeout_ms = VALIDATOR_TIMEOUT_MS;
    config.proposer.tx_result_timeout_ms = TX_RESULT_TIMEOUT_MS;
    config
}

pub fn deployment_on_secondary(validators: Vec<ValidatorAddress>) -> OracleDeployment {
    OracleDeployment {
        oracle: ContractAddress::from(ORACLE_ON_SECONDARY),
        bridge: ContractAddress::from(BRIDGE_ON_SECONDARY),
        contract_id: ContractId::from(CONTRACT_ID_ON_SECONDARY),
        t_anchor: T_ANCHOR,
        t_final: T_FINAL,
        validators,
    }
}

pub fn deployment_on_primary(validators: Vec<ValidatorAddress>) -> OracleDeployment {
    OracleDeployment {
        oracle: ContractAddress::from(ORACLE_ON_PRIMARY),
        bridge: ContractAddress::from(BRIDGE_ON_PRIMARY),
        contract_id: ContractId::from(CONTRACT_ID_ON_PRIMARY),
        t_anchor: T_ANCHOR,
        t_final: T_FINAL,
        validators,
    }
}
