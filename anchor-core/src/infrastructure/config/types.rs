use crate::domain::{Direction, RosterEntry};
use crate::foundation::{ChainName, ContractAddress, DEFAULT_BLOCK_TIME_MS, DEFAULT_TX_RESULT_TIMEOUT_MS, DEFAULT_VALIDATOR_TIMEOUT_MS};
use crate::infrastructure::rpc::CircuitBreakerConfig;
use figment::value::{Dict, Map};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Active profile to load from `[profiles.<name>]`. CLI `--profile` takes precedence.
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub data_dir: String,
    /// Environment variable holding the hex signing key.
    #[serde(default)]
    pub key_env: String,
    /// Optional file holding the hex signing key; used when `key_env` is unset.
    #[serde(default)]
    pub key_file: Option<String>,
    /// Interval of the periodic status log line. Zero disables it.
    #[serde(default)]
    pub status_interval_secs: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub name: ChainName,
    /// JSON-RPC gateway of the chain node.
    #[serde(default)]
    pub rpc_url: String,
    #[serde(default)]
    pub block_time_ms: u64,
    #[serde(default)]
    pub request_timeout_ms: u64,
}

/// Per-direction contract addresses and tempos. Tempos are in source-chain blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionConfig {
    #[serde(default)]
    pub bridge_address: ContractAddress,
    #[serde(default)]
    pub oracle_address: ContractAddress,
    #[serde(default)]
    pub t_anchor: u64,
    #[serde(default)]
    pub t_final: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub primary: ChainConfig,
    #[serde(default)]
    pub secondary: ChainConfig,
    /// Anchors primary roots onto the secondary chain's oracle.
    #[serde(default)]
    pub primary_to_secondary: DirectionConfig,
    /// Anchors secondary roots onto the primary chain's oracle.
    #[serde(default)]
    pub secondary_to_primary: DirectionConfig,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
}

impl BridgeConfig {
    pub fn direction(&self, direction: Direction) -> &DirectionConfig {
        match direction {
            Direction::PrimaryToSecondary => &self.primary_to_secondary,
            Direction::SecondaryToPrimary => &self.secondary_to_primary,
        }
    }

    /// `(source, destination)` chains for `direction`.
    pub fn chains(&self, direction: Direction) -> (&ChainConfig, &ChainConfig) {
        match direction {
            Direction::PrimaryToSecondary => (&self.primary, &self.secondary),
            Direction::SecondaryToPrimary => (&self.secondary, &self.primary),
        }
    }

    pub fn pair_name(&self) -> String {
        format!("{}-{}", self.primary.name, self.secondary.name)
    }
}

/// Role feature flags. Anchoring is on by default; settings updates are opt-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureFlags {
    pub anchoring_enabled: bool,
    pub auto_update_enabled: bool,
    pub oracle_update_enabled: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self { anchoring_enabled: true, auto_update_enabled: false, oracle_update_enabled: false }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposerConfig {
    #[serde(default = "default_true")]
    pub anchoring_enabled: bool,
    #[serde(default)]
    pub auto_update_enabled: bool,
    #[serde(default)]
    pub oracle_update_enabled: bool,
    #[serde(default)]
    pub validator_timeout_ms: u64,
    #[serde(default)]
    pub tx_result_timeout_ms: u64,
    /// Run only this direction; both when unset.
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl Default for ProposerConfig {
    fn default() -> Self {
        Self {
            anchoring_enabled: true,
            auto_update_enabled: false,
            oracle_update_enabled: false,
            validator_timeout_ms: 0,
            tx_result_timeout_ms: 0,
            direction: None,
        }
    }
}

impl ProposerConfig {
    pub fn features(&self) -> FeatureFlags {
        FeatureFlags {
            anchoring_enabled: self.anchoring_enabled,
            auto_update_enabled: self.auto_update_enabled,
            oracle_update_enabled: self.oracle_update_enabled,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default = "default_true")]
    pub anchoring_enabled: bool,
    #[serde(default)]
    pub auto_update_enabled: bool,
    #[serde(default)]
    pub oracle_update_enabled: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { anchoring_enabled: true, auto_update_enabled: false, oracle_update_enabled: false }
    }
}

impl ValidatorConfig {
    pub fn features(&self) -> FeatureFlags {
        FeatureFlags {
            anchoring_enabled: self.anchoring_enabled,
            auto_update_enabled: self.auto_update_enabled,
            oracle_update_enabled: self.oracle_update_enabled,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default)]
    pub addr: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub rate_limit_rps: Option<u32>,
    #[serde(default)]
    pub rate_limit_burst: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Ordered roster; position `i` is on-chain signer index `i + 1`.
    #[serde(default)]
    pub validators: Vec<RosterEntry>,
    #[serde(default)]
    pub proposer: ProposerConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Profile overrides (e.g. `profiles.validator-1.*`) - used by the loader.
    #[serde(default, skip_serializing)]
    pub profiles: Option<Map<String, Dict>>,
}

impl AppConfig {
    pub fn block_time_ms(&self, direction: Direction) -> u64 {
        let (source, _) = self.bridge.chains(direction);
        if source.block_time_ms == 0 {
            DEFAULT_BLOCK_TIME_MS
        } else {
            source.block_time_ms
        }
    }

    pub fn validator_timeout_ms(&self) -> u64 {
        if self.proposer.validator_timeout_ms == 0 {
            DEFAULT_VALIDATOR_TIMEOUT_MS
        } else {
            self.proposer.validator_timeout_ms
        }
    }

    pub fn tx_result_timeout_ms(&self) -> u64 {
        if self.proposer.tx_result_timeout_ms == 0 {
            DEFAULT_TX_RESULT_TIMEOUT_MS
        } else {
            self.proposer.tx_result_timeout_ms
        }
    }

    pub fn directions(&self) -> Vec<Direction> {
        match self.proposer.direction {
            Some(direction) => vec![direction],
            None => Direction::ALL.to_vec(),
        }
    }
}
