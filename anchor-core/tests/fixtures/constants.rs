#![allow(dead_code)]

pub const PRIMARY_CHAIN: &str = "alpha";
pub const SECONDARY_CHAIN: &str = "beta";

/// Oracle on the secondary chain, receiving primary roots.
pub const ORACLE_ON_SECONDARY: &str = "oracle.beta";
pub const BRIDGE_ON_SECONDARY: &str = "bridge.beta";
pub const CONTRACT_ID_ON_SECONDARY: &str = "oracle-42";

/// Oracle on the primary chain, receiving secondary roots.
pub const ORACLE_ON_PRIMARY: &str = "oracle.alpha";
pub const BRIDGE_ON_PRIMARY: &str = "bridge.alpha";
pub const CONTRACT_ID_ON_PRIMARY: &str = "oracle-43";

pub const T_ANCHOR: u64 = 10;
pub const T_FINAL: u64 = 2;
pub const FINALITY_LAG: u64 = 2;
pub const BLOCK_TIME_MS: u64 = 10;
pub const VALIDATOR_TIMEOUT_MS: u64 = 500;
pub const TX_RESULT_TIMEOUT_MS: u64 = 1_000;
