//! Protocol and service constants for the bridge anchor operator.

/// Milliseconds per second.
pub const MILLIS_PER_SECOND: u64 = 1_000;

/// Digest role suffix for anchored state roots.
pub const DIGEST_SUFFIX_ANCHOR: &str = "R";

/// Digest role suffix for an anchoring-period update.
pub const DIGEST_SUFFIX_T_ANCHOR: &str = "A";

/// Digest role suffix for a finality-period update.
pub const DIGEST_SUFFIX_T_FINAL: &str = "F";

/// Digest role suffix for a validator-set update.
pub const DIGEST_SUFFIX_VALIDATORS: &str = "V";

/// Digest role suffix for an oracle-address update.
pub const DIGEST_SUFFIX_ORACLE: &str = "O";

/// ECDSA signature size in compact `r||s` format (64 bytes).
pub const ECDSA_SIGNATURE_SIZE: usize = 64;

/// Compressed secp256k1 public key size (33 bytes).
pub const COMPRESSED_PUBKEY_SIZE: usize = 33;

/// SHA-256 digest size in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Quorum numerator: a proposal needs `3 * valid >= 2 * total`.
pub const QUORUM_NUMERATOR: usize = 2;

/// Quorum denominator.
pub const QUORUM_DENOMINATOR: usize = 3;

/// Upper bound on how long the proposer sleeps before re-checking settings.
///
/// Any sleep at least this long is sliced so that configuration divergence is
/// noticed within one slice.
pub const SETTINGS_CHECK_INTERVAL_SECS: u64 = 10;

/// Divisor applied to the anchoring period to derive the short backoff.
pub const BACKOFF_DIVISOR: u64 = 10;

/// Lower bound on any backoff, so a tiny `t_anchor` cannot spin the loop.
pub const MIN_BACKOFF_MS: u64 = 200;

/// Default per-validator signature request timeout.
pub const DEFAULT_VALIDATOR_TIMEOUT_MS: u64 = 5_000;

/// Default bound for waiting on a submitted transaction result.
pub const DEFAULT_TX_RESULT_TIMEOUT_MS: u64 = 30_000;

/// Poll interval used while waiting for a transaction result.
pub const TX_RESULT_POLL_INTERVAL_MS: u64 = 500;

/// Default block time used to turn block counts into wall time.
pub const DEFAULT_BLOCK_TIME_MS: u64 = 1_000;

/// Base backoff for the circuit breaker open state.
pub const CIRCUIT_BREAKER_BASE_BACKOFF_SECS: u64 = 1;

/// Attempts at the startup roster check while chain gateways come up.
pub const STARTUP_RETRY_ATTEMPTS: usize = 5;

/// Delay between startup roster check attempts.
pub const STARTUP_RETRY_DELAY_MS: u64 = 2_000;

/// Maximum JSON-RPC request body size accepted by the validator API (64 KiB).
pub const MAX_RPC_BODY_BYTES: usize = 64 * 1024;

/// Maximum number of entries in a JSON-RPC batch.
pub const MAX_RPC_BATCH_SIZE: usize = 16;

/// Fixed window of the per-IP rate limiter.
pub const RPC_RATE_LIMIT_WINDOW_SECS: u64 = 1;

/// How often idle rate-limiter buckets are swept.
pub const RPC_RATE_LIMIT_CLEANUP_INTERVAL_SECS: u64 = 60;

/// Buckets idle for longer than this are dropped on sweep.
pub const RPC_RATE_LIMIT_ENTRY_TTL_SECS: u64 = 300;

/// Requests per window allowed per client IP when unset in config.
pub const DEFAULT_RPC_RATE_LIMIT_RPS: u32 = 30;

/// Extra requests per window allowed on top of the steady rate.
pub const DEFAULT_RPC_RATE_LIMIT_BURST: u32 = 60;

/// Oracle storage keys read by both roles.
pub mod oracle_keys {
    pub const ANCHOR_ROOT: &str = "_sv__anchorRoot";
    pub const ANCHOR_HEIGHT: &str = "_sv__anchorHeight";
    pub const T_ANCHOR: &str = "_sv__tAnchor";
    pub const T_FINAL: &str = "_sv__tFinal";
    pub const NONCE: &str = "_sv__nonce";
    pub const VALIDATORS: &str = "_sv__validators";
    pub const ORACLE: &str = "_sv__oracle";
    pub const CONTRACT_ID: &str = "_sv__contractId";
}

/// Oracle contract functions invoked by the proposer.
pub mod oracle_functions {
    pub const NEW_STATE_ANCHOR: &str = "newStateAnchor";
    pub const T_ANCHOR_UPDATE: &str = "tAnchorUpdate";
    pub const T_FINAL_UPDATE: &str = "tFinalUpdate";
    pub const VALIDATORS_UPDATE: &str = "validatorsUpdate";
    pub const ORACLE_UPDATE: &str = "oracleUpdate";
}

/// JSON-RPC methods served by validators.
pub mod validator_methods {
    pub const GET_ANCHOR_SIGNATURE: &str = "validator.get_anchor_signature";
    pub const GET_T_ANCHOR_SIGNATURE: &str = "validator.get_t_anchor_signature";
    pub const GET_T_FINAL_SIGNATURE: &str = "validator.get_t_final_signature";
    pub const GET_VALIDATORS_SIGNATURE: &str = "validator.get_validators_signature";
    pub const GET_ORACLE_SIGNATURE: &str = "validator.get_oracle_signature";
}

/// Oracle contract event emitted on a successful anchor.
pub const ANCHOR_EVENT: &str = "newAnchor";
