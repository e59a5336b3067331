use secp256k1::Error as SecpError;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidatorMajority,
    Rejected,
    FeatureDisabled,
    NodeRpcError,
    NodeNotSynced,
    ValidatorRpcError,
    ValidatorTimeout,
    StaleState,
    TxCommitFailed,
    TxExecutionFailed,
    TxResultTimeout,
    MissingContractState,
    InvalidContractState,
    ConfigError,
    ConfigurationMismatch,
    InvalidAddress,
    InvalidSignature,
    CryptoError,
    KeyNotFound,
    SerializationError,
    EncodingError,
    NetworkError,
    CircuitOpen,
    Message,
}

/// Coarse classification used by the proposer to pick a recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A validator check failed; counted as a no-vote.
    Rejected,
    /// Fewer than two thirds of the roster signed.
    QuorumFailure,
    /// RPC unreachable, node not synced or a timeout.
    Transient,
    /// Another proposer won the race, or the tx lost it after submission.
    StaleState,
    /// Misconfiguration that a retry cannot fix.
    Fatal,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to gather a validator majority: required={required} received={received} total={total}")]
    ValidatorMajority { required: usize, received: usize, total: usize },

    #[error("proposal rejected: {0}")]
    Rejected(String),

    #[error("feature disabled: {feature}")]
    FeatureDisabled { feature: String },

    #[error("node rpc error during {operation}: {details}")]
    NodeRpc { operation: String, details: String },

    #[error("node not synced: {0}")]
    NodeNotSynced(String),

    #[error("validator rpc error: validator={validator} details={details}")]
    ValidatorRpc { validator: String, details: String },

    #[error("validator call timed out: validator={validator} timeout_ms={timeout_ms}")]
    ValidatorTimeout { validator: String, timeout_ms: u64 },

    #[error("stale state: {0}")]
    StaleState(String),

    #[error("transaction commit failed: {0}")]
    TxCommitFailed(String),

    #[error("transaction execution failed: tx_id={tx_id} details={details}")]
    TxExecutionFailed { tx_id: String, details: String },

    #[error("timed out waiting for transaction result: tx_id={tx_id}")]
    TxResultTimeout { tx_id: String },

    #[error("missing contract state: contract={contract} key={key}")]
    MissingContractState { contract: String, key: String },

    #[error("invalid contract state: key={key} details={details}")]
    InvalidContractState { key: String, details: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    #[error("invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("crypto error: {0}")]
    CryptoError(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("serialization error ({format}): {details}")]
    SerializationError { format: String, details: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("circuit breaker open for {target}")]
    CircuitOpen { target: String },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::ValidatorMajority { .. } => ErrorCode::ValidatorMajority,
            BridgeError::Rejected(_) => ErrorCode::Rejected,
            BridgeError::FeatureDisabled { .. } => ErrorCode::FeatureDisabled,
            BridgeError::NodeRpc { .. } => ErrorCode::NodeRpcError,
            BridgeError::NodeNotSynced(_) => ErrorCode::NodeNotSynced,
            BridgeError::ValidatorRpc { .. } => ErrorCode::ValidatorRpcError,
            BridgeError::ValidatorTimeout { .. } => ErrorCode::ValidatorTimeout,
            BridgeError::StaleState(_) => ErrorCode::StaleState,
            BridgeError::TxCommitFailed(_) => ErrorCode::TxCommitFailed,
            BridgeError::TxExecutionFailed { .. } => ErrorCode::TxExecutionFailed,
            BridgeError::TxResultTimeout { .. } => ErrorCode::TxResultTimeout,
            BridgeError::MissingContractState { .. } => ErrorCode::MissingContractState,
            BridgeError::InvalidContractState { .. } => ErrorCode::InvalidContractState,
            BridgeError::ConfigError(_) => ErrorCode::ConfigError,
            BridgeError::ConfigurationMismatch(_) => ErrorCode::ConfigurationMismatch,
            BridgeError::InvalidAddress { .. } => ErrorCode::InvalidAddress,
            BridgeError::InvalidSignature(_) => ErrorCode::InvalidSignature,
            BridgeError::CryptoError(_) => ErrorCode::CryptoError,
            BridgeError::KeyNotFound(_) => ErrorCode::KeyNotFound,
            BridgeError::SerializationError { .. } => ErrorCode::SerializationError,
            BridgeError::EncodingError(_) => ErrorCode::EncodingError,
            BridgeError::NetworkError(_) => ErrorCode::NetworkError,
            BridgeError::CircuitOpen { .. } => ErrorCode::CircuitOpen,
            BridgeError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self.code() {
            ErrorCode::Rejected | ErrorCode::FeatureDisabled | ErrorCode::InvalidSignature => FailureKind::Rejected,
            ErrorCode::ValidatorMajority => FailureKind::QuorumFailure,
            ErrorCode::StaleState | ErrorCode::TxCommitFailed | ErrorCode::TxExecutionFailed => FailureKind::StaleState,
            ErrorCode::ConfigError | ErrorCode::ConfigurationMismatch | ErrorCode::KeyNotFound | ErrorCode::CryptoError => {
                FailureKind::Fatal
            }
            ErrorCode::NodeRpcError
            | ErrorCode::NodeNotSynced
            | ErrorCode::ValidatorRpcError
            | ErrorCode::ValidatorTimeout
            | ErrorCode::TxResultTimeout
            | ErrorCode::MissingContractState
            | ErrorCode::InvalidContractState
            | ErrorCode::InvalidAddress
            | ErrorCode::SerializationError
            | ErrorCode::EncodingError
            | ErrorCode::NetworkError
            | ErrorCode::CircuitOpen
            | ErrorCode::Message => FailureKind::Transient,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), kind: self.kind(), message: self.to_string() }
    }

    pub fn node_rpc(operation: impl Into<String>, details: impl ToString) -> Self {
        BridgeError::NodeRpc { operation: operation.into(), details: details.to_string() }
    }

    pub fn missing_state(contract: impl Into<String>, key: impl Into<String>) -> Self {
        BridgeError::MissingContractState { contract: contract.into(), key: key.into() }
    }

    pub fn invalid_address(input: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::InvalidAddress { input: input.into(), reason: reason.into() }
    }

    pub fn feature_disabled(feature: impl Into<String>) -> Self {
        BridgeError::FeatureDisabled { feature: feature.into() }
    }
}

impl From<hex::FromHexError> for BridgeError {
    fn from(err: hex::FromHexError) -> Self {
        BridgeError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<figment::Error> for BridgeError {
    fn from(err: figment::Error) -> Self {
        BridgeError::ConfigError(err.to_string())
    }
}

impl From<SecpError> for BridgeError {
    fn from(err: SecpError) -> Self {
        BridgeError::CryptoError(err.to_string())
    }
}

impl From<io::Error> for BridgeError {
    fn from(err: io::Error) -> Self {
        BridgeError::NetworkError(format!("io: {}", err))
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::NetworkError(err.to_string())
    }
}

#[macro_export]
macro_rules! serde_err {
    ($fmt:expr, $err:expr) => {
        $crate::foundation::BridgeError::SerializationError { format: $fmt.into(), details: $err.to_string() }
    };
}
