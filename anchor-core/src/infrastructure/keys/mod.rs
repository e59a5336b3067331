//! Signing key loading for validators.
//!
//! The key is a hex-encoded 32-byte secp256k1 secret taken from an environment
//! variable or, failing that, a key file. Intermediate buffers are zeroized.

use crate::domain::signature::{DigestSigner, EcdsaSigner};
use crate::foundation::util::encoding::strip_hex_prefix;
use crate::foundation::BridgeError;
use crate::infrastructure::config::ServiceConfig;
use log::info;
use std::path::Path;
use zeroize::Zeroizing;

/// Where the signing key came from, for the startup log line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeySource {
    Env(String),
    File(String),
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Env(name) => write!(f, "env:{}", name),
            KeySource::File(path) => write!(f, "file:{}", path),
        }
    }
}

pub fn signer_from_hex(secret_hex: &str) -> Result<EcdsaSigner, BridgeError> {
    let bytes = Zeroizing::new(
        hex::decode(strip_hex_prefix(secret_hex.trim()))
            .map_err(|err| BridgeError::CryptoError(format!("signing key is not hex: {}", err)))?,
    );
    if bytes.len() != 32 {
        return Err(BridgeError::CryptoError(format!("signing key must be 32 bytes, got {}", bytes.len())));
    }
    EcdsaSigner::from_slice(&bytes)
}

fn read_key_file(path: &Path) -> Result<Zeroizing<String>, BridgeError> {
    std::fs::read_to_string(path)
        .map(Zeroizing::new)
        .map_err(|err| BridgeError::KeyNotFound(format!("{}: {}", path.display(), err)))
}

/// Loads the validator signing key from `service.key_env`, then `service.key_file`.
pub fn load_signer(service: &ServiceConfig) -> Result<(EcdsaSigner, KeySource), BridgeError> {
    if let Ok(value) = std::env::var(&service.key_env) {
        let value = Zeroizing::new(value);
        if !value.trim().is_empty() {
            let signer = signer_from_hex(&value)?;
            let source = KeySource::Env(service.key_env.clone());
            info!("signing key loaded source={} address={}", source, signer.address());
            return Ok((signer, source));
        }
    }
    if let Some(path) = service.key_file.as_deref().filter(|p| !p.trim().is_empty()) {
        let contents = read_key_file(Path::new(path))?;
        let signer = signer_from_hex(&contents)?;
        let source = KeySource::File(path.to_string());
        info!("signing key loaded source={} address={}", source, signer.address());
        return Ok((signer, source));
    }
    Err(BridgeError::KeyNotFound(format!("set {} or service.key_file", service.key_env)))
}
