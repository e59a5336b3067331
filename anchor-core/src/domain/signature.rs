//! secp256k1 ECDSA signing and verification over 32-byte digests.
//!
//! Signatures travel as hex of the 64-byte compact `r||s` form. Verification
//! only accepts low-S signatures, which libsecp256k1 enforces.

use crate::foundation::{BridgeError, Digest, Result, ValidatorAddress, COMPRESSED_PUBKEY_SIZE, ECDSA_SIGNATURE_SIZE};
use crate::foundation::util::encoding::decode_hex;
use once_cell::sync::Lazy;
use secp256k1::ecdsa::Signature as SecpSignature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, SignOnly, VerifyOnly};

static VERIFIER: Lazy<Secp256k1<VerifyOnly>> = Lazy::new(Secp256k1::verification_only);
static SIGNER: Lazy<Secp256k1<SignOnly>> = Lazy::new(Secp256k1::signing_only);

pub fn address_from_pubkey(pubkey: &PublicKey) -> ValidatorAddress {
    ValidatorAddress::new(format!("0x{}", hex::encode(pubkey.serialize())))
}

pub fn parse_address(address: &ValidatorAddress) -> Result<PublicKey> {
    let bytes = decode_hex(address.as_str())
        .map_err(|err| BridgeError::invalid_address(address.as_str(), err.to_string()))?;
    if bytes.len() != COMPRESSED_PUBKEY_SIZE {
        return Err(BridgeError::invalid_address(
            address.as_str(),
            format!("expected {} bytes, got {}", COMPRESSED_PUBKEY_SIZE, bytes.len()),
        ));
    }
    PublicKey::from_slice(&bytes).map_err(|err| BridgeError::invalid_address(address.as_str(), err.to_string()))
}

/// Checks `signature_hex` over `digest` against `claimed`. Malformed input verifies as `false`.
pub fn verify(digest: &Digest, signature_hex: &str, claimed: &ValidatorAddress) -> bool {
    match decode_hex(signature_hex) {
        Ok(bytes) => verify_bytes(digest, &bytes, claimed),
        Err(_) => false,
    }
}

pub fn verify_bytes(digest: &Digest, signature: &[u8], claimed: &ValidatorAddress) -> bool {
    if signature.len() != ECDSA_SIGNATURE_SIZE {
        return false;
    }
    let Ok(pubkey) = parse_address(claimed) else {
        return false;
    };
    let Ok(sig) = SecpSignature::from_compact(signature) else {
        return false;
    };
    let message = Message::from_digest(*digest.as_hash());
    VERIFIER.verify_ecdsa(&message, &sig, &pubkey).is_ok()
}

/// Anything able to sign digests on behalf of one validator address.
pub trait DigestSigner: Send + Sync {
    fn address(&self) -> &ValidatorAddress;
    fn sign_digest(&self, digest: &Digest) -> Result<String>;
}

pub struct EcdsaSigner {
    secret: SecretKey,
    address: ValidatorAddress,
}

impl EcdsaSigner {
    pub fn new(secret: SecretKey) -> Self {
        let pubkey = PublicKey::from_secret_key(&SIGNER, &secret);
        Self { secret, address: address_from_pubkey(&pubkey) }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(SecretKey::from_slice(bytes)?))
    }
}

impl DigestSigner for EcdsaSigner {
    fn address(&self) -> &ValidatorAddress {
        &self.address
    }

    fn sign_digest(&self, digest: &Digest) -> Result<String> {
        let message = Message::from_digest(*digest.as_hash());
        let signature = SIGNER.sign_ecdsa(&message, &self.secret);
        Ok(hex::encode(signature.serialize_compact()))
    }
}

impl std::fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaSigner").field("address", &self.address).finish_non_exhaustive()
    }
}
