use crate::foundation::{BridgeError, Hash32};

/// Strips an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>, BridgeError> {
    hex::decode(strip_hex_prefix(s.trim())).map_err(|e| e.into())
}

pub fn decode_hex_fixed<const N: usize>(s: &str) -> Result<[u8; N], BridgeError> {
    let bytes = decode_hex(s)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| BridgeError::EncodingError(format!("expected {} bytes, got {}", N, len)))
}

pub fn parse_hex_32bytes(s: &str) -> Result<Hash32, BridgeError> {
    decode_hex_fixed::<32>(s)
}
