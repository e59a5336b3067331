use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

const API_KEY_HEADER: &str = "x-api-key";

/// Tokens a caller presented, in the order they are tried.
fn presented_tokens(headers: &HeaderMap) -> impl Iterator<Item = &str> {
    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let bearer = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).and_then(|v| v.strip_prefix("Bearer "));
    api_key.into_iter().chain(bearer)
}

/// Checks the request against the configured token. No token configured means open access.
pub fn authorize(headers: &HeaderMap, expected: Option<&str>) -> Result<(), &'static str> {
    let Some(expected) = expected.map(str::trim).filter(|token| !token.is_empty()) else {
        return Ok(());
    };
    if presented_tokens(headers).any(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes()))) {
        Ok(())
    } else {
        Err("unauthorized")
    }
}
