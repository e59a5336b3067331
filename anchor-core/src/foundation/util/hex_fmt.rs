/// Elides the middle of a hex string for log lines, keeping eight characters
/// at each end. Short inputs and an optional `0x` prefix pass through.
pub fn short_hex(hex: &str) -> String {
    let (prefix, body) = match hex.strip_prefix("0x") {
        Some(rest) => ("0x", rest),
        None => ("", hex),
    };
    if body.len() <= 16 || !body.is_ascii() {
        return hex.to_string();
    }
    format!("{}{}..{}", prefix, &body[..8], &body[body.len() - 8..])
}
