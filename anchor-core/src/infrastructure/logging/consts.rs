//! Log file names, patterns and rotation limits.

pub const LOG_FILE_NAME: &str = "anchor.log";
/// Warn-and-above copy of the main log.
pub const ERR_LOG_FILE_NAME: &str = "anchor_err.log";

/// Console pattern: `timestamp [LEVEL] message [module]`.
pub const LOG_LINE_PATTERN_COLORED: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{h({l:5})}] {m} [{M}]{n}";

pub const LOG_LINE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l:5}] {m} [{M}]{n}";

/// Rotate at 50 MB.
pub const LOG_FILE_MAX_SIZE: u64 = 50_000_000;

pub const LOG_FILE_MAX_ROLLS: u32 = 5;

/// Workspace crates logged at the app level; everything else is off unless opted in.
pub const WHITELISTED_CRATES: &[&str] = &["anchor_core", "anchor_service"];

pub const DEFAULT_LOG_FILTERS: &str = "info";
