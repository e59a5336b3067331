use std::time::Duration;

/// Wall time covered by `blocks` at `block_time_ms` per block.
pub fn blocks_to_duration(blocks: u64, block_time_ms: u64) -> Duration {
    Duration::from_millis(blocks.saturating_mul(block_time_ms))
}
