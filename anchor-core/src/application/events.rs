use crate::application::chains::BridgeChains;
use crate::domain::Direction;
use crate::foundation::{Result, ANCHOR_EVENT};
use crate::infrastructure::chain::ChainEvent;
use crate::infrastructure::config::DirectionConfig;
use futures_util::StreamExt;
use log::info;

/// Logs every `newAnchor` event of the destination oracle from `from_height`
/// on, passing each to `on_event`. Returns when the stream ends.
pub async fn watch_anchor_events<F>(
    chains: &BridgeChains,
    direction: Direction,
    config: &DirectionConfig,
    from_height: u64,
    mut on_event: F,
) -> Result<()>
where
    F: FnMut(&ChainEvent) + Send,
{
    let oracle = chains.oracle(direction, config).await?;
    let mut events = oracle.chain().subscribe_event(oracle.address(), ANCHOR_EVENT, from_height).await?;
    while let Some(event) = events.next().await {
        info!(
            "anchor event direction={} chain={} block={} height={} root={}",
            direction,
            oracle.chain().name(),
            event.height,
            event.args.get("height").cloned().unwrap_or_default(),
            event.args.get("root").and_then(|v| v.as_str()).unwrap_or_default()
        );
        on_event(&event);
    }
    Ok(())
}
