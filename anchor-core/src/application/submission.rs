//! Contract call encoding and submit-then-confirm for witnessed oracle updates.

use crate::domain::{AnchorProposal, QuorumResult, SettingChange, TempoKind};
use crate::foundation::oracle_functions as functions;
use crate::foundation::{BridgeError, ContractAddress, Result, TxId};
use crate::infrastructure::chain::ChainClient;
use log::{debug, warn};
use serde_json::{json, Value};
use std::time::Duration;

/// `newStateAnchor(root, height, signer_indexes, signatures)`.
pub fn anchor_args(proposal: &AnchorProposal, quorum: &QuorumResult) -> Vec<Value> {
    vec![json!(proposal.state_root.to_hex()), json!(proposal.height), json!(quorum.signer_indexes), json!(quorum.signatures)]
}

/// Function name and arguments for a settings update.
pub fn setting_call(change: &SettingChange, quorum: &QuorumResult) -> (&'static str, Vec<Value>) {
    let (function, value) = match change {
        SettingChange::NewTempo { kind: TempoKind::Anchor, value } => (functions::T_ANCHOR_UPDATE, json!(value)),
        SettingChange::NewTempo { kind: TempoKind::Final, value } => (functions::T_FINAL_UPDATE, json!(value)),
        SettingChange::NewValidatorSet(validators) => (functions::VALIDATORS_UPDATE, json!(validators)),
        SettingChange::NewOracle(oracle) => (functions::ORACLE_UPDATE, json!(oracle)),
    };
    (function, vec![value, json!(quorum.signer_indexes), json!(quorum.signatures)])
}

/// Submits a call and waits (bounded) for its execution result. A transaction
/// that executed but failed is `TxExecutionFailed`.
pub async fn submit_and_confirm(
    chain: &dyn ChainClient,
    contract: &ContractAddress,
    function: &str,
    args: Vec<Value>,
    timeout: Duration,
) -> Result<TxId> {
    let handle = chain.submit_contract_call(contract, function, args).await?;
    debug!("transaction committed chain={} contract={} function={} tx_id={}", chain.name(), contract, function, handle.tx_id);
    let result = chain.wait_for_result(&handle, timeout).await?;
    if !result.is_success() {
        warn!("transaction execution failed chain={} function={} tx_id={} detail={}", chain.name(), function, handle.tx_id, result.detail);
        return Err(BridgeError::TxExecutionFailed { tx_id: handle.tx_id.to_string(), details: result.detail });
    }
    Ok(handle.tx_id)
}
