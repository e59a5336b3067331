//! In-memory chain with a faithful model of the oracle and bridge contracts.
//!
//! The oracle enforces what the deployed contract does: current nonce, minimum
//! anchor spacing, strictly increasing 1-based signer indexes, `3k >= 2N` and a
//! valid signature per index. Every successful update bumps the nonce.

use crate::domain::digest;
use crate::domain::proposal::TempoKind;
use crate::domain::quorum::has_majority;
use crate::domain::signature;
use crate::foundation::oracle_functions as functions;
use crate::foundation::oracle_keys as keys;
use crate::foundation::{
    BridgeError, ChainName, ContractAddress, ContractId, Digest, Result, StateRoot, TxId, ValidatorAddress, ANCHOR_EVENT,
};
use crate::infrastructure::chain::{ChainClient, ChainEvent, ContractState, TxHandle, TxResult};
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use log::{debug, info};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct OracleDeployment {
    pub oracle: ContractAddress,
    pub bridge: ContractAddress,
    pub contract_id: ContractId,
    pub t_anchor: u64,
    pub t_final: u64,
    pub validators: Vec<ValidatorAddress>,
}

/// Public view of an oracle's storage, for assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleSnapshot {
    pub anchor_root: StateRoot,
    pub anchor_height: u64,
    pub t_anchor: u64,
    pub t_final: u64,
    pub nonce: u64,
    pub validators: Vec<ValidatorAddress>,
    pub bridge_oracle: ContractAddress,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub contract: ContractAddress,
    pub function: String,
    pub args: Vec<Value>,
    pub tx_id: TxId,
}

#[derive(Clone, Debug)]
struct OracleContract {
    contract_id: ContractId,
    bridge: ContractAddress,
    anchor_root: StateRoot,
    anchor_height: u64,
    t_anchor: u64,
    t_final: u64,
    nonce: u64,
    validators: Vec<ValidatorAddress>,
}

#[derive(Default)]
struct Inner {
    head: u64,
    finality_lag: u64,
    lib_unavailable: bool,
    offline: bool,
    roots: BTreeMap<u64, StateRoot>,
    oracles: HashMap<ContractAddress, OracleContract>,
    bridges: HashMap<ContractAddress, ContractAddress>,
    results: HashMap<TxId, TxResult>,
    calls: Vec<RecordedCall>,
    events: Vec<ChainEvent>,
    next_tx: u64,
}

pub struct InMemoryChain {
    name: ChainName,
    inner: Mutex<Inner>,
    events: broadcast::Sender<ChainEvent>,
}

/// Signed witness carried as the last two call arguments.
struct Witness {
    signer_indexes: Vec<u64>,
    signatures: Vec<String>,
}

enum Call {
    Anchor { root: StateRoot, height: u64 },
    Tempo { kind: TempoKind, value: u64 },
    Validators(Vec<ValidatorAddress>),
    Oracle(ContractAddress),
}

fn deterministic_root(chain: &ChainName, height: u64) -> StateRoot {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"anchor:memory-root:");
    hasher.update(chain.as_bytes());
    hasher.update(&height.to_le_bytes());
    StateRoot::from(*hasher.finalize().as_bytes())
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_call(function: &str, args: &[Value]) -> std::result::Result<(Call, Witness), String> {
    let expected = if function == functions::NEW_STATE_ANCHOR { 4 } else { 3 };
    if args.len() != expected {
        return Err(format!("{}: unexpected argument count {}", function, args.len()));
    }
    let n = args.len();
    let signer_indexes = args[n - 2]
        .as_array()
        .and_then(|items| items.iter().map(parse_u64).collect::<Option<Vec<_>>>())
        .ok_or_else(|| format!("{}: signer indexes must be an array of integers", function))?;
    let signatures = args[n - 1]
        .as_array()
        .and_then(|items| items.iter().map(|v| v.as_str().map(str::to_string)).collect::<Option<Vec<_>>>())
        .ok_or_else(|| format!("{}: signatures must be an array of strings", function))?;
    let witness = Witness { signer_indexes, signatures };

    let call = match function {
        functions::NEW_STATE_ANCHOR => {
            let root = args[0].as_str().and_then(|s| StateRoot::from_str(s).ok()).ok_or("newStateAnchor: invalid root")?;
            let height = parse_u64(&args[1]).ok_or("newStateAnchor: invalid height")?;
            Call::Anchor { root, height }
        }
        functions::T_ANCHOR_UPDATE | functions::T_FINAL_UPDATE => {
            let kind = if function == functions::T_ANCHOR_UPDATE { TempoKind::Anchor } else { TempoKind::Final };
            let value = parse_u64(&args[0]).ok_or_else(|| format!("{}: invalid tempo", function))?;
            Call::Tempo { kind, value }
        }
        functions::VALIDATORS_UPDATE => {
            let validators = args[0]
                .as_array()
                .and_then(|items| items.iter().map(|v| v.as_str().map(ValidatorAddress::from)).collect::<Option<Vec<_>>>())
                .ok_or("validatorsUpdate: validators must be an array of strings")?;
            Call::Validators(validators)
        }
        functions::ORACLE_UPDATE => {
            let oracle = args[0].as_str().map(ContractAddress::from).ok_or("oracleUpdate: invalid oracle")?;
            Call::Oracle(oracle)
        }
        other => return Err(format!("unknown function {}", other)),
    };
    Ok((call, witness))
}

fn verify_witness(contract: &OracleContract, digest: &Digest, witness: &Witness) -> std::result::Result<(), String> {
    let total = contract.validators.len();
    if witness.signer_indexes.len() != witness.signatures.len() {
        return Err("signer indexes and signatures differ in length".to_string());
    }
    if !has_majority(witness.signatures.len(), total) {
        return Err(format!("2/3 validators must sign: got {} of {}", witness.signatures.len(), total));
    }
    let mut previous = 0u64;
    for (index, sig) in witness.signer_indexes.iter().zip(&witness.signatures) {
        if *index <= previous || *index as usize > total {
            return Err(format!("signer index {} out of order or out of range", index));
        }
        previous = *index;
        let validator = &contract.validators[(*index - 1) as usize];
        if !signature::verify(digest, sig, validator) {
            return Err(format!("invalid signature for signer index {}", index));
        }
    }
    Ok(())
}

impl InMemoryChain {
    pub fn new(name: impl Into<ChainName>, finality_lag: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { name: name.into(), inner: Mutex::new(Inner { finality_lag, ..Default::default() }), events }
    }

    pub fn deploy_oracle(&self, deployment: OracleDeployment) {
        let mut inner = self.inner.lock();
        inner.bridges.entry(deployment.bridge.clone()).or_insert_with(|| deployment.oracle.clone());
        inner.oracles.insert(
            deployment.oracle,
            OracleContract {
                contract_id: deployment.contract_id,
                bridge: deployment.bridge,
                anchor_root: StateRoot::default(),
                anchor_height: 0,
                t_anchor: deployment.t_anchor,
                t_final: deployment.t_final,
                nonce: 0,
                validators: deployment.validators.iter().map(ValidatorAddress::normalized).collect(),
            },
        );
    }

    /// Appends `count` blocks with deterministic roots and returns the new head.
    pub fn produce_blocks(&self, count: u64) -> u64 {
        let mut inner = self.inner.lock();
        for _ in 0..count {
            inner.head += 1;
            let height = inner.head;
            let root = deterministic_root(&self.name, height);
            inner.roots.entry(height).or_insert(root);
        }
        inner.head
    }

    pub fn head(&self) -> u64 {
        self.inner.lock().head
    }

    pub fn root_at(&self, height: u64) -> Option<StateRoot> {
        self.inner.lock().roots.get(&height).copied()
    }

    pub fn set_block_root(&self, height: u64, root: StateRoot) {
        self.inner.lock().roots.insert(height, root);
    }

    pub fn set_lib_unavailable(&self, unavailable: bool) {
        self.inner.lock().lib_unavailable = unavailable;
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    pub fn oracle_snapshot(&self, oracle: &ContractAddress) -> Option<OracleSnapshot> {
        let inner = self.inner.lock();
        let contract = inner.oracles.get(oracle)?;
        Some(OracleSnapshot {
            anchor_root: contract.anchor_root,
            anchor_height: contract.anchor_height,
            t_anchor: contract.t_anchor,
            t_final: contract.t_final,
            nonce: contract.nonce,
            validators: contract.validators.clone(),
            bridge_oracle: inner.bridges.get(&contract.bridge).cloned().unwrap_or_default(),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().calls.clone()
    }

    pub fn results(&self) -> Vec<(TxId, TxResult)> {
        let inner = self.inner.lock();
        let mut out: Vec<_> = inner.results.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        out.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        out
    }

    fn ensure_online(&self, inner: &Inner, operation: &str) -> Result<()> {
        if inner.offline {
            return Err(BridgeError::node_rpc(operation, format!("{} unreachable", self.name)));
        }
        Ok(())
    }

    fn execute(inner: &mut Inner, oracle: &ContractAddress, call: Call, witness: &Witness) -> std::result::Result<Option<ChainEvent>, String> {
        let head = inner.head;
        let contract = inner.oracles.get(oracle).ok_or_else(|| format!("no oracle at {}", oracle))?;
        let nonce = contract.nonce;
        let id = &contract.contract_id;
        let digest = match &call {
            Call::Anchor { root, height } => {
                if *height < contract.anchor_height.saturating_add(contract.t_anchor) {
                    return Err(format!(
                        "Next anchor height not reached: height={} last={} t_anchor={}",
                        height, contract.anchor_height, contract.t_anchor
                    ));
                }
                digest::anchor_digest(root, *height, nonce, id)
            }
            Call::Tempo { kind, value } => digest::tempo_digest(*kind, *value, nonce, id),
            Call::Validators(validators) => digest::validators_digest(validators, nonce, id),
            Call::Oracle(new_oracle) => digest::oracle_digest(new_oracle, nonce, id),
        };
        verify_witness(contract, &digest, witness)?;

        let bridge = contract.bridge.clone();
        let contract = inner.oracles.get_mut(oracle).ok_or_else(|| format!("no oracle at {}", oracle))?;
        contract.nonce += 1;
        let event = match call {
            Call::Anchor { root, height } => {
                contract.anchor_root = root;
                contract.anchor_height = height;
                Some(ChainEvent {
                    height: head,
                    contract: oracle.clone(),
                    name: ANCHOR_EVENT.to_string(),
                    args: json!({ "root": root.to_hex(), "height": height, "nonce": nonce }),
                })
            }
            Call::Tempo { kind: TempoKind::Anchor, value } => {
                contract.t_anchor = value;
                None
            }
            Call::Tempo { kind: TempoKind::Final, value } => {
                contract.t_final = value;
                None
            }
            Call::Validators(validators) => {
                contract.validators = validators.iter().map(ValidatorAddress::normalized).collect();
                None
            }
            Call::Oracle(new_oracle) => {
                inner.bridges.insert(bridge, new_oracle);
                None
            }
        };
        Ok(event)
    }
}

#[async_trait]
impl ChainClient for InMemoryChain {
    fn name(&self) -> &ChainName {
        &self.name
    }

    async fn last_irreversible_height(&self) -> Result<Option<u64>> {
        let inner = self.inner.lock();
        self.ensure_online(&inner, "last_irreversible_height")?;
        if inner.lib_unavailable || inner.head < inner.finality_lag {
            return Ok(None);
        }
        Ok(Some(inner.head - inner.finality_lag))
    }

    async fn block_root(&self, height: u64) -> Result<Option<StateRoot>> {
        let inner = self.inner.lock();
        self.ensure_online(&inner, "block_root")?;
        if height > inner.head {
            return Ok(None);
        }
        Ok(inner.roots.get(&height).copied())
    }

    async fn query_contract_state(&self, address: &ContractAddress, wanted: &[&str]) -> Result<ContractState> {
        let inner = self.inner.lock();
        self.ensure_online(&inner, "query_contract_state")?;
        let mut out = BTreeMap::new();
        if let Some(contract) = inner.oracles.get(address) {
            for key in wanted {
                let value = match *key {
                    keys::ANCHOR_ROOT => json!(contract.anchor_root.to_hex()),
                    keys::ANCHOR_HEIGHT => json!(contract.anchor_height),
                    keys::T_ANCHOR => json!(contract.t_anchor),
                    keys::T_FINAL => json!(contract.t_final),
                    keys::NONCE => json!(contract.nonce),
                    keys::VALIDATORS => json!(contract.validators.iter().map(|v| v.as_str()).collect::<Vec<_>>()),
                    keys::CONTRACT_ID => json!(contract.contract_id.as_str()),
                    _ => continue,
                };
                out.insert(key.to_string(), value);
            }
        } else if let Some(oracle) = inner.bridges.get(address) {
            if wanted.contains(&keys::ORACLE) {
                out.insert(keys::ORACLE.to_string(), json!(oracle.as_str()));
            }
        } else {
            return Err(BridgeError::missing_state(address.as_str(), "contract"));
        }
        Ok(ContractState(out))
    }

    async fn submit_contract_call(&self, address: &ContractAddress, function: &str, args: Vec<Value>) -> Result<TxHandle> {
        let mut inner = self.inner.lock();
        self.ensure_online(&inner, "submit_contract_call")?;
        if !inner.oracles.contains_key(address) {
            return Err(BridgeError::TxCommitFailed(format!("no contract at {}", address)));
        }
        let (call, witness) = parse_call(function, &args).map_err(BridgeError::TxCommitFailed)?;

        inner.next_tx += 1;
        let tx_id = TxId::new(format!("{}-tx-{}", self.name, inner.next_tx));
        inner.calls.push(RecordedCall { contract: address.clone(), function: function.to_string(), args, tx_id: tx_id.clone() });

        let result = match Self::execute(&mut inner, address, call, &witness) {
            Ok(event) => {
                info!("memory chain executed chain={} function={} tx_id={}", self.name, function, tx_id);
                if let Some(event) = event {
                    inner.events.push(event.clone());
                    let _ = self.events.send(event);
                }
                TxResult::success()
            }
            Err(detail) => {
                debug!("memory chain execution failed chain={} function={} tx_id={} detail={}", self.name, function, tx_id, detail);
                TxResult::failed(detail)
            }
        };
        inner.results.insert(tx_id.clone(), result);
        Ok(TxHandle { tx_id })
    }

    async fn tx_result(&self, handle: &TxHandle) -> Result<Option<TxResult>> {
        let inner = self.inner.lock();
        self.ensure_online(&inner, "tx_result")?;
        Ok(inner.results.get(&handle.tx_id).cloned())
    }

    async fn subscribe_event(&self, address: &ContractAddress, event: &str, from_height: u64) -> Result<BoxStream<'static, ChainEvent>> {
        let (backlog, rx) = {
            let inner = self.inner.lock();
            self.ensure_online(&inner, "subscribe_event")?;
            let backlog: Vec<ChainEvent> = inner
                .events
                .iter()
                .filter(|e| &e.contract == address && e.name == event && e.height >= from_height)
                .cloned()
                .collect();
            (backlog, self.events.subscribe())
        };
        let address = address.clone();
        let event = event.to_string();
        let live = stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => return Some((ev, rx)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .filter(move |e| futures_util::future::ready(e.contract == address && e.name == event && e.height >= from_height));
        Ok(stream::iter(backlog).chain(live).boxed())
    }
}
