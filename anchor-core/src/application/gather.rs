//! Parallel fan-out to every validator of the roster, then quorum selection.

use crate::application::client::{ValidatorClient, ValidatorClientFactory};
use crate::domain::{aggregate, AnchorProposal, Approval, QuorumResult, SettingProposal, ValidatorRoster};
use crate::foundation::util::hex_fmt::short_hex;
use crate::foundation::{Digest, Result};
use crate::infrastructure::config::AppConfig;
use futures_util::future::join_all;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy)]
enum Request<'a> {
    Anchor(&'a AnchorProposal),
    Setting(&'a SettingProposal),
}

/// Clients for the current roster, in roster order.
pub struct ValidatorPool {
    roster: ValidatorRoster,
    clients: Vec<Arc<dyn ValidatorClient>>,
    timeout: Duration,
}

impl ValidatorPool {
    pub fn connect(roster: ValidatorRoster, factory: &dyn ValidatorClientFactory, timeout: Duration) -> Result<Self> {
        let clients = roster.entries().iter().map(|entry| factory.connect(entry)).collect::<Result<Vec<_>>>()?;
        info!("validator pool connected validators={} roster={}", roster.len(), hex::encode(&roster.fingerprint()[..8]));
        Ok(Self { roster, clients, timeout })
    }

    pub fn from_config(config: &AppConfig, factory: &dyn ValidatorClientFactory) -> Result<Self> {
        let roster = ValidatorRoster::new(config.validators.clone())?;
        Self::connect(roster, factory, Duration::from_millis(config.validator_timeout_ms()))
    }

    pub fn roster(&self) -> &ValidatorRoster {
        &self.roster
    }

    pub async fn gather_anchor(&self, proposal: &AnchorProposal, digest: &Digest) -> Result<QuorumResult> {
        let responses = self.collect(Request::Anchor(proposal)).await;
        aggregate(digest, &self.roster, &responses)
    }

    pub async fn gather_setting(&self, proposal: &SettingProposal, digest: &Digest) -> Result<QuorumResult> {
        let responses = self.collect(Request::Setting(proposal)).await;
        aggregate(digest, &self.roster, &responses)
    }

    /// One slot per validator. Errors, timeouts and rejections are all `None`.
    async fn collect(&self, request: Request<'_>) -> Vec<Option<Approval>> {
        let calls = self.clients.iter().enumerate().map(|(index, client)| async move {
            let call = async {
                match request {
                    Request::Anchor(p) => client.anchor_signature(p).await,
                    Request::Setting(p) => client.setting_signature(p).await,
                }
            };
            match tokio::time::timeout(self.timeout, call).await {
                Ok(Ok(approval)) => {
                    if let Some(reason) = approval.error() {
                        info!("validator rejected index={} endpoint={} reason={}", index + 1, client.endpoint(), reason);
                        None
                    } else {
                        if let Approval::Signed { signature, .. } = &approval {
                            debug!("validator signed index={} endpoint={} signature={}", index + 1, client.endpoint(), short_hex(signature));
                        }
                        Some(approval)
                    }
                }
                Ok(Err(err)) => {
                    debug!("validator call failed index={} endpoint={} error={}", index + 1, client.endpoint(), err);
                    None
                }
                Err(_) => {
                    debug!(
                        "validator call timed out index={} endpoint={} timeout_ms={}",
                        index + 1,
                        client.endpoint(),
                        self.timeout.as_millis()
                    );
                    None
                }
            }
        });
        join_all(calls).await
    }
}
