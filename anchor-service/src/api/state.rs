use crate::api::RateLimiter;
use crate::service::metrics::Metrics;
use anchor_core::application::ValidatorApprovalService;
use anchor_core::foundation::{DEFAULT_RPC_RATE_LIMIT_BURST, DEFAULT_RPC_RATE_LIMIT_RPS};
use anchor_core::infrastructure::config::RpcConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct RpcState {
    pub approval: Arc<ValidatorApprovalService>,
    pub metrics: Arc<Metrics>,
    pub rpc_token: Option<String>,
    pub rate_limiter: Arc<RateLimiter>,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
}

impl RpcState {
    pub fn new(approval: Arc<ValidatorApprovalService>, metrics: Arc<Metrics>, rpc: &RpcConfig) -> Self {
        Self {
            approval,
            metrics,
            rpc_token: rpc.token.clone().filter(|token| !token.trim().is_empty()),
            rate_limiter: Arc::new(RateLimiter::new()),
            rate_limit_rps: rpc.rate_limit_rps.unwrap_or(DEFAULT_RPC_RATE_LIMIT_RPS),
            rate_limit_burst: rpc.rate_limit_burst.unwrap_or(DEFAULT_RPC_RATE_LIMIT_BURST),
        }
    }
}
