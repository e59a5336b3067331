//! Validator HTTP surface: JSON-RPC signature methods plus health, readiness and metrics.

mod handlers;
mod middleware;
mod router;
mod state;

pub use handlers::types::{JsonRpcRequest, RpcErrorCode};
pub use middleware::rate_limit::RateLimiter;
pub use router::{build_router, run_json_rpc_server, serve};
pub use state::RpcState;
