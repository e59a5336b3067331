//! Resilience helpers for outbound RPC: a per-endpoint circuit breaker and bounded retry.

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
pub use retry::retry_transient;
