//! Infrastructure layer: chain access, configuration, keys, logging and RPC resilience.

pub mod chain;
pub mod config;
pub mod jsonrpc;
pub mod keys;
pub mod logging;
pub mod rpc;
