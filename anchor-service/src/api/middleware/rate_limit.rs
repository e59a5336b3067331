//! Per-IP fixed-window limiter for `/rpc`.
//!
//! Each client gets `rps` requests per window plus `burst` extra; both reset
//! when the window rolls over. Idle clients are swept periodically.

use crate::api::state::RpcState;
use anchor_core::foundation::{RPC_RATE_LIMIT_CLEANUP_INTERVAL_SECS, RPC_RATE_LIMIT_ENTRY_TTL_SECS, RPC_RATE_LIMIT_WINDOW_SECS};
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(RPC_RATE_LIMIT_WINDOW_SECS);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(RPC_RATE_LIMIT_CLEANUP_INTERVAL_SECS);
const ENTRY_TTL: Duration = Duration::from_secs(RPC_RATE_LIMIT_ENTRY_TTL_SECS);

#[derive(Debug)]
struct Window {
    started: Instant,
    steady: u32,
    burst: u32,
    last_seen: Instant,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self { started: now, steady: 0, burst: 0, last_seen: now }
    }

    fn admit(&mut self, now: Instant, rps: u32, burst: u32) -> bool {
        self.last_seen = now;
        if now.duration_since(self.started) >= WINDOW {
            self.started = now;
            self.steady = 0;
            self.burst = 0;
        }
        if self.steady < rps {
            self.steady += 1;
            true
        } else if self.burst < burst {
            self.burst += 1;
            true
        } else {
            false
        }
    }
}

#[derive(Debug)]
struct Clients {
    windows: HashMap<IpAddr, Window>,
    last_sweep: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    clients: Mutex<Clients>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self { clients: Mutex::new(Clients { windows: HashMap::new(), last_sweep: Instant::now() }) }
    }

    pub fn allow(&self, now: Instant, client_ip: IpAddr, rps: u32, burst: u32) -> bool {
        let mut clients = self.clients.lock();
        if now.duration_since(clients.last_sweep) >= CLEANUP_INTERVAL {
            clients.last_sweep = now;
            let cutoff = now.checked_sub(ENTRY_TTL).unwrap_or(now);
            clients.windows.retain(|_, window| window.last_seen >= cutoff);
        }
        clients.windows.entry(client_ip).or_insert_with(|| Window::new(now)).admit(now, rps, burst)
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<RpcState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let rps = state.rate_limit_rps.max(1);
    let burst = state.rate_limit_burst;
    let client_ip = addr.ip();

    if !state.rate_limiter.allow(Instant::now(), client_ip, rps, burst) {
        debug!("rate limit exceeded client_ip={} rps={} burst={}", client_ip, rps, burst);
        return (StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded").into_response();
    }
    next.run(req).await
}
