use crate::domain::signature::parse_address;
use crate::domain::Direction;
use crate::infrastructure::config::types::{AppConfig, ChainConfig};
use std::collections::HashSet;
use std::net::SocketAddr;

const MAX_VALIDATORS: usize = 128;

fn validate_chain(label: &str, chain: &ChainConfig, errors: &mut Vec<String>) {
    if chain.name.trim().is_empty() {
        errors.push(format!("bridge.{label}.name must be set"));
    }
    if chain.rpc_url.trim().is_empty() {
        errors.push(format!("bridge.{label}.rpc_url must be set"));
    } else if !(chain.rpc_url.starts_with("http://") || chain.rpc_url.starts_with("https://")) {
        errors.push(format!("bridge.{label}.rpc_url must be an http(s) url: {}", chain.rpc_url));
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        validate_chain("primary", &self.bridge.primary, &mut errors);
        validate_chain("secondary", &self.bridge.secondary, &mut errors);
        if !self.bridge.primary.name.is_empty() && self.bridge.primary.name == self.bridge.secondary.name {
            errors.push("bridge.primary and bridge.secondary must be different chains".to_string());
        }

        for direction in self.directions() {
            let cfg = self.bridge.direction(direction);
            let label = match direction {
                Direction::PrimaryToSecondary => "primary_to_secondary",
                Direction::SecondaryToPrimary => "secondary_to_primary",
            };
            if cfg.oracle_address.trim().is_empty() {
                errors.push(format!("bridge.{label}.oracle_address must be set"));
            }
            if cfg.bridge_address.trim().is_empty() {
                errors.push(format!("bridge.{label}.bridge_address must be set"));
            }
            if cfg.t_anchor == 0 {
                errors.push(format!("bridge.{label}.t_anchor must be > 0"));
            }
            if cfg.t_final == 0 {
                errors.push(format!("bridge.{label}.t_final must be > 0"));
            }
        }

        if self.validators.is_empty() {
            errors.push("validators must not be empty".to_string());
        }
        if self.validators.len() > MAX_VALIDATORS {
            errors.push(format!("validators should not exceed {}", MAX_VALIDATORS));
        }
        let mut seen = HashSet::new();
        for (idx, entry) in self.validators.iter().enumerate() {
            if let Err(err) = parse_address(&entry.address) {
                errors.push(format!("validators[{}].address invalid: {}", idx, err));
            }
            if !seen.insert(entry.address.normalized()) {
                errors.push(format!("validators[{}].address duplicated: {}", idx, entry.address));
            }
            if entry.endpoint.trim().is_empty() {
                errors.push(format!("validators[{}].endpoint must be set", idx));
            }
        }

        if self.rpc.enabled && self.rpc.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!("rpc.addr is not a socket address: {}", self.rpc.addr));
        }
        if let Some(token) = self.rpc.token.as_ref() {
            if token.trim().is_empty() {
                errors.push("rpc.token must not be blank when set".to_string());
            }
        }
        if matches!(self.rpc.rate_limit_rps, Some(0)) {
            errors.push("rpc.rate_limit_rps must be > 0 when set".to_string());
        }

        if self.proposer.oracle_update_enabled && !self.proposer.auto_update_enabled {
            errors.push("proposer.oracle_update_enabled requires proposer.auto_update_enabled".to_string());
        }
        if self.validator.oracle_update_enabled && !self.validator.auto_update_enabled {
            errors.push("validator.oracle_update_enabled requires validator.auto_update_enabled".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
