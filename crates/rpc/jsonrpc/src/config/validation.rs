//! Configuration validation.
//!
//! Collects all errors before returning so that several problems can be
//! fixed in one pass.

use std::collections::HashSet;
use std::net::SocketAddr;

use chainview_chain::AddressCodec;

use crate::config::types::{CacheSettings, RpcConfig};
use crate::error::ConfigError;

/// Upper bound on entries per derived-data cache.
const MAX_CACHE_SIZE: usize = 1 << 20;

/// Validate the RPC configuration.
pub fn validate_config(config: &RpcConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_server(config, &mut errors);
    validate_cache(&config.cache, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(errors))
    }
}

fn validate_server(config: &RpcConfig, errors: &mut Vec<String>) {
    if config.http_addr.parse::<SocketAddr>().is_err() {
        errors.push(format!(
            "http_addr '{}' must be a socket address (host:port)",
            config.http_addr
        ));
    }

    if config.chain_id == 0 {
        errors.push("chain_id must be greater than 0".to_string());
    }

    if let Err(e) = AddressCodec::new(&config.address_hrp) {
        errors.push(format!("address_hrp: {e}"));
    }

    if config.versions.is_empty() {
        errors.push("versions must list at least one API version".to_string());
    }

    let mut seen = HashSet::new();
    for version in &config.versions {
        if !seen.insert(version) {
            errors.push(format!("versions lists '{version}' more than once"));
        }
    }
}

fn validate_cache(config: &CacheSettings, errors: &mut Vec<String>) {
    let sizes = [
        ("leader_cache_size", config.leader_cache_size),
        ("signer_cache_size", config.signer_cache_size),
        ("staking_tx_cache_size", config.staking_tx_cache_size),
    ];
    for (name, size) in sizes {
        if size == 0 || size > MAX_CACHE_SIZE {
            errors.push(format!(
                "cache.{name} must be between 1 and {MAX_CACHE_SIZE}"
            ));
        }
    }
}
