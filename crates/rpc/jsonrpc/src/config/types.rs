//! Configuration types.

use chainview_chain::{CacheConfig, DEFAULT_CACHE_SIZE, DEFAULT_HRP};
use chainview_rpc_types::ApiVersion;
use serde::Deserialize;

/// Root configuration of the block-query RPC.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpcConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "RpcConfig::default_http_addr")]
    pub http_addr: String,

    /// Native chain id.
    #[serde(default = "RpcConfig::default_chain_id")]
    pub chain_id: u64,

    /// Chain id reported to Ethereum tooling.
    #[serde(default = "RpcConfig::default_eth_chain_id")]
    pub eth_chain_id: u64,

    /// Bech32 prefix for account addresses.
    #[serde(default = "RpcConfig::default_address_hrp")]
    pub address_hrp: String,

    /// API versions to serve. Each gets its own namespace and caches.
    #[serde(default = "RpcConfig::default_versions")]
    pub versions: Vec<ApiVersion>,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub cache: CacheSettings,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            http_addr: Self::default_http_addr(),
            chain_id: Self::default_chain_id(),
            eth_chain_id: Self::default_eth_chain_id(),
            address_hrp: Self::default_address_hrp(),
            versions: Self::default_versions(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl RpcConfig {
    fn default_http_addr() -> String {
        "127.0.0.1:9500".to_string()
    }

    const fn default_chain_id() -> u64 {
        1
    }

    const fn default_eth_chain_id() -> u64 {
        1_666_600_000
    }

    fn default_address_hrp() -> String {
        DEFAULT_HRP.to_string()
    }

    fn default_versions() -> Vec<ApiVersion> {
        vec![ApiVersion::LegacyV1, ApiVersion::V2, ApiVersion::EthCompatible]
    }
}

/// Admission gate settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default = "RateLimitConfig::default_enabled")]
    pub enabled: bool,

    /// Token refill rate. Burst is always one request.
    #[serde(default = "RateLimitConfig::default_requests_per_second")]
    pub requests_per_second: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            requests_per_second: Self::default_requests_per_second(),
        }
    }
}

impl RateLimitConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_requests_per_second() -> u64 {
        1000
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Derived-data cache capacities, in entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    #[serde(default = "CacheSettings::default_size")]
    pub leader_cache_size: usize,

    #[serde(default = "CacheSettings::default_size")]
    pub signer_cache_size: usize,

    #[serde(default = "CacheSettings::default_size")]
    pub staking_tx_cache_size: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            leader_cache_size: Self::default_size(),
            signer_cache_size: Self::default_size(),
            staking_tx_cache_size: Self::default_size(),
        }
    }
}

impl CacheSettings {
    const fn default_size() -> usize {
        DEFAULT_CACHE_SIZE
    }
}

impl From<CacheSettings> for CacheConfig {
    fn from(settings: CacheSettings) -> Self {
        CacheConfig {
            leader_cache_size: settings.leader_cache_size,
            signer_cache_size: settings.signer_cache_size,
            staking_tx_cache_size: settings.staking_tx_cache_size,
        }
    }
}
