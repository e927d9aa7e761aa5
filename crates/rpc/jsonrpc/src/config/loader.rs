//! Reading [`RpcConfig`] from YAML.

use std::path::Path;

use crate::config::types::RpcConfig;
use crate::config::validation::validate_config;
use crate::error::ConfigError;

impl RpcConfig {
    /// Parse and validate a YAML document. `origin` names the document in
    /// error messages.
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_owned(),
            source,
        })?;
        validate_config(&config).map(|()| config)
    }

    /// Read, parse and validate the YAML file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content, &origin),
            Err(source) => Err(ConfigError::FileRead {
                path: origin,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainview_rpc_types::ApiVersion;

    const VALID_CONFIG: &str = r#"
http_addr: "0.0.0.0:9500"
chain_id: 2
eth_chain_id: 1666700000
address_hrp: "one"
versions: [legacy_v1, eth]
rate_limit:
  enabled: true
  requests_per_second: 50
cache:
  signer_cache_size: 512
"#;

    #[test]
    fn test_load_valid_config() {
        let config = RpcConfig::from_yaml(VALID_CONFIG, "rpc.yaml").unwrap();
        assert_eq!(config.chain_id, 2);
        assert_eq!(
            config.versions,
            vec![ApiVersion::LegacyV1, ApiVersion::EthCompatible]
        );
        assert_eq!(config.rate_limit.requests_per_second, 50);
        assert_eq!(config.cache.signer_cache_size, 512);
        assert_eq!(config.cache.leader_cache_size, 2048);
    }

    #[test]
    fn test_defaults_applied() {
        let config = RpcConfig::from_yaml("{}", "rpc.yaml").unwrap();
        assert_eq!(config.http_addr, "127.0.0.1:9500");
        assert_eq!(config.versions.len(), 3);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests_per_second, 1000);
        assert_eq!(config.cache.staking_tx_cache_size, 2048);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = RpcConfig::from_yaml("chain_id: 1\nmystery: true\n", "rpc.yaml");
        match result.unwrap_err() {
            ConfigError::Parse { .. } => {}
            e => panic!("Expected Parse error, got {:?}", e),
        }
    }

    #[test]
    fn test_unknown_version_rejected() {
        let result = RpcConfig::from_yaml("versions: [v3]\n", "rpc.yaml");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = RpcConfig::from_file("/nonexistent/chainview/rpc.yaml");
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }
}
