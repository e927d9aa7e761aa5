//! JSON-RPC server implementation.
//!
//! Each enabled API version gets its own [`QueryService`], with its own
//! caches and admission gate, mounted under the version's namespace of a
//! single [`RpcModule`].

use std::net::SocketAddr;
use std::sync::Arc;

use alloy_primitives::B256;
use async_trait::async_trait;
use chainview_chain::ChainBackend;
use chainview_rpc_types::{
    Amount, ApiVersion, BadBlock, BlockNumber, BlockOptions, CrossLink, FixedDecimal,
    HeaderInformation, LatestChainHeaders, Quantity, RenderedBlock, ShardInfo, StakingNetworkInfo,
    SuperCommitteeInfo, UtilityMetrics,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{EthBlockchainApiServer, LegacyBlockchainApiServer, V2BlockchainApiServer};
use crate::config::RpcConfig;
use crate::error::{RpcError, RpcResult};
use crate::metrics::RpcMetrics;
use crate::service::QueryService;

/// RPC handler for one API version.
pub struct BlockchainRpc<B> {
    service: Arc<QueryService<B>>,
    /// Parent of the token handed to every range query.
    shutdown: CancellationToken,
}

impl<B> BlockchainRpc<B> {
    pub fn new(service: Arc<QueryService<B>>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }
}

impl<B> Clone for BlockchainRpc<B> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            shutdown: self.shutdown.clone(),
        }
    }
}

fn block_options(value: Option<Value>) -> RpcResult<Option<BlockOptions>> {
    value
        .filter(|v| !v.is_null())
        .map(BlockOptions::from_value)
        .transpose()
        .map_err(|err| RpcError::RequestFormat(format!("block options: {err}")))
}

macro_rules! impl_blockchain_api {
    ($api:ident) => {
        #[async_trait]
        impl<B: ChainBackend> $api for BlockchainRpc<B> {
            async fn chain_id(&self) -> Result<Quantity, ErrorObjectOwned> {
                Ok(self.service.chain_id().await?)
            }

            async fn block_number(&self) -> Result<Quantity, ErrorObjectOwned> {
                Ok(self.service.block_number().await?)
            }

            async fn get_block_by_number(
                &self,
                number: BlockNumber,
                options: Option<Value>,
            ) -> Result<Option<RenderedBlock>, ErrorObjectOwned> {
                let options = block_options(options)?;
                Ok(self.service.get_block_by_number(number, options).await?)
            }

            async fn get_block_by_hash(
                &self,
                hash: B256,
                options: Option<Value>,
            ) -> Result<RenderedBlock, ErrorObjectOwned> {
                let options = block_options(options)?;
                Ok(self.service.get_block_by_hash(hash, options).await?)
            }

            async fn get_blocks(
                &self,
                start: BlockNumber,
                end: BlockNumber,
                options: Option<Value>,
            ) -> Result<Vec<RenderedBlock>, ErrorObjectOwned> {
                let options = block_options(options)?;
                let cancel = self.shutdown.child_token();
                Ok(self
                    .service
                    .get_blocks(start, end, options, &cancel)
                    .await?)
            }

            async fn get_block_signers(
                &self,
                number: BlockNumber,
            ) -> Result<Vec<String>, ErrorObjectOwned> {
                Ok(self.service.get_block_signers(number).await?)
            }

            async fn get_block_signer_keys(
                &self,
                number: BlockNumber,
            ) -> Result<Vec<String>, ErrorObjectOwned> {
                Ok(self.service.get_block_signer_keys(number).await?)
            }

            async fn is_block_signer(
                &self,
                number: BlockNumber,
                address: String,
            ) -> Result<bool, ErrorObjectOwned> {
                Ok(self.service.is_block_signer(number, &address).await?)
            }

            async fn get_signed_blocks(&self, address: String) -> Result<Quantity, ErrorObjectOwned> {
                Ok(self.service.get_signed_blocks(&address).await?)
            }

            async fn get_epoch(&self) -> Result<Quantity, ErrorObjectOwned> {
                Ok(self.service.get_epoch().await?)
            }

            async fn get_leader(&self) -> Result<String, ErrorObjectOwned> {
                Ok(self.service.get_leader().await?)
            }

            async fn get_sharding_structure(&self) -> Result<Vec<ShardInfo>, ErrorObjectOwned> {
                Ok(self.service.get_sharding_structure().await?)
            }

            async fn get_shard_id(&self) -> Result<u32, ErrorObjectOwned> {
                Ok(self.service.get_shard_id().await?)
            }

            async fn get_balance_by_block_number(
                &self,
                address: String,
                number: BlockNumber,
            ) -> Result<Amount, ErrorObjectOwned> {
                Ok(self
                    .service
                    .get_balance_by_block_number(&address, number)
                    .await?)
            }

            async fn latest_header(&self) -> Result<HeaderInformation, ErrorObjectOwned> {
                Ok(self.service.latest_header().await?)
            }

            async fn get_header_by_number(
                &self,
                number: BlockNumber,
            ) -> Result<Option<HeaderInformation>, ErrorObjectOwned> {
                Ok(self.service.get_header_by_number(number).await?)
            }

            async fn get_header_by_number_rlp_hex(
                &self,
                number: BlockNumber,
            ) -> Result<Option<String>, ErrorObjectOwned> {
                Ok(self.service.get_header_by_number_rlp_hex(number).await?)
            }

            async fn get_latest_chain_headers(
                &self,
            ) -> Result<LatestChainHeaders, ErrorObjectOwned> {
                Ok(self.service.get_latest_chain_headers().await?)
            }

            async fn is_last_block(&self, number: u64) -> Result<bool, ErrorObjectOwned> {
                Ok(self.service.is_last_block(number).await?)
            }

            async fn epoch_last_block(&self, epoch: u64) -> Result<Quantity, ErrorObjectOwned> {
                Ok(self.service.epoch_last_block(epoch).await?)
            }

            async fn get_current_utility_metrics(
                &self,
            ) -> Result<UtilityMetrics, ErrorObjectOwned> {
                Ok(self.service.get_current_utility_metrics().await?)
            }

            async fn get_last_cross_links(&self) -> Result<Vec<CrossLink>, ErrorObjectOwned> {
                Ok(self.service.get_last_cross_links().await?)
            }

            async fn get_super_committees(
                &self,
            ) -> Result<SuperCommitteeInfo, ErrorObjectOwned> {
                Ok(self.service.get_super_committees().await?)
            }

            async fn get_current_bad_blocks(&self) -> Result<Vec<BadBlock>, ErrorObjectOwned> {
                Ok(self.service.get_current_bad_blocks().await?)
            }

            async fn get_staking_network_info(
                &self,
            ) -> Result<StakingNetworkInfo, ErrorObjectOwned> {
                Ok(self.service.get_staking_network_info().await?)
            }

            async fn get_total_supply(&self) -> Result<FixedDecimal, ErrorObjectOwned> {
                Ok(self.service.get_total_supply().await?)
            }

            async fn get_circulating_supply(&self) -> Result<FixedDecimal, ErrorObjectOwned> {
                Ok(self.service.get_circulating_supply().await?)
            }

            async fn in_sync(&self) -> Result<bool, ErrorObjectOwned> {
                Ok(self.service.in_sync().await?)
            }

            async fn beacon_in_sync(&self) -> Result<bool, ErrorObjectOwned> {
                Ok(self.service.beacon_in_sync().await?)
            }

            async fn set_node_to_backup_mode(
                &self,
                backup: bool,
            ) -> Result<bool, ErrorObjectOwned> {
                Ok(self.service.set_node_to_backup_mode(backup).await?)
            }
        }
    };
}

impl_blockchain_api!(LegacyBlockchainApiServer);
impl_blockchain_api!(V2BlockchainApiServer);
impl_blockchain_api!(EthBlockchainApiServer);

/// Assemble the RPC module for every version enabled in `config`.
pub fn build_module<B: ChainBackend>(
    backend: Arc<B>,
    config: &RpcConfig,
    metrics: RpcMetrics,
    shutdown: CancellationToken,
) -> Result<RpcModule<()>, Box<dyn std::error::Error + Send + Sync>> {
    let mut module = RpcModule::new(());

    for &version in &config.versions {
        let service = QueryService::new(backend.clone(), version, config, metrics.clone())?;
        let rpc = BlockchainRpc::new(Arc::new(service), shutdown.clone());
        match version {
            ApiVersion::LegacyV1 => module.merge(LegacyBlockchainApiServer::into_rpc(rpc))?,
            ApiVersion::V2 => module.merge(V2BlockchainApiServer::into_rpc(rpc))?,
            ApiVersion::EthCompatible => module.merge(EthBlockchainApiServer::into_rpc(rpc))?,
        }
    }

    Ok(module)
}

/// Start the RPC server.
///
/// Cancelling `shutdown` aborts in-flight range queries; stopping the server
/// itself is done through the returned handle.
pub async fn start_server<B: ChainBackend>(
    config: &RpcConfig,
    backend: Arc<B>,
    metrics: RpcMetrics,
    shutdown: CancellationToken,
) -> Result<ServerHandle, Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = config.http_addr.parse()?;
    let server = Server::builder().build(addr).await?;
    let local_addr = server.local_addr()?;

    let module = build_module(backend, config, metrics, shutdown)?;
    let handle = server.start(module);

    info!(
        addr = %local_addr,
        versions = ?config.versions,
        rate_limit = config.rate_limit.enabled,
        "block-query RPC server started"
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use chainview_chain::testing::MockChain;
    use serde_json::json;

    #[test]
    fn test_block_options_shapes() {
        assert_eq!(block_options(None).unwrap(), None);
        assert_eq!(block_options(Some(Value::Null)).unwrap(), None);
        assert_eq!(
            block_options(Some(json!(true))).unwrap(),
            Some(BlockOptions::FullTx(true))
        );
        assert!(matches!(
            block_options(Some(json!("yes"))),
            Err(RpcError::RequestFormat(_))
        ));
    }

    #[test]
    fn test_module_mounts_enabled_namespaces() {
        let config = RpcConfig {
            versions: vec![ApiVersion::LegacyV1, ApiVersion::EthCompatible],
            rate_limit: RateLimitConfig::disabled(),
            ..RpcConfig::default()
        };
        let module = build_module(
            Arc::new(MockChain::new(5)),
            &config,
            RpcMetrics::new(),
            CancellationToken::new(),
        )
        .unwrap();

        let names: Vec<&str> = module.method_names().collect();
        assert!(names.contains(&"chain_getBlockByNumber"));
        assert!(names.contains(&"eth_getBlocks"));
        assert!(!names.iter().any(|n| n.starts_with("chainv2_")));
    }

    #[tokio::test]
    async fn test_start_server_on_ephemeral_port() {
        let config = RpcConfig {
            http_addr: "127.0.0.1:0".to_string(),
            rate_limit: RateLimitConfig::disabled(),
            ..RpcConfig::default()
        };
        let handle = start_server(
            &config,
            Arc::new(MockChain::new(3)),
            RpcMetrics::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        handle.stop().unwrap();
        handle.stopped().await;
    }
}
