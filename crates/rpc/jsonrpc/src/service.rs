//! Version-agnostic block-query service.
//!
//! One [`QueryService`] serves one API version. It owns the derived-data
//! caches, the admission gate and the version's [`BlockFactory`]; everything
//! version-specific is delegated to the factory.

use std::sync::Arc;

use alloy_primitives::{hex, Address, B256};
use chainview_chain::{
    AddressCodec, Block, BlockDataCache, ChainBackend, EpochCommittees, Header, SignerData,
    SignerResolver,
};
use chainview_rpc_types::{
    Amount, ApiVersion, BadBlock, BlockNumber, BlockOptions, CommitteeMember, CrossLink,
    EpochCommitteeInfo, FixedDecimal, HeaderInformation, LatestChainHeaders, Quantity,
    RenderOptions, RenderedBlock, ShardCommitteeInfo, ShardInfo, StakingNetworkInfo,
    StakingTransactions, SuperCommitteeInfo, UtilityMetrics,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RpcConfig;
use crate::error::{RpcError, RpcResult};
use crate::factory::{factory_for, BlockData, BlockFactory};
use crate::gate::AdmissionGate;
use crate::metrics::RpcMetrics;

/// Largest span `end - start` accepted by [`QueryService::get_blocks`].
pub const MAX_BLOCK_RANGE: u64 = 1024;

pub struct QueryService<B> {
    backend: Arc<B>,
    factory: Arc<dyn BlockFactory>,
    cache: BlockDataCache,
    gate: AdmissionGate,
    codec: AddressCodec,
    metrics: RpcMetrics,
    chain_id: u64,
    eth_chain_id: u64,
}

impl<B: ChainBackend> QueryService<B> {
    pub fn new(
        backend: Arc<B>,
        version: ApiVersion,
        config: &RpcConfig,
        metrics: RpcMetrics,
    ) -> RpcResult<Self> {
        let codec = AddressCodec::new(&config.address_hrp)
            .map_err(|err| RpcError::Internal(err.to_string()))?;
        Ok(Self {
            backend,
            factory: factory_for(version, codec.clone()),
            cache: BlockDataCache::new(config.cache.into(), metrics.cache.clone()),
            gate: AdmissionGate::new(config.rate_limit, metrics.clone()),
            codec,
            metrics,
            chain_id: config.chain_id,
            eth_chain_id: config.eth_chain_id,
        })
    }

    pub fn version(&self) -> ApiVersion {
        self.factory.version()
    }

    pub fn cache(&self) -> &BlockDataCache {
        &self.cache
    }

    pub fn metrics(&self) -> &RpcMetrics {
        &self.metrics
    }

    async fn observe<T, F>(&self, method: &str, request: F) -> RpcResult<T>
    where
        F: std::future::Future<Output = RpcResult<T>>,
    {
        self.metrics
            .instrument(self.version().namespace(), method, request)
            .await
    }

    async fn head(&self) -> RpcResult<Header> {
        self.backend
            .current_header()
            .await
            .map_err(RpcError::upstream("reading chain head"))
    }

    fn decode_address(&self, address: &str) -> RpcResult<Address> {
        self.codec
            .decode(address)
            .map_err(|err| RpcError::InvalidAddress(err.to_string()))
    }

    fn require_beacon(&self) -> RpcResult<()> {
        if self.backend.shard_id() == self.backend.beacon_shard_id() {
            Ok(())
        } else {
            Err(RpcError::NotBeaconShard)
        }
    }

    async fn leader(&self, header: &Header) -> RpcResult<Address> {
        self.cache
            .leaders
            .get_or_try_insert_with_async(header.number, move || async move {
                self.backend
                    .leader_address(header.coinbase, header.epoch)
                    .await
                    .map_err(RpcError::upstream("resolving block leader"))
            })
            .await
    }

    /// Signers of `number` against a head already read by the caller.
    ///
    /// Blocks without a committee snapshot yield an empty set that is not
    /// cached, so it cannot shadow the real set once the chain moves on.
    async fn signers(&self, number: u64, head: u64) -> RpcResult<Arc<SignerData>> {
        if number == 0 || number >= head {
            return Ok(Arc::new(SignerData::default()));
        }
        self.cache
            .signers
            .get_or_try_insert_with_async(number, move || async move {
                SignerResolver::new(self.backend.as_ref(), &self.codec, head)
                    .resolve(number)
                    .await
                    .map(Arc::new)
                    .map_err(RpcError::upstream("resolving block signers"))
            })
            .await
    }

    /// Header summary for a header that may belong to another shard, so the
    /// leader is looked up without going through the block-number cache.
    async fn foreign_header_info(&self, header: &Header) -> RpcResult<HeaderInformation> {
        let leader = self
            .backend
            .leader_address(header.coinbase, header.epoch)
            .await
            .map_err(RpcError::upstream("resolving block leader"))?;
        self.factory.new_header_info(header, &leader)
    }

    fn committee_info(&self, committees: &EpochCommittees) -> RpcResult<EpochCommitteeInfo> {
        let shards = committees
            .shards
            .iter()
            .map(|shard| {
                let subcommittee = shard
                    .slots
                    .iter()
                    .map(|slot| {
                        Ok(CommitteeMember {
                            bls_public_key: hex::encode(slot.bls_public_key),
                            earning_account: self.codec.encode(&slot.address)?,
                        })
                    })
                    .collect::<RpcResult<Vec<_>>>()?;
                Ok(ShardCommitteeInfo {
                    shard_id: shard.shard_id,
                    subcommittee,
                })
            })
            .collect::<RpcResult<Vec<_>>>()?;
        Ok(EpochCommitteeInfo {
            epoch: committees.epoch,
            shards,
        })
    }

    fn staking_transactions(&self, block: &Block) -> RpcResult<Arc<StakingTransactions>> {
        self.cache
            .staking_transactions
            .get_or_try_insert_with(block.number(), || {
                self.factory.staking_transactions(block).map(Arc::new)
            })
    }

    async fn render(
        &self,
        block: &Block,
        options: &RenderOptions,
        head: u64,
    ) -> RpcResult<RenderedBlock> {
        let leader = self.leader(&block.header).await?;
        let signers = if options.include_signers {
            Some(self.signers(block.number(), head).await?)
        } else {
            None
        };
        let staking_transactions =
            if options.include_staking_transactions && options.include_full_transactions {
                Some(self.staking_transactions(block)?)
            } else {
                None
            };
        let data = BlockData {
            leader,
            signers,
            staking_transactions,
        };
        self.factory.new_block(block, &data, options)
    }

    pub async fn chain_id(&self) -> RpcResult<Quantity> {
        self.observe("chainId", async {
            Ok(self.factory.chain_id(self.chain_id, self.eth_chain_id))
        })
        .await
    }

    pub async fn block_number(&self) -> RpcResult<Quantity> {
        self.observe("blockNumber", async {
            let head = self.head().await?;
            Ok(self.factory.quantity(head.number))
        })
        .await
    }

    pub async fn get_block_by_number(
        &self,
        number: BlockNumber,
        options: Option<BlockOptions>,
    ) -> RpcResult<Option<RenderedBlock>> {
        self.observe("getBlockByNumber", async {
            self.gate.wait().await?;
            let options = self.factory.parse_options(options)?;
            let head = self.head().await?.number;
            let number = resolve(number, head)?;
            let block = self
                .backend
                .block_by_number(number)
                .await
                .map_err(RpcError::upstream("reading block"))?;
            match block {
                Some(block) => self.render(&block, &options, head).await.map(Some),
                None => self.factory.missing_block(number),
            }
        })
        .await
    }

    pub async fn get_block_by_hash(
        &self,
        hash: B256,
        options: Option<BlockOptions>,
    ) -> RpcResult<RenderedBlock> {
        self.observe("getBlockByHash", async {
            self.gate.wait().await?;
            let options = self.factory.parse_options(options)?;
            let head = self.head().await?.number;
            let block = self
                .backend
                .block_by_hash(hash)
                .await
                .map_err(RpcError::upstream("reading block"))?
                .ok_or_else(|| RpcError::NotFound(format!("block {hash}")))?;
            self.render(&block, &options, head).await
        })
        .await
    }

    /// Blocks `start..=end` in ascending order.
    ///
    /// The range ends early, without error, at the chain head. Heights the
    /// store has no block for are skipped.
    pub async fn get_blocks(
        &self,
        start: BlockNumber,
        end: BlockNumber,
        options: Option<BlockOptions>,
        cancel: &CancellationToken,
    ) -> RpcResult<Vec<RenderedBlock>> {
        self.observe("getBlocks", async {
            self.gate.wait().await?;
            let options = self.factory.parse_options(options)?;
            let head = self.head().await?.number;
            let start = resolve(start, head)?;
            let end = resolve(end, head)?;
            if end >= start && end - start > MAX_BLOCK_RANGE {
                return Err(RpcError::RangeTooLarge {
                    limit: MAX_BLOCK_RANGE,
                });
            }
            debug!(start, end, head, "serving block range");

            let mut blocks = Vec::new();
            for number in start..=end {
                if cancel.is_cancelled() {
                    warn!(start, end, reached = number, "block range query cancelled");
                    return Err(RpcError::Cancelled);
                }
                if number > head {
                    break;
                }
                let block = self
                    .backend
                    .block_by_number(number)
                    .await
                    .map_err(RpcError::upstream("reading block"))?;
                if let Some(block) = block {
                    blocks.push(self.render(&block, &options, head).await?);
                }
            }
            Ok(blocks)
        })
        .await
    }

    pub async fn get_block_signers(&self, number: BlockNumber) -> RpcResult<Vec<String>> {
        self.observe("getBlockSigners", async {
            self.gate.wait().await?;
            let head = self.head().await?.number;
            let number = resolve(number, head)?;
            Ok(self.signers(number, head).await?.signer_addresses.clone())
        })
        .await
    }

    pub async fn get_block_signer_keys(&self, number: BlockNumber) -> RpcResult<Vec<String>> {
        self.observe("getBlockSignerKeys", async {
            self.gate.wait().await?;
            let head = self.head().await?.number;
            let number = resolve(number, head)?;
            Ok(self.signers(number, head).await?.signer_bls_keys.clone())
        })
        .await
    }

    /// Whether `address` signed block `number`. Genesis has no signers, so
    /// the address is not even parsed for it.
    pub async fn is_block_signer(&self, number: BlockNumber, address: &str) -> RpcResult<bool> {
        self.observe("isBlockSigner", async {
            self.gate.wait().await?;
            let head = self.head().await?.number;
            let number = resolve(number, head)?;
            if number == 0 {
                return Ok(false);
            }
            let address = self.codec.encode(&self.decode_address(address)?)?;
            Ok(self.signers(number, head).await?.contains(&address))
        })
        .await
    }

    /// Number of blocks `address` signed.
    ///
    /// Before staking is active this rescans the signer sets of the current
    /// epoch window. Afterwards the count comes from the validator's record,
    /// relative to its snapshot at the end of the previous epoch.
    pub async fn get_signed_blocks(&self, address: &str) -> RpcResult<Quantity> {
        self.observe("getSignedBlocks", async {
            self.gate.wait().await?;
            let address = self.decode_address(address)?;
            let head = self.head().await?;

            if !self.backend.is_staking_epoch(head.epoch) {
                let encoded = self.codec.encode(&address)?;
                let window = self.backend.blocks_per_epoch(head.epoch);
                let first = (head.number + 1).saturating_sub(window).max(1);
                let mut signed = 0u64;
                for number in first..=head.number {
                    if self.signers(number, head.number).await?.contains(&encoded) {
                        signed += 1;
                    }
                }
                return Ok(self.factory.quantity(signed));
            }

            let current = self
                .backend
                .validator_record(address)
                .await
                .map_err(RpcError::upstream("reading validator record"))?;
            let prior = self
                .backend
                .validator_snapshot_prior_epoch(address)
                .await
                .map_err(RpcError::upstream("reading validator snapshot"))?;
            let signed = current
                .blocks_signed
                .checked_sub(prior.blocks_signed)
                .ok_or_else(|| {
                    RpcError::Internal(format!(
                        "signed block count went backwards: {} < {}",
                        current.blocks_signed, prior.blocks_signed
                    ))
                })?;
            Ok(self.factory.quantity(signed))
        })
        .await
    }

    pub async fn get_epoch(&self) -> RpcResult<Quantity> {
        self.observe("getEpoch", async {
            let head = self.head().await?;
            Ok(self.factory.quantity(head.epoch))
        })
        .await
    }

    /// Leader of the current head block, bech32.
    pub async fn get_leader(&self) -> RpcResult<String> {
        self.observe("getLeader", async {
            self.gate.wait().await?;
            let head = self.head().await?;
            let leader = self.leader(&head).await?;
            Ok(self.codec.encode(&leader)?)
        })
        .await
    }

    pub async fn get_sharding_structure(&self) -> RpcResult<Vec<ShardInfo>> {
        self.observe("getShardingStructure", async {
            self.gate.wait().await?;
            self.backend
                .sharding_structure()
                .await
                .map_err(RpcError::upstream("reading sharding structure"))
        })
        .await
    }

    pub async fn get_shard_id(&self) -> RpcResult<u32> {
        self.observe("getShardID", async { Ok(self.backend.shard_id()) })
            .await
    }

    pub async fn get_balance_by_block_number(
        &self,
        address: &str,
        number: BlockNumber,
    ) -> RpcResult<Amount> {
        self.observe("getBalanceByBlockNumber", async {
            let address = self.decode_address(address)?;
            let head = self.head().await?.number;
            let number = match number {
                BlockNumber::Number(n) if n <= head => n,
                BlockNumber::Latest => head,
                BlockNumber::Number(_) | BlockNumber::Pending => {
                    return Err(RpcError::BlockTooHigh)
                }
            };
            let balance = self
                .backend
                .balance_at(address, number)
                .await
                .map_err(RpcError::upstream("reading balance"))?;
            Ok(self.factory.amount(balance))
        })
        .await
    }

    pub async fn latest_header(&self) -> RpcResult<HeaderInformation> {
        self.observe("latestHeader", async {
            self.gate.wait().await?;
            let head = self.head().await?;
            let leader = self.leader(&head).await?;
            self.factory.new_header_info(&head, &leader)
        })
        .await
    }

    pub async fn get_header_by_number(
        &self,
        number: BlockNumber,
    ) -> RpcResult<Option<HeaderInformation>> {
        self.observe("getHeaderByNumber", async {
            self.gate.wait().await?;
            let head = self.head().await?.number;
            let number = resolve(number, head)?;
            if number > head {
                return self.factory.missing_header(number);
            }
            let header = self
                .backend
                .header_by_number(number)
                .await
                .map_err(RpcError::upstream("reading header"))?;
            match header {
                Some(header) => {
                    let leader = self.leader(&header).await?;
                    self.factory.new_header_info(&header, &leader).map(Some)
                }
                None => self.factory.missing_header(number),
            }
        })
        .await
    }

    /// Hex of the stored header encoding of block `number`, without prefix.
    pub async fn get_header_by_number_rlp_hex(
        &self,
        number: BlockNumber,
    ) -> RpcResult<Option<String>> {
        self.observe("getHeaderByNumberRLPHex", async {
            self.gate.wait().await?;
            let head = self.head().await?.number;
            let number = resolve(number, head)?;
            if number > head {
                self.factory.missing_header(number)?;
                return Ok(None);
            }
            let encoded = self
                .backend
                .header_rlp(number)
                .await
                .map_err(RpcError::upstream("reading header"))?;
            match encoded {
                Some(encoded) => Ok(Some(hex::encode(encoded))),
                None => {
                    self.factory.missing_header(number)?;
                    Ok(None)
                }
            }
        })
        .await
    }

    pub async fn get_latest_chain_headers(&self) -> RpcResult<LatestChainHeaders> {
        self.observe("getLatestChainHeaders", async {
            let heads = self
                .backend
                .latest_chain_headers()
                .await
                .map_err(RpcError::upstream("reading chain heads"))?;
            Ok(LatestChainHeaders {
                beacon_chain_header: self.foreign_header_info(&heads.beacon).await?,
                shard_chain_header: self.foreign_header_info(&heads.shard).await?,
            })
        })
        .await
    }

    pub async fn is_last_block(&self, number: u64) -> RpcResult<bool> {
        self.observe("isLastBlock", async {
            self.require_beacon()?;
            Ok(self.backend.is_last_block(number))
        })
        .await
    }

    pub async fn epoch_last_block(&self, epoch: u64) -> RpcResult<Quantity> {
        self.observe("epochLastBlock", async {
            self.require_beacon()?;
            Ok(self.factory.quantity(self.backend.epoch_last_block(epoch)))
        })
        .await
    }

    pub async fn get_current_utility_metrics(&self) -> RpcResult<UtilityMetrics> {
        self.observe("getCurrentUtilityMetrics", async {
            self.require_beacon()?;
            self.gate.wait().await?;
            self.backend
                .utility_metrics()
                .await
                .map_err(RpcError::upstream("reading utility metrics"))
        })
        .await
    }

    pub async fn get_last_cross_links(&self) -> RpcResult<Vec<CrossLink>> {
        self.observe("getLastCrossLinks", async {
            self.gate.wait().await?;
            self.require_beacon()?;
            self.backend
                .last_cross_links()
                .await
                .map_err(RpcError::upstream("reading cross links"))
        })
        .await
    }

    pub async fn get_super_committees(&self) -> RpcResult<SuperCommitteeInfo> {
        self.observe("getSuperCommittees", async {
            self.gate.wait().await?;
            self.require_beacon()?;
            let committees = self
                .backend
                .super_committees()
                .await
                .map_err(RpcError::upstream("reading committees"))?;
            Ok(SuperCommitteeInfo {
                previous: self.committee_info(&committees.previous)?,
                current: self.committee_info(&committees.current)?,
            })
        })
        .await
    }

    pub async fn get_current_bad_blocks(&self) -> RpcResult<Vec<BadBlock>> {
        self.observe("getCurrentBadBlocks", async {
            self.gate.wait().await?;
            Ok(self.backend.bad_blocks())
        })
        .await
    }

    pub async fn get_staking_network_info(&self) -> RpcResult<StakingNetworkInfo> {
        self.observe("getStakingNetworkInfo", async {
            self.require_beacon()?;
            self.gate.wait().await?;
            let head = self.head().await?;
            let upstream = RpcError::upstream;
            Ok(StakingNetworkInfo {
                total_supply: self
                    .backend
                    .total_supply()
                    .await
                    .map_err(upstream("reading total supply"))?,
                circulating_supply: self
                    .backend
                    .circulating_supply()
                    .await
                    .map_err(upstream("reading circulating supply"))?,
                epoch_last_block: self.backend.epoch_last_block(head.epoch),
                total_staking: self
                    .backend
                    .total_staking_snapshot()
                    .await
                    .map_err(upstream("reading total staking"))?,
                median_raw_stake: self
                    .backend
                    .median_stake_snapshot()
                    .await
                    .map_err(upstream("reading median stake"))?,
            })
        })
        .await
    }

    pub async fn get_total_supply(&self) -> RpcResult<FixedDecimal> {
        self.observe("getTotalSupply", async {
            self.backend
                .total_supply()
                .await
                .map_err(RpcError::upstream("reading total supply"))
        })
        .await
    }

    pub async fn get_circulating_supply(&self) -> RpcResult<FixedDecimal> {
        self.observe("getCirculatingSupply", async {
            self.backend
                .circulating_supply()
                .await
                .map_err(RpcError::upstream("reading circulating supply"))
        })
        .await
    }

    pub async fn in_sync(&self) -> RpcResult<bool> {
        self.observe("inSync", async {
            Ok(self.backend.sync_status(self.backend.shard_id()).in_sync)
        })
        .await
    }

    pub async fn beacon_in_sync(&self) -> RpcResult<bool> {
        self.observe("beaconInSync", async {
            Ok(self
                .backend
                .sync_status(self.backend.beacon_shard_id())
                .in_sync)
        })
        .await
    }

    pub async fn set_node_to_backup_mode(&self, backup: bool) -> RpcResult<bool> {
        self.observe("setNodeToBackupMode", async {
            Ok(self.backend.set_backup_mode(backup))
        })
        .await
    }
}

fn resolve(number: BlockNumber, head: u64) -> RpcResult<u64> {
    match number {
        BlockNumber::Number(n) => Ok(n),
        BlockNumber::Latest => Ok(head),
        BlockNumber::Pending => Err(RpcError::PendingBlock),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::RateLimitConfig;
    use chainview_chain::testing::MockChain;
    use proptest::prelude::*;

    fn run_range(head: u64, start: u64, end: u64) -> RpcResult<Vec<u64>> {
        let config = RpcConfig {
            rate_limit: RateLimitConfig::disabled(),
            ..RpcConfig::default()
        };
        let svc = QueryService::new(
            Arc::new(MockChain::new(head)),
            ApiVersion::V2,
            &config,
            RpcMetrics::new(),
        )?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RpcError::Internal(e.to_string()))?;
        let blocks = runtime.block_on(svc.get_blocks(
            BlockNumber::Number(start),
            BlockNumber::Number(end),
            None,
            &CancellationToken::new(),
        ))?;
        Ok(blocks.iter().map(|b| b.number()).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_wide_range_always_rejected(
            head in 0u64..64,
            start in 0u64..10_000,
            extra in 1u64..5_000,
        ) {
            let end = start + MAX_BLOCK_RANGE + extra;
            let outcome = run_range(head, start, end);
            let is_range_too_large = matches!(outcome, Err(RpcError::RangeTooLarge { limit: 1024 }));
            prop_assert!(is_range_too_large);
        }

        #[test]
        fn prop_range_never_passes_head(
            head in 0u64..200,
            start in 0u64..300,
            width in 0u64..300,
        ) {
            let end = start + width;
            let numbers = run_range(head, start, end).unwrap();
            let expected: Vec<u64> = (start..=end.min(head)).collect();
            prop_assert_eq!(numbers, expected);
        }
    }
}
