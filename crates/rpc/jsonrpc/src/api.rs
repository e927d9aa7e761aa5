//! JSON-RPC API trait definitions using jsonrpsee.
//!
//! The three API versions expose the same method set under different
//! namespaces. Only the wire encoding of results differs, and that is decided
//! by the service behind each namespace, so one macro stamps out all three
//! traits.

use alloy_primitives::B256;
use chainview_rpc_types::{
    Amount, BadBlock, BlockNumber, CrossLink, FixedDecimal, HeaderInformation,
    LatestChainHeaders, Quantity, RenderedBlock, ShardInfo, StakingNetworkInfo,
    SuperCommitteeInfo, UtilityMetrics,
};
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::types::ErrorObjectOwned;
use serde_json::Value;

macro_rules! blockchain_api {
    ($(#[$meta:meta])* $name:ident, $namespace:tt) => {
        $(#[$meta])*
        #[rpc(server, namespace = $namespace)]
        pub trait $name {
            /// Chain id in this version's encoding.
            #[method(name = "chainId")]
            async fn chain_id(&self) -> Result<Quantity, ErrorObjectOwned>;

            /// Number of the current head block.
            #[method(name = "blockNumber")]
            async fn block_number(&self) -> Result<Quantity, ErrorObjectOwned>;

            /// Block at `number`. `options` is a `fullTx` boolean or an
            /// options object, depending on the version.
            #[method(name = "getBlockByNumber")]
            async fn get_block_by_number(
                &self,
                number: BlockNumber,
                options: Option<Value>,
            ) -> Result<Option<RenderedBlock>, ErrorObjectOwned>;

            #[method(name = "getBlockByHash")]
            async fn get_block_by_hash(
                &self,
                hash: B256,
                options: Option<Value>,
            ) -> Result<RenderedBlock, ErrorObjectOwned>;

            /// Blocks `start..=end`, at most 1025 of them, ending early at the
            /// chain head.
            #[method(name = "getBlocks")]
            async fn get_blocks(
                &self,
                start: BlockNumber,
                end: BlockNumber,
                options: Option<Value>,
            ) -> Result<Vec<RenderedBlock>, ErrorObjectOwned>;

            #[method(name = "getBlockSigners")]
            async fn get_block_signers(
                &self,
                number: BlockNumber,
            ) -> Result<Vec<String>, ErrorObjectOwned>;

            #[method(name = "getBlockSignerKeys")]
            async fn get_block_signer_keys(
                &self,
                number: BlockNumber,
            ) -> Result<Vec<String>, ErrorObjectOwned>;

            #[method(name = "isBlockSigner")]
            async fn is_block_signer(
                &self,
                number: BlockNumber,
                address: String,
            ) -> Result<bool, ErrorObjectOwned>;

            #[method(name = "getSignedBlocks")]
            async fn get_signed_blocks(&self, address: String)
                -> Result<Quantity, ErrorObjectOwned>;

            #[method(name = "getEpoch")]
            async fn get_epoch(&self) -> Result<Quantity, ErrorObjectOwned>;

            /// Leader of the current head block.
            #[method(name = "getLeader")]
            async fn get_leader(&self) -> Result<String, ErrorObjectOwned>;

            #[method(name = "getShardingStructure")]
            async fn get_sharding_structure(&self) -> Result<Vec<ShardInfo>, ErrorObjectOwned>;

            #[method(name = "getShardID")]
            async fn get_shard_id(&self) -> Result<u32, ErrorObjectOwned>;

            #[method(name = "getBalanceByBlockNumber")]
            async fn get_balance_by_block_number(
                &self,
                address: String,
                number: BlockNumber,
            ) -> Result<Amount, ErrorObjectOwned>;

            #[method(name = "latestHeader")]
            async fn latest_header(&self) -> Result<HeaderInformation, ErrorObjectOwned>;

            #[method(name = "getHeaderByNumber")]
            async fn get_header_by_number(
                &self,
                number: BlockNumber,
            ) -> Result<Option<HeaderInformation>, ErrorObjectOwned>;

            /// Hex of the encoded header, without `0x`.
            #[method(name = "getHeaderByNumberRLPHex")]
            async fn get_header_by_number_rlp_hex(
                &self,
                number: BlockNumber,
            ) -> Result<Option<String>, ErrorObjectOwned>;

            #[method(name = "getLatestChainHeaders")]
            async fn get_latest_chain_headers(
                &self,
            ) -> Result<LatestChainHeaders, ErrorObjectOwned>;

            /// Beacon shard only.
            #[method(name = "isLastBlock")]
            async fn is_last_block(&self, number: u64) -> Result<bool, ErrorObjectOwned>;

            /// Beacon shard only.
            #[method(name = "epochLastBlock")]
            async fn epoch_last_block(&self, epoch: u64) -> Result<Quantity, ErrorObjectOwned>;

            /// Beacon shard only.
            #[method(name = "getCurrentUtilityMetrics")]
            async fn get_current_utility_metrics(
                &self,
            ) -> Result<UtilityMetrics, ErrorObjectOwned>;

            /// Beacon shard only.
            #[method(name = "getLastCrossLinks")]
            async fn get_last_cross_links(&self) -> Result<Vec<CrossLink>, ErrorObjectOwned>;

            /// Beacon shard only.
            #[method(name = "getSuperCommittees")]
            async fn get_super_committees(&self)
                -> Result<SuperCommitteeInfo, ErrorObjectOwned>;

            #[method(name = "getCurrentBadBlocks")]
            async fn get_current_bad_blocks(&self) -> Result<Vec<BadBlock>, ErrorObjectOwned>;

            /// Beacon shard only.
            #[method(name = "getStakingNetworkInfo")]
            async fn get_staking_network_info(
                &self,
            ) -> Result<StakingNetworkInfo, ErrorObjectOwned>;

            #[method(name = "getTotalSupply")]
            async fn get_total_supply(&self) -> Result<FixedDecimal, ErrorObjectOwned>;

            #[method(name = "getCirculatingSupply")]
            async fn get_circulating_supply(&self) -> Result<FixedDecimal, ErrorObjectOwned>;

            #[method(name = "inSync")]
            async fn in_sync(&self) -> Result<bool, ErrorObjectOwned>;

            #[method(name = "beaconInSync")]
            async fn beacon_in_sync(&self) -> Result<bool, ErrorObjectOwned>;

            #[method(name = "setNodeToBackupMode")]
            async fn set_node_to_backup_mode(&self, backup: bool)
                -> Result<bool, ErrorObjectOwned>;
        }
    };
}

blockchain_api!(
    /// First-generation API: hex quantities, bech32 addresses, boolean `fullTx`.
    LegacyBlockchainApi,
    "chain"
);

blockchain_api!(
    /// Structured API: plain integers, options object.
    V2BlockchainApi,
    "chainv2"
);

blockchain_api!(
    /// Ethereum-compatible block queries for standard wallets and tooling.
    EthBlockchainApi,
    "eth"
);
