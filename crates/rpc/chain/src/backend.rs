//! Interface to the chain-state engine.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use chainview_rpc_types::{BadBlock, CrossLink, FixedDecimal, ShardInfo, UtilityMetrics};

use crate::error::ChainResult;
use crate::mask::SignatureMask;
use crate::types::{
    Block, ChainHeads, Header, Slot, SuperCommittees, SyncStatus, ValidatorRecord,
};

/// Read access to chain state, committee schedule and economic figures.
///
/// Implementations wrap the node's block store, validator registry and
/// committee scheduler. Lookups that may legitimately miss return
/// `Ok(None)`; everything else reports failures as [`ChainError`].
///
/// [`ChainError`]: crate::error::ChainError
#[async_trait]
pub trait ChainBackend: Send + Sync + 'static {
    /// Header of the current chain head.
    async fn current_header(&self) -> ChainResult<Header>;

    async fn header_by_number(&self, number: u64) -> ChainResult<Option<Header>>;

    /// Encoded form of header `number` as stored by the chain.
    async fn header_rlp(&self, number: u64) -> ChainResult<Option<Bytes>>;

    /// Heads of the beacon chain and of this node's shard.
    async fn latest_chain_headers(&self) -> ChainResult<ChainHeads>;

    async fn block_by_number(&self, number: u64) -> ChainResult<Option<Arc<Block>>>;

    async fn block_by_hash(&self, hash: B256) -> ChainResult<Option<Arc<Block>>>;

    /// Committee roster of `epoch`, in slot order.
    async fn committee_roster_for_epoch(&self, epoch: u64) -> ChainResult<Vec<Slot>>;

    /// Signature mask recorded for block `number`.
    async fn signature_mask_for_block(&self, number: u64) -> ChainResult<SignatureMask>;

    /// Validator credited with proposing a block with the given coinbase.
    async fn leader_address(&self, coinbase: Address, epoch: u64) -> ChainResult<Address>;

    async fn validator_record(&self, address: Address) -> ChainResult<ValidatorRecord>;

    /// Validator record as of the end of the previous epoch.
    async fn validator_snapshot_prior_epoch(
        &self,
        address: Address,
    ) -> ChainResult<ValidatorRecord>;

    /// Whether staking rules are active in `epoch`.
    fn is_staking_epoch(&self, epoch: u64) -> bool;

    fn blocks_per_epoch(&self, epoch: u64) -> u64;

    fn epoch_last_block(&self, epoch: u64) -> u64;

    fn is_last_block(&self, number: u64) -> bool;

    fn shard_id(&self) -> u32;

    fn beacon_shard_id(&self) -> u32;

    async fn sharding_structure(&self) -> ChainResult<Vec<ShardInfo>>;

    async fn balance_at(&self, address: Address, number: u64) -> ChainResult<U256>;

    async fn total_staking_snapshot(&self) -> ChainResult<FixedDecimal>;

    async fn median_stake_snapshot(&self) -> ChainResult<FixedDecimal>;

    async fn total_supply(&self) -> ChainResult<FixedDecimal>;

    async fn circulating_supply(&self) -> ChainResult<FixedDecimal>;

    async fn utility_metrics(&self) -> ChainResult<UtilityMetrics>;

    /// Most recent cross link of every shard. Beacon chain only.
    async fn last_cross_links(&self) -> ChainResult<Vec<CrossLink>>;

    async fn super_committees(&self) -> ChainResult<SuperCommittees>;

    /// Blocks rejected since the node started.
    fn bad_blocks(&self) -> Vec<BadBlock>;

    fn sync_status(&self, shard_id: u32) -> SyncStatus;

    /// Switch the node in or out of backup mode. Returns the resulting mode.
    fn set_backup_mode(&self, backup: bool) -> bool;
}
