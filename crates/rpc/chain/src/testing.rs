//! In-memory [`ChainBackend`] for tests.
//!
//! `MockChain::new(head)` builds blocks `0..=head`. Every epoch shares a
//! committee of [`COMMITTEE_SIZE`] slots; block `n` is proposed by slot
//! `n % COMMITTEE_SIZE`, and that same slot is the one missing from the
//! block's signature mask. Each block carries one plain and one staking
//! transaction.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use chainview_rpc_types::{BadBlock, CrossLink, FixedDecimal, ShardInfo, UtilityMetrics};
use parking_lot::RwLock;

use crate::backend::ChainBackend;
use crate::error::{ChainError, ChainResult};
use crate::mask::SignatureMask;
use crate::types::{
    Block, BlsPublicKey, ChainHeads, EpochCommittees, Header, ShardCommittee, Slot,
    StakingDirective, StakingTransaction, SuperCommittees, SyncStatus, Transaction,
    ValidatorRecord,
};

pub const COMMITTEE_SIZE: usize = 4;
pub const DEFAULT_BLOCKS_PER_EPOCH: u64 = 16;

/// Committee slot `i` of the mock roster.
pub fn committee_slot(i: usize) -> Slot {
    let tag = 0x10 + i as u8;
    Slot {
        address: Address::with_last_byte(tag),
        bls_public_key: BlsPublicKey::repeat_byte(tag),
    }
}

pub fn committee() -> Vec<Slot> {
    (0..COMMITTEE_SIZE).map(committee_slot).collect()
}

fn block_hash(number: u64) -> B256 {
    B256::left_padding_from(&(number + 1).to_be_bytes())
}

fn make_block(number: u64, blocks_per_epoch: u64) -> Block {
    let proposer = committee_slot((number % COMMITTEE_SIZE as u64) as usize).address;
    let header = Header {
        number,
        hash: block_hash(number),
        parent_hash: if number == 0 {
            B256::ZERO
        } else {
            block_hash(number - 1)
        },
        coinbase: proposer,
        epoch: number / blocks_per_epoch,
        shard_id: 0,
        view_id: number,
        timestamp: 1_600_000_000 + 2 * number,
        gas_limit: 80_000_000,
        gas_used: 21_000,
        state_root: B256::repeat_byte(0xaa),
        transactions_root: B256::repeat_byte(0xbb),
        receipts_root: B256::repeat_byte(0xcc),
        logs_bloom: Bytes::from(vec![0u8; 256]),
        extra_data: Bytes::new(),
        size: 512,
    };
    let transactions = vec![Transaction {
        hash: B256::left_padding_from(&[0x01, number as u8]),
        nonce: number,
        from: proposer,
        to: Some(Address::repeat_byte(0x99)),
        value: U256::from(1_000u64),
        gas: 21_000,
        gas_price: U256::from(1_000_000_000u64),
        input: Bytes::new(),
        shard_id: 0,
        to_shard_id: 0,
    }];
    let staking_transactions = vec![StakingTransaction {
        hash: B256::left_padding_from(&[0x02, number as u8]),
        nonce: number,
        from: proposer,
        gas: 25_000,
        gas_price: U256::from(1_000_000_000u64),
        directive: StakingDirective::Delegate,
        validator: Some(committee_slot(0).address),
        delegator: Some(proposer),
        amount: Some(U256::from(100u64)),
    }];
    Block {
        header,
        transactions,
        staking_transactions,
    }
}

fn default_mask(number: u64) -> SignatureMask {
    let missing = (number % COMMITTEE_SIZE as u64) as usize;
    let enabled: Vec<usize> = (0..COMMITTEE_SIZE).filter(|&i| i != missing).collect();
    let publics = committee().into_iter().map(|s| s.bls_public_key).collect();
    SignatureMask::with_enabled(publics, &enabled)
}

struct MockState {
    blocks: Vec<Arc<Block>>,
    blocks_per_epoch: u64,
    staking_epoch: u64,
    masks: HashMap<u64, SignatureMask>,
    failing_masks: HashSet<u64>,
    records: HashMap<Address, ValidatorRecord>,
    snapshots: HashMap<Address, ValidatorRecord>,
    balances: HashMap<Address, U256>,
    bad_blocks: Vec<BadBlock>,
    shard_id: u32,
    beacon_shard_id: u32,
    in_sync: bool,
    backup: bool,
}

/// Deterministic in-memory chain.
pub struct MockChain {
    state: RwLock<MockState>,
    mask_calls: AtomicUsize,
    leader_calls: AtomicUsize,
}

impl MockChain {
    pub fn new(head: u64) -> Self {
        Self::with_epoch_length(head, DEFAULT_BLOCKS_PER_EPOCH)
    }

    pub fn with_epoch_length(head: u64, blocks_per_epoch: u64) -> Self {
        let blocks = (0..=head)
            .map(|n| Arc::new(make_block(n, blocks_per_epoch)))
            .collect();
        Self {
            state: RwLock::new(MockState {
                blocks,
                blocks_per_epoch,
                staking_epoch: 0,
                masks: HashMap::new(),
                failing_masks: HashSet::new(),
                records: HashMap::new(),
                snapshots: HashMap::new(),
                balances: HashMap::new(),
                bad_blocks: Vec::new(),
                shard_id: 0,
                beacon_shard_id: 0,
                in_sync: true,
                backup: false,
            }),
            mask_calls: AtomicUsize::new(0),
            leader_calls: AtomicUsize::new(0),
        }
    }

    pub fn head(&self) -> u64 {
        self.state.read().blocks.len() as u64 - 1
    }

    /// Append `count` blocks.
    pub fn advance(&self, count: u64) {
        let mut state = self.state.write();
        let bpe = state.blocks_per_epoch;
        for _ in 0..count {
            let next = state.blocks.len() as u64;
            state.blocks.push(Arc::new(make_block(next, bpe)));
        }
    }

    pub fn block(&self, number: u64) -> Option<Arc<Block>> {
        self.state.read().blocks.get(number as usize).cloned()
    }

    /// First epoch with staking rules.
    pub fn set_staking_epoch(&self, epoch: u64) {
        self.state.write().staking_epoch = epoch;
    }

    /// Override which roster slots signed block `number`.
    pub fn set_signers(&self, number: u64, enabled: &[usize]) {
        let publics = committee().into_iter().map(|s| s.bls_public_key).collect();
        self.set_mask(number, SignatureMask::with_enabled(publics, enabled));
    }

    pub fn set_mask(&self, number: u64, mask: SignatureMask) {
        self.state.write().masks.insert(number, mask);
    }

    /// Make mask lookups for `number` fail until [`heal_mask`](Self::heal_mask).
    pub fn fail_mask(&self, number: u64) {
        self.state.write().failing_masks.insert(number);
    }

    pub fn heal_mask(&self, number: u64) {
        self.state.write().failing_masks.remove(&number);
    }

    pub fn set_record(&self, address: Address, current: u64, prior_epoch: u64) {
        let mut state = self.state.write();
        state.records.insert(
            address,
            ValidatorRecord {
                blocks_signed: current,
            },
        );
        state.snapshots.insert(
            address,
            ValidatorRecord {
                blocks_signed: prior_epoch,
            },
        );
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.write().balances.insert(address, balance);
    }

    /// Serve `shard_id` while the beacon chain stays on shard 0.
    pub fn set_shard(&self, shard_id: u32) {
        self.state.write().shard_id = shard_id;
    }

    /// Record a rejected block at height `number`.
    pub fn reject_block(&self, number: u64, reason: &str) {
        self.state.write().bad_blocks.push(BadBlock {
            hash: B256::repeat_byte(0xbd),
            number,
            parent_hash: block_hash(number.saturating_sub(1)),
            reason: reason.to_string(),
        });
    }

    pub fn set_in_sync(&self, in_sync: bool) {
        self.state.write().in_sync = in_sync;
    }

    /// Number of signature-mask lookups served so far.
    pub fn mask_calls(&self) -> usize {
        self.mask_calls.load(Ordering::SeqCst)
    }

    /// Number of leader lookups served so far.
    pub fn leader_calls(&self) -> usize {
        self.leader_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainBackend for MockChain {
    async fn current_header(&self) -> ChainResult<Header> {
        let state = self.state.read();
        state
            .blocks
            .last()
            .map(|b| b.header.clone())
            .ok_or_else(|| ChainError::Backend("empty chain".into()))
    }

    async fn header_by_number(&self, number: u64) -> ChainResult<Option<Header>> {
        Ok(self.block(number).map(|b| b.header.clone()))
    }

    async fn header_rlp(&self, number: u64) -> ChainResult<Option<Bytes>> {
        // Stand-in encoding: list prefix followed by the header hash.
        Ok(self.block(number).map(|b| {
            let mut encoded = vec![0xe1, 0xa0];
            encoded.extend_from_slice(b.hash().as_slice());
            Bytes::from(encoded)
        }))
    }

    async fn latest_chain_headers(&self) -> ChainResult<ChainHeads> {
        let shard = self.current_header().await?;
        let mut beacon = shard.clone();
        beacon.shard_id = self.state.read().beacon_shard_id;
        Ok(ChainHeads { beacon, shard })
    }

    async fn block_by_number(&self, number: u64) -> ChainResult<Option<Arc<Block>>> {
        Ok(self.block(number))
    }

    async fn block_by_hash(&self, hash: B256) -> ChainResult<Option<Arc<Block>>> {
        Ok(self
            .state
            .read()
            .blocks
            .iter()
            .find(|b| b.hash() == hash)
            .cloned())
    }

    async fn committee_roster_for_epoch(&self, _epoch: u64) -> ChainResult<Vec<Slot>> {
        Ok(committee())
    }

    async fn signature_mask_for_block(&self, number: u64) -> ChainResult<SignatureMask> {
        self.mask_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read();
        if state.failing_masks.contains(&number) {
            return Err(ChainError::MaskNotFound(number));
        }
        Ok(state
            .masks
            .get(&number)
            .cloned()
            .unwrap_or_else(|| default_mask(number)))
    }

    async fn leader_address(&self, coinbase: Address, _epoch: u64) -> ChainResult<Address> {
        self.leader_calls.fetch_add(1, Ordering::SeqCst);
        Ok(coinbase)
    }

    async fn validator_record(&self, address: Address) -> ChainResult<ValidatorRecord> {
        self.state
            .read()
            .records
            .get(&address)
            .copied()
            .ok_or_else(|| ChainError::ValidatorNotFound(address.to_string()))
    }

    async fn validator_snapshot_prior_epoch(
        &self,
        address: Address,
    ) -> ChainResult<ValidatorRecord> {
        self.state
            .read()
            .snapshots
            .get(&address)
            .copied()
            .ok_or_else(|| ChainError::ValidatorNotFound(address.to_string()))
    }

    fn is_staking_epoch(&self, epoch: u64) -> bool {
        epoch >= self.state.read().staking_epoch
    }

    fn blocks_per_epoch(&self, _epoch: u64) -> u64 {
        self.state.read().blocks_per_epoch
    }

    fn epoch_last_block(&self, epoch: u64) -> u64 {
        (epoch + 1) * self.state.read().blocks_per_epoch - 1
    }

    fn is_last_block(&self, number: u64) -> bool {
        (number + 1) % self.state.read().blocks_per_epoch == 0
    }

    fn shard_id(&self) -> u32 {
        self.state.read().shard_id
    }

    fn beacon_shard_id(&self) -> u32 {
        self.state.read().beacon_shard_id
    }

    async fn sharding_structure(&self) -> ChainResult<Vec<ShardInfo>> {
        let current = self.state.read().shard_id;
        Ok((0..2)
            .map(|id| ShardInfo {
                current: id == current,
                shard_id: id,
                http: format!("https://api.s{id}.example.net"),
                ws: format!("wss://ws.s{id}.example.net"),
            })
            .collect())
    }

    async fn balance_at(&self, address: Address, _number: u64) -> ChainResult<U256> {
        Ok(self
            .state
            .read()
            .balances
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn total_staking_snapshot(&self) -> ChainResult<FixedDecimal> {
        Ok(FixedDecimal::from_units(5_000_000))
    }

    async fn median_stake_snapshot(&self) -> ChainResult<FixedDecimal> {
        Ok(FixedDecimal::from_units(1_000_000))
    }

    async fn total_supply(&self) -> ChainResult<FixedDecimal> {
        Ok(FixedDecimal::from_units(12_600_000_000))
    }

    async fn circulating_supply(&self) -> ChainResult<FixedDecimal> {
        Ok(FixedDecimal::from_units(10_000_000_000))
    }

    async fn utility_metrics(&self) -> ChainResult<UtilityMetrics> {
        Ok(UtilityMetrics {
            accumulator_snapshot: FixedDecimal::from_units(1),
            current_staked_percentage: FixedDecimal::from_units(0),
            deviation: FixedDecimal::from_units(0),
            adjustment: FixedDecimal::from_units(0),
        })
    }

    async fn last_cross_links(&self) -> ChainResult<Vec<CrossLink>> {
        let head = self.current_header().await?;
        Ok((1..3)
            .map(|shard_id| CrossLink {
                hash: head.hash,
                block_number: head.number,
                view_id: head.view_id,
                signature: Bytes::from(vec![0x5a; 96]),
                signature_bitmap: Bytes::from(vec![0x0f]),
                shard_id,
                epoch_number: head.epoch,
            })
            .collect())
    }

    async fn super_committees(&self) -> ChainResult<SuperCommittees> {
        let epoch = self.current_header().await?.epoch;
        let committees = |epoch| EpochCommittees {
            epoch,
            shards: vec![ShardCommittee {
                shard_id: 0,
                slots: committee(),
            }],
        };
        Ok(SuperCommittees {
            previous: committees(epoch.saturating_sub(1)),
            current: committees(epoch),
        })
    }

    fn bad_blocks(&self) -> Vec<BadBlock> {
        self.state.read().bad_blocks.clone()
    }

    fn sync_status(&self, shard_id: u32) -> SyncStatus {
        let state = self.state.read();
        let in_sync = shard_id != state.shard_id || state.in_sync;
        SyncStatus {
            in_sync,
            remote_height: state.blocks.len() as u64 - 1,
            blocks_behind: 0,
        }
    }

    fn set_backup_mode(&self, backup: bool) -> bool {
        self.state.write().backup = backup;
        backup
    }
}
