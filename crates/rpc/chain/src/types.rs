//! Chain data as handed out by the backend.
//!
//! These are read-only snapshots of finalized chain state. Rendering them into
//! wire shapes is done by the block factories.

use alloy_primitives::{Address, Bytes, FixedBytes, B256, U256};

/// Serialized BLS public key.
pub type BlsPublicKey = FixedBytes<48>;

/// Block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    /// Proposer address as recorded in the header.
    pub coinbase: Address,
    pub epoch: u64,
    pub shard_id: u32,
    pub view_id: u64,
    /// Unix seconds.
    pub timestamp: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bytes,
    pub extra_data: Bytes,
    /// Encoded block size in bytes.
    pub size: u64,
}

/// Plain (value-transfer or contract) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub hash: B256,
    pub nonce: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub gas: u64,
    pub gas_price: U256,
    pub input: Bytes,
    pub shard_id: u32,
    pub to_shard_id: u32,
}

/// Kind of a staking transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StakingDirective {
    CreateValidator,
    EditValidator,
    Delegate,
    Undelegate,
    CollectRewards,
}

impl StakingDirective {
    pub fn name(&self) -> &'static str {
        match self {
            StakingDirective::CreateValidator => "CreateValidator",
            StakingDirective::EditValidator => "EditValidator",
            StakingDirective::Delegate => "Delegate",
            StakingDirective::Undelegate => "Undelegate",
            StakingDirective::CollectRewards => "CollectRewards",
        }
    }
}

/// Staking transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingTransaction {
    pub hash: B256,
    pub nonce: u64,
    pub from: Address,
    pub gas: u64,
    pub gas_price: U256,
    pub directive: StakingDirective,
    pub validator: Option<Address>,
    pub delegator: Option<Address>,
    pub amount: Option<U256>,
}

/// A finalized block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
    pub staking_transactions: Vec<StakingTransaction>,
}

impl Block {
    pub fn number(&self) -> u64 {
        self.header.number
    }

    pub fn hash(&self) -> B256 {
        self.header.hash
    }

    pub fn epoch(&self) -> u64 {
        self.header.epoch
    }

    pub fn coinbase(&self) -> Address {
        self.header.coinbase
    }
}

/// One committee seat: a validator identity eligible to sign in an epoch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub address: Address,
    pub bls_public_key: BlsPublicKey,
}

/// Committee of one shard in one epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardCommittee {
    pub shard_id: u32,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochCommittees {
    pub epoch: u64,
    pub shards: Vec<ShardCommittee>,
}

/// Committees of the previous and the current epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperCommittees {
    pub previous: EpochCommittees,
    pub current: EpochCommittees,
}

/// Head headers of the beacon chain and of the served shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHeads {
    pub beacon: Header,
    pub shard: Header,
}

/// Validator staking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidatorRecord {
    /// Monotonic count of blocks this validator has signed.
    pub blocks_signed: u64,
}

/// Sync state of one shard chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStatus {
    pub in_sync: bool,
    pub remote_height: u64,
    pub blocks_behind: u64,
}
