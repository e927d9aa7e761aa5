//! Rendered block shapes.
#![cfg_attr(test, allow(clippy::indexing_slicing))]

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, B64, U256, U64};
use serde::Serialize;

use crate::quantity::Quantity;
use crate::transaction::{EthTransaction, NativeTransaction, StakingTransactions};

/// A block rendered by one of the block factories.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RenderedBlock {
    /// Legacy or structured API shape.
    Native(Box<NativeBlock>),
    /// Ethereum JSON-RPC shape.
    Eth(Box<EthBlock>),
}

impl RenderedBlock {
    /// Block hash, regardless of shape.
    pub fn hash(&self) -> B256 {
        match self {
            RenderedBlock::Native(b) => b.hash,
            RenderedBlock::Eth(b) => b.hash,
        }
    }

    /// Block height, regardless of shape.
    pub fn number(&self) -> u64 {
        match self {
            RenderedBlock::Native(b) => b.number.as_u64(),
            RenderedBlock::Eth(b) => b.number.to::<u64>(),
        }
    }
}

/// Plain transactions of a block - hashes or full objects.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NativeTransactions {
    Hashes(Vec<B256>),
    Full(Vec<NativeTransaction>),
}

/// Staking transactions of a block - hashes or the cached full list.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NativeStakingTransactions {
    Hashes(Vec<B256>),
    Full(Arc<StakingTransactions>),
}

/// Block as rendered by the legacy (hex quantities) and structured (plain
/// integers) APIs. Both share this field set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeBlock {
    pub number: Quantity,
    pub hash: B256,
    pub parent_hash: B256,
    /// Block leader, bech32.
    pub miner: String,
    pub epoch: Quantity,
    #[serde(rename = "shardID")]
    pub shard_id: u32,
    #[serde(rename = "viewID")]
    pub view_id: Quantity,
    pub logs_bloom: Bytes,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub extra_data: Bytes,
    pub size: Quantity,
    pub gas_limit: Quantity,
    pub gas_used: Quantity,
    pub timestamp: Quantity,
    pub uncles: Vec<B256>,
    pub transactions: NativeTransactions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staking_transactions: Option<NativeStakingTransactions>,
    /// Bech32 addresses of the committee members that signed the block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signers: Option<Vec<String>>,
}

/// Ethereum transactions of a block - hashes or full objects.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EthTransactions {
    Hashes(Vec<B256>),
    Full(Vec<EthTransaction>),
}

/// Block in the Ethereum JSON-RPC shape.
///
/// PoW artifacts (`nonce`, `difficulty`, uncles) are fixed values so standard
/// tooling can parse the response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EthBlock {
    pub number: U64,
    pub hash: B256,
    pub parent_hash: B256,
    pub nonce: B64,
    pub sha3_uncles: B256,
    pub logs_bloom: Bytes,
    pub transactions_root: B256,
    pub state_root: B256,
    pub receipts_root: B256,
    pub miner: Address,
    pub difficulty: U256,
    pub total_difficulty: U256,
    pub extra_data: Bytes,
    pub size: U64,
    pub gas_limit: U64,
    pub gas_used: U64,
    pub timestamp: U64,
    pub transactions: EthTransactions,
    pub uncles: Vec<B256>,
}

impl EthBlock {
    /// Empty uncles hash (keccak256 of RLP empty list).
    pub fn empty_uncles_hash() -> B256 {
        // keccak256(rlp([])) = 0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347
        B256::from_slice(&[
            0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a, 0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc,
            0xd4, 0x1a, 0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13, 0xf0, 0xa1, 0x42, 0xfd,
            0x40, 0xd4, 0x93, 0x47,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn native_block(number: Quantity) -> NativeBlock {
        NativeBlock {
            number,
            hash: B256::repeat_byte(0x11),
            parent_hash: B256::ZERO,
            miner: "one1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq".to_string(),
            epoch: number,
            shard_id: 0,
            view_id: number,
            logs_bloom: Bytes::new(),
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            extra_data: Bytes::new(),
            size: number,
            gas_limit: number,
            gas_used: number,
            timestamp: number,
            uncles: vec![],
            transactions: NativeTransactions::Hashes(vec![]),
            staking_transactions: None,
            signers: None,
        }
    }

    #[test]
    fn test_native_block_field_names() {
        let value: Value = serde_json::to_value(native_block(Quantity::hex(26))).unwrap();
        assert_eq!(value["number"], "0x1a");
        assert_eq!(value["viewID"], "0x1a");
        assert_eq!(value["shardID"], 0);
        assert_eq!(value["transactions"], json!([]));
        assert!(value.get("stakingTransactions").is_none());
        assert!(value.get("signers").is_none());
    }

    #[test]
    fn test_native_block_plain_numbers() {
        let block = RenderedBlock::Native(Box::new(native_block(Quantity::plain(26))));
        let value: Value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["number"], 26);
        assert_eq!(block.number(), 26);
    }
}
