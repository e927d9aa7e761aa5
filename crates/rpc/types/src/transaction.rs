//! Rendered transaction shapes.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::Serialize;

use crate::quantity::{Amount, Quantity};

/// Plain transaction as rendered by the legacy and structured APIs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTransaction {
    pub hash: B256,
    pub block_hash: B256,
    pub block_number: Quantity,
    pub transaction_index: Quantity,
    /// Sender, bech32.
    pub from: String,
    /// Recipient, bech32 (absent for contract creation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub value: Amount,
    pub gas: Quantity,
    pub gas_price: Amount,
    pub nonce: Quantity,
    pub input: Bytes,
    #[serde(rename = "shardID")]
    pub shard_id: u32,
    #[serde(rename = "toShardID")]
    pub to_shard_id: u32,
    pub timestamp: Quantity,
}

/// Payload of a staking directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegator_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

/// Staking transaction as rendered by the legacy and structured APIs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeStakingTransaction {
    pub hash: B256,
    pub block_hash: B256,
    pub block_number: Quantity,
    pub transaction_index: Quantity,
    /// Sender, bech32.
    pub from: String,
    pub gas: Quantity,
    pub gas_price: Amount,
    pub nonce: Quantity,
    pub timestamp: Quantity,
    /// Directive name, e.g. `Delegate`.
    #[serde(rename = "type")]
    pub kind: String,
    pub msg: StakingMessage,
}

/// Full staking-transaction list of one block, in one API's shape.
///
/// This is the value stored in the staking-transaction cache.
pub type StakingTransactions = Vec<NativeStakingTransaction>;

/// Transaction in the Ethereum JSON-RPC shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EthTransaction {
    pub hash: B256,
    pub nonce: U64,
    pub block_hash: B256,
    pub block_number: U64,
    pub transaction_index: U64,
    pub from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub value: U256,
    pub gas: U64,
    pub gas_price: U256,
    pub input: Bytes,
}
