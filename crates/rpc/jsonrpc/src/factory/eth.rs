//! Ethereum JSON-RPC shape for wallets and standard tooling.
//!
//! Staking data and signer sets have no place in this shape; requesting them
//! is an error rather than a silent omission. A block that does not exist yet
//! is reported as `null` so pollers can retry.

use alloy_primitives::{B64, U256, U64};
use chainview_chain::{AddressCodec, Block, Transaction};
use chainview_rpc_types::{
    Amount, ApiVersion, BlockOptions, EthBlock, EthTransaction, EthTransactions,
    HeaderInformation, Quantity, RenderOptions, RenderedBlock, StakingTransactions,
};

use super::{BlockData, BlockFactory};
use crate::error::{RpcError, RpcResult};

pub struct EthFactory {
    codec: AddressCodec,
}

impl EthFactory {
    pub fn new(codec: AddressCodec) -> Self {
        Self { codec }
    }

    fn transaction(block: &Block, index: usize, tx: &Transaction) -> EthTransaction {
        EthTransaction {
            hash: tx.hash,
            nonce: U64::from(tx.nonce),
            block_hash: block.hash(),
            block_number: U64::from(block.number()),
            transaction_index: U64::from(index as u64),
            from: tx.from,
            to: tx.to,
            value: tx.value,
            gas: U64::from(tx.gas),
            gas_price: tx.gas_price,
            input: tx.input.clone(),
        }
    }
}

impl BlockFactory for EthFactory {
    fn version(&self) -> ApiVersion {
        ApiVersion::EthCompatible
    }

    fn codec(&self) -> &AddressCodec {
        &self.codec
    }

    fn parse_options(&self, options: Option<BlockOptions>) -> RpcResult<RenderOptions> {
        match options {
            None => Ok(RenderOptions::default()),
            Some(BlockOptions::FullTx(full)) => Ok(RenderOptions {
                include_full_transactions: full,
                ..RenderOptions::default()
            }),
            Some(BlockOptions::Args(args)) if args.incl_staking => Err(
                RpcError::UnsupportedForVersion("staking transaction data".to_string()),
            ),
            Some(BlockOptions::Args(args)) if args.with_signers => Err(
                RpcError::UnsupportedForVersion("block signers".to_string()),
            ),
            Some(BlockOptions::Args(args)) => Ok(args.into()),
        }
    }

    fn new_block(
        &self,
        block: &Block,
        data: &BlockData,
        options: &RenderOptions,
    ) -> RpcResult<RenderedBlock> {
        let header = &block.header;
        let transactions = if options.include_full_transactions {
            EthTransactions::Full(
                block
                    .transactions
                    .iter()
                    .enumerate()
                    .map(|(index, tx)| Self::transaction(block, index, tx))
                    .collect(),
            )
        } else {
            EthTransactions::Hashes(block.transactions.iter().map(|tx| tx.hash).collect())
        };

        Ok(RenderedBlock::Eth(Box::new(EthBlock {
            number: U64::from(header.number),
            hash: header.hash,
            parent_hash: header.parent_hash,
            nonce: B64::ZERO,
            sha3_uncles: EthBlock::empty_uncles_hash(),
            logs_bloom: header.logs_bloom.clone(),
            transactions_root: header.transactions_root,
            state_root: header.state_root,
            receipts_root: header.receipts_root,
            miner: data.leader,
            difficulty: U256::ZERO,
            total_difficulty: U256::ZERO,
            extra_data: header.extra_data.clone(),
            size: U64::from(header.size),
            gas_limit: U64::from(header.gas_limit),
            gas_used: U64::from(header.gas_used),
            timestamp: U64::from(header.timestamp),
            transactions,
            uncles: Vec::new(),
        })))
    }

    fn staking_transactions(&self, _block: &Block) -> RpcResult<StakingTransactions> {
        Err(RpcError::UnsupportedForVersion(
            "staking transaction data".to_string(),
        ))
    }

    fn quantity(&self, value: u64) -> Quantity {
        Quantity::hex(value)
    }

    fn amount(&self, value: U256) -> Amount {
        Amount::Hex(value)
    }

    fn chain_id(&self, _chain_id: u64, eth_chain_id: u64) -> Quantity {
        Quantity::hex(eth_chain_id)
    }

    fn missing_block(&self, _number: u64) -> RpcResult<Option<RenderedBlock>> {
        Ok(None)
    }

    fn missing_header(&self, _number: u64) -> RpcResult<Option<HeaderInformation>> {
        Ok(None)
    }
}
