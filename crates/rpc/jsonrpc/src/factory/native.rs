//! Native block shape shared by the legacy and structured versions.
//!
//! Both versions render the same fields with bech32 addresses; they differ
//! only in how integers are written.

use alloy_primitives::U256;
use chainview_chain::{AddressCodec, Block, StakingTransaction, Transaction};
use chainview_rpc_types::{
    Amount, NativeBlock, NativeStakingTransaction, NativeStakingTransactions, NativeTransaction,
    NativeTransactions, Quantity, RenderOptions, StakingMessage, StakingTransactions,
};

use super::BlockData;
use crate::error::RpcResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Encoding {
    Hex,
    Plain,
}

pub(super) struct NativeRenderer {
    pub(super) codec: AddressCodec,
    encoding: Encoding,
}

impl NativeRenderer {
    pub(super) fn new(codec: AddressCodec, encoding: Encoding) -> Self {
        Self { codec, encoding }
    }

    pub(super) fn quantity(&self, value: u64) -> Quantity {
        match self.encoding {
            Encoding::Hex => Quantity::hex(value),
            Encoding::Plain => Quantity::plain(value),
        }
    }

    pub(super) fn amount(&self, value: U256) -> Amount {
        match self.encoding {
            Encoding::Hex => Amount::Hex(value),
            Encoding::Plain => Amount::Plain(value),
        }
    }

    pub(super) fn block(
        &self,
        block: &Block,
        data: &BlockData,
        options: &RenderOptions,
    ) -> RpcResult<NativeBlock> {
        let header = &block.header;

        let transactions = if options.include_full_transactions {
            NativeTransactions::Full(
                block
                    .transactions
                    .iter()
                    .enumerate()
                    .map(|(index, tx)| self.transaction(block, index, tx))
                    .collect::<RpcResult<_>>()?,
            )
        } else {
            NativeTransactions::Hashes(block.transactions.iter().map(|tx| tx.hash).collect())
        };

        let staking_transactions = options.include_staking_transactions.then(|| {
            match (&data.staking_transactions, options.include_full_transactions) {
                (Some(list), true) => NativeStakingTransactions::Full(list.clone()),
                _ => NativeStakingTransactions::Hashes(
                    block.staking_transactions.iter().map(|tx| tx.hash).collect(),
                ),
            }
        });

        let signers = options.include_signers.then(|| {
            data.signers
                .as_ref()
                .map(|s| s.signer_addresses.clone())
                .unwrap_or_default()
        });

        Ok(NativeBlock {
            number: self.quantity(header.number),
            hash: header.hash,
            parent_hash: header.parent_hash,
            miner: self.codec.encode(&data.leader)?,
            epoch: self.quantity(header.epoch),
            shard_id: header.shard_id,
            view_id: self.quantity(header.view_id),
            logs_bloom: header.logs_bloom.clone(),
            state_root: header.state_root,
            transactions_root: header.transactions_root,
            receipts_root: header.receipts_root,
            extra_data: header.extra_data.clone(),
            size: self.quantity(header.size),
            gas_limit: self.quantity(header.gas_limit),
            gas_used: self.quantity(header.gas_used),
            timestamp: self.quantity(header.timestamp),
            uncles: Vec::new(),
            transactions,
            staking_transactions,
            signers,
        })
    }

    fn transaction(
        &self,
        block: &Block,
        index: usize,
        tx: &Transaction,
    ) -> RpcResult<NativeTransaction> {
        let to = tx.to.as_ref().map(|to| self.codec.encode(to)).transpose()?;
        Ok(NativeTransaction {
            hash: tx.hash,
            block_hash: block.hash(),
            block_number: self.quantity(block.number()),
            transaction_index: self.quantity(index as u64),
            from: self.codec.encode(&tx.from)?,
            to,
            value: self.amount(tx.value),
            gas: self.quantity(tx.gas),
            gas_price: self.amount(tx.gas_price),
            nonce: self.quantity(tx.nonce),
            input: tx.input.clone(),
            shard_id: tx.shard_id,
            to_shard_id: tx.to_shard_id,
            timestamp: self.quantity(block.header.timestamp),
        })
    }

    pub(super) fn staking_transactions(&self, block: &Block) -> RpcResult<StakingTransactions> {
        block
            .staking_transactions
            .iter()
            .enumerate()
            .map(|(index, tx)| self.staking_transaction(block, index, tx))
            .collect()
    }

    fn staking_transaction(
        &self,
        block: &Block,
        index: usize,
        tx: &StakingTransaction,
    ) -> RpcResult<NativeStakingTransaction> {
        let encode_opt = |addr: &Option<alloy_primitives::Address>| {
            addr.as_ref().map(|a| self.codec.encode(a)).transpose()
        };
        Ok(NativeStakingTransaction {
            hash: tx.hash,
            block_hash: block.hash(),
            block_number: self.quantity(block.number()),
            transaction_index: self.quantity(index as u64),
            from: self.codec.encode(&tx.from)?,
            gas: self.quantity(tx.gas),
            gas_price: self.amount(tx.gas_price),
            nonce: self.quantity(tx.nonce),
            timestamp: self.quantity(block.header.timestamp),
            kind: tx.directive.name().to_string(),
            msg: StakingMessage {
                validator_address: encode_opt(&tx.validator)?,
                delegator_address: encode_opt(&tx.delegator)?,
                amount: tx.amount.map(|a| self.amount(a)),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chainview_chain::testing::MockChain;
    use chainview_chain::SignerData;
    use serde_json::json;

    fn renderer(encoding: Encoding) -> NativeRenderer {
        NativeRenderer::new(AddressCodec::default(), encoding)
    }

    #[test]
    fn test_full_block_with_staking_and_signers() {
        let chain = MockChain::new(4);
        let block = chain.block(3).unwrap();
        let r = renderer(Encoding::Plain);
        let staking = Arc::new(r.staking_transactions(&block).unwrap());
        let signers = Arc::new(SignerData {
            signer_addresses: vec!["one1signer".into()],
            ..SignerData::default()
        });
        let data = BlockData {
            leader: block.coinbase(),
            signers: Some(signers),
            staking_transactions: Some(staking),
        };
        let options = RenderOptions {
            include_full_transactions: true,
            include_signers: true,
            include_staking_transactions: true,
        };

        let rendered = serde_json::to_value(r.block(&block, &data, &options).unwrap()).unwrap();

        assert_eq!(rendered["signers"], json!(["one1signer"]));
        assert_eq!(rendered["transactions"][0]["blockNumber"], 3);
        assert_eq!(rendered["stakingTransactions"][0]["type"], "Delegate");
        assert_eq!(rendered["stakingTransactions"][0]["msg"]["amount"], 100);
    }

    #[test]
    fn test_hashes_only() {
        let chain = MockChain::new(4);
        let block = chain.block(2).unwrap();
        let r = renderer(Encoding::Hex);
        let data = BlockData {
            leader: block.coinbase(),
            signers: None,
            staking_transactions: None,
        };
        let options = RenderOptions {
            include_staking_transactions: true,
            ..RenderOptions::default()
        };

        let rendered = serde_json::to_value(r.block(&block, &data, &options).unwrap()).unwrap();

        assert_eq!(
            rendered["transactions"],
            json!([block.transactions[0].hash])
        );
        assert_eq!(
            rendered["stakingTransactions"],
            json!([block.staking_transactions[0].hash])
        );
        assert!(rendered.get("signers").is_none());
        assert_eq!(rendered["gasUsed"], "0x5208");
    }
}
