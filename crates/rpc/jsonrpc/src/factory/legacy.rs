//! First-generation API: hex quantities, bech32 addresses, boolean `fullTx` option.

use alloy_primitives::U256;
use chainview_chain::{AddressCodec, Block};
use chainview_rpc_types::{
    Amount, ApiVersion, BlockOptions, HeaderInformation, Quantity, RenderOptions, RenderedBlock,
    StakingTransactions,
};

use super::native::{Encoding, NativeRenderer};
use super::{BlockData, BlockFactory};
use crate::error::{RpcError, RpcResult};

pub struct LegacyV1Factory {
    native: NativeRenderer,
}

impl LegacyV1Factory {
    pub fn new(codec: AddressCodec) -> Self {
        Self {
            native: NativeRenderer::new(codec, Encoding::Hex),
        }
    }
}

impl BlockFactory for LegacyV1Factory {
    fn version(&self) -> ApiVersion {
        ApiVersion::LegacyV1
    }

    fn codec(&self) -> &AddressCodec {
        &self.native.codec
    }

    fn parse_options(&self, options: Option<BlockOptions>) -> RpcResult<RenderOptions> {
        Ok(match options {
            None => RenderOptions {
                include_staking_transactions: true,
                ..RenderOptions::default()
            },
            Some(BlockOptions::FullTx(full)) => RenderOptions {
                include_full_transactions: full,
                include_signers: false,
                include_staking_transactions: true,
            },
            Some(BlockOptions::Args(args)) => args.into(),
        })
    }

    fn new_block(
        &self,
        block: &Block,
        data: &BlockData,
        options: &RenderOptions,
    ) -> RpcResult<RenderedBlock> {
        Ok(RenderedBlock::Native(Box::new(
            self.native.block(block, data, options)?,
        )))
    }

    fn staking_transactions(&self, block: &Block) -> RpcResult<StakingTransactions> {
        self.native.staking_transactions(block)
    }

    fn quantity(&self, value: u64) -> Quantity {
        self.native.quantity(value)
    }

    fn amount(&self, value: U256) -> Amount {
        self.native.amount(value)
    }

    fn missing_block(&self, _number: u64) -> RpcResult<Option<RenderedBlock>> {
        Err(RpcError::BlockTooHigh)
    }

    fn missing_header(&self, _number: u64) -> RpcResult<Option<HeaderInformation>> {
        Err(RpcError::BlockTooHigh)
    }
}
