//! Structured API: plain integers and an options object.

use alloy_primitives::U256;
use chainview_chain::{AddressCodec, Block};
use chainview_rpc_types::{
    Amount, ApiVersion, BlockOptions, HeaderInformation, Quantity, RenderOptions, RenderedBlock,
    StakingTransactions,
};

use super::native::{Encoding, NativeRenderer};
use super::{BlockData, BlockFactory};
use crate::error::{RpcError, RpcResult};

pub struct V2Factory {
    native: NativeRenderer,
}

impl V2Factory {
    pub fn new(codec: AddressCodec) -> Self {
        Self {
            native: NativeRenderer::new(codec, Encoding::Plain),
        }
    }
}

impl BlockFactory for V2Factory {
    fn version(&self) -> ApiVersion {
        ApiVersion::V2
    }

    fn codec(&self) -> &AddressCodec {
        &self.native.codec
    }

    fn parse_options(&self, options: Option<BlockOptions>) -> RpcResult<RenderOptions> {
        match options {
            None => Ok(RenderOptions::default()),
            Some(BlockOptions::Args(args)) => Ok(args.into()),
            Some(BlockOptions::FullTx(_)) => Err(RpcError::RequestFormat(
                "block options must be an object".to_string(),
            )),
        }
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
