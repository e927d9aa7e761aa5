//! Version-specific response assembly.
//!
//! Every difference between the API versions lives behind [`BlockFactory`]:
//! option parsing, numeric encoding, block and transaction shapes, and how a
//! not-yet-produced block is reported. A [`QueryService`] picks one factory
//! at construction through [`factory_for`] and never looks at the version
//! again.
//!
//! [`QueryService`]: crate::service::QueryService

mod eth;
mod legacy;
mod native;
mod v2;

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use chainview_chain::{AddressCodec, Block, Header, SignerData};
use chainview_rpc_types::{
    format_utc, Amount, ApiVersion, BlockOptions, HeaderInformation, Quantity, RenderOptions,
    RenderedBlock, StakingTransactions,
};

use crate::error::{RpcError, RpcResult};

pub use eth::EthFactory;
pub use legacy::LegacyV1Factory;
pub use v2::V2Factory;

/// Derived data resolved by the service before rendering a block.
#[derive(Debug, Clone)]
pub struct BlockData {
    pub leader: Address,
    /// Present when signers were requested.
    pub signers: Option<Arc<SignerData>>,
    /// Present when full staking transactions were requested.
    pub staking_transactions: Option<Arc<StakingTransactions>>,
}

/// Renders chain data in one API version's wire shape.
pub trait BlockFactory: Send + Sync + 'static {
    fn version(&self) -> ApiVersion;

    fn codec(&self) -> &AddressCodec;

    /// Resolve the wire options payload into canonical render options.
    fn parse_options(&self, options: Option<BlockOptions>) -> RpcResult<RenderOptions>;

    fn new_block(
        &self,
        block: &Block,
        data: &BlockData,
        options: &RenderOptions,
    ) -> RpcResult<RenderedBlock>;

    /// Full staking-transaction list of `block`. This is the value kept in
    /// the staking-transaction cache.
    fn staking_transactions(&self, block: &Block) -> RpcResult<StakingTransactions>;

    fn quantity(&self, value: u64) -> Quantity;

    fn amount(&self, value: U256) -> Amount;

    fn chain_id(&self, chain_id: u64, _eth_chain_id: u64) -> Quantity {
        self.quantity(chain_id)
    }

    /// Outcome of a by-number lookup for a block that does not exist.
    fn missing_block(&self, number: u64) -> RpcResult<Option<RenderedBlock>>;

    /// Outcome of a by-number lookup for a header that does not exist.
    fn missing_header(&self, number: u64) -> RpcResult<Option<HeaderInformation>>;

    /// Header summary. The shape is the same for every version.
    fn new_header_info(&self, header: &Header, leader: &Address) -> RpcResult<HeaderInformation> {
        Ok(HeaderInformation {
            block_hash: header.hash,
            block_number: header.number,
            shard_id: header.shard_id,
            leader: self.codec().encode(leader)?,
            view_id: header.view_id,
            epoch: header.epoch,
            timestamp: format_utc(header.timestamp).ok_or_else(|| {
                RpcError::Internal(format!("timestamp {} out of range", header.timestamp))
            })?,
            unixtime: header.timestamp,
        })
    }
}

/// Build the factory for `version`.
pub fn factory_for(version: ApiVersion, codec: AddressCodec) -> Arc<dyn BlockFactory> {
    match version {
        ApiVersion::LegacyV1 => Arc::new(LegacyV1Factory::new(codec)),
        ApiVersion::V2 => Arc::new(V2Factory::new(codec)),
        ApiVersion::EthCompatible => Arc::new(EthFactory::new(codec)),
    }
}
