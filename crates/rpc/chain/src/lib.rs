//! Chain access and derived block data for the chainview RPC.
//!
//! The node's chain-state engine sits behind [`ChainBackend`]. On top of it
//! this crate derives per-block data that is costly to recompute (leaders,
//! signer sets, rendered staking transactions) and caches it by block number
//! in a [`BlockDataCache`].
//!
//! ```text
//!   QueryService ──► BlockDataCache ──► SignerResolver ──► ChainBackend
//! ```

pub mod address;
pub mod backend;
pub mod cache;
pub mod error;
pub mod mask;
pub mod signers;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

pub use address::{AddressCodec, DEFAULT_HRP};
pub use backend::ChainBackend;
pub use cache::{BlockDataCache, CacheConfig, CacheMetrics, DerivedCache, DEFAULT_CACHE_SIZE};
pub use error::{ChainError, ChainResult};
pub use mask::SignatureMask;
pub use signers::{SignerData, SignerResolver};
pub use types::*;
