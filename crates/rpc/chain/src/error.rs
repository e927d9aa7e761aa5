//! Errors raised by the chain backend and the derived-data layer.

use thiserror::Error;

/// Errors that can occur while reading chain state or deriving data from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Header not found for the given height.
    #[error("header not found: {0}")]
    HeaderNotFound(u64),

    /// Block not found for the given height.
    #[error("block not found: {0}")]
    BlockNotFound(u64),

    /// No committee roster recorded for the epoch.
    #[error("committee not found for epoch {0}")]
    CommitteeNotFound(u64),

    /// No signature mask recorded for the block.
    #[error("signature mask not found for block {0}")]
    MaskNotFound(u64),

    /// A BLS key was checked against a mask that does not contain it.
    #[error("key {0} is not part of the signature mask")]
    KeyNotInMask(String),

    /// Bitmap length does not match the mask's key count.
    #[error("malformed signature bitmap: expected {expected} bytes, got {actual}")]
    MalformedMask { expected: usize, actual: usize },

    /// Address could not be encoded or decoded.
    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Validator has no staking record.
    #[error("validator not found: {0}")]
    ValidatorNotFound(String),

    /// Any other failure reported by the chain-state engine.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
