//! Error types for the query service, mapped onto JSON-RPC error codes.

use chainview_chain::ChainError;
use jsonrpsee::types::ErrorObjectOwned;
use thiserror::Error;

/// JSON-RPC error codes.
pub mod codes {
    /// Invalid params
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server error range -32000 to -32099

    /// Resource not found
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    /// Resource unavailable
    pub const RESOURCE_UNAVAILABLE: i32 = -32002;
    /// Method not supported
    pub const METHOD_NOT_SUPPORTED: i32 = -32004;
}

/// Errors surfaced to RPC callers.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    RequestFormat(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("block range must be at most {limit} blocks")]
    RangeTooLarge { limit: u64 },

    #[error("pending block is not supported")]
    PendingBlock,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("requested block number greater than current block number")]
    BlockTooHigh,

    #[error("{0} is not supported by this API version")]
    UnsupportedForVersion(String),

    #[error("rate limit wait deadline exceeded")]
    DeadlineExceeded,

    #[error("request cancelled")]
    Cancelled,

    #[error("not beacon shard")]
    NotBeaconShard,

    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: ChainError,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl RpcError {
    /// Wrap a backend failure with what was being fetched.
    pub fn upstream(context: &'static str) -> impl FnOnce(ChainError) -> RpcError {
        move |source| RpcError::Upstream { context, source }
    }

    pub fn code(&self) -> i32 {
        match self {
            RpcError::RequestFormat(_)
            | RpcError::InvalidAddress(_)
            | RpcError::RangeTooLarge { .. }
            | RpcError::PendingBlock => codes::INVALID_PARAMS,
            RpcError::NotFound(_) | RpcError::BlockTooHigh => codes::RESOURCE_NOT_FOUND,
            RpcError::UnsupportedForVersion(_) | RpcError::NotBeaconShard => {
                codes::METHOD_NOT_SUPPORTED
            }
            RpcError::DeadlineExceeded | RpcError::Cancelled => codes::RESOURCE_UNAVAILABLE,
            RpcError::Upstream { .. } | RpcError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }
}

impl From<ChainError> for RpcError {
    fn from(source: ChainError) -> Self {
        RpcError::Upstream {
            context: "chain backend",
            source,
        }
    }
}

impl From<RpcError> for ErrorObjectOwned {
    fn from(err: RpcError) -> Self {
        ErrorObjectOwned::owned(err.code(), err.to_string(), None::<()>)
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    /// Validation failed with one or more errors.
    #[error("config validation failed:\n{}", .0.join("\n"))]
    ValidationFailed(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let cases = [
            (RpcError::RequestFormat("x".into()), codes::INVALID_PARAMS),
            (RpcError::RangeTooLarge { limit: 1024 }, codes::INVALID_PARAMS),
            (RpcError::PendingBlock, codes::INVALID_PARAMS),
            (RpcError::BlockTooHigh, codes::RESOURCE_NOT_FOUND),
            (
                RpcError::UnsupportedForVersion("staking".into()),
                codes::METHOD_NOT_SUPPORTED,
            ),
            (RpcError::DeadlineExceeded, codes::RESOURCE_UNAVAILABLE),
            (RpcError::Cancelled, codes::RESOURCE_UNAVAILABLE),
            (
                RpcError::from(ChainError::MaskNotFound(3)),
                codes::INTERNAL_ERROR,
            ),
        ];
        for (err, code) in cases {
            let obj = ErrorObjectOwned::from(err);
            assert_eq!(obj.code(), code);
        }
    }

    #[test]
    fn test_upstream_keeps_context() {
        let err = RpcError::upstream("reading validator")(ChainError::ValidatorNotFound(
            "0xabc".into(),
        ));
        assert_eq!(
            err.to_string(),
            "reading validator: validator not found: 0xabc"
        );
    }
}
