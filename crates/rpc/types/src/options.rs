//! Block rendering options.
//!
//! Clients send options in a version-dependent shape: legacy clients send a
//! bare `fullTx` boolean, structured clients send a [`BlockArgs`] object. Both
//! are captured by [`BlockOptions`] and resolved into one canonical
//! [`RenderOptions`] before any business logic runs.

use serde::{Deserialize, Serialize};

/// Options object sent by structured clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockArgs {
    /// Include the addresses of the committee members that signed the block.
    pub with_signers: bool,
    /// Render full transaction objects instead of hashes.
    pub full_tx: bool,
    /// Include staking transactions.
    pub incl_staking: bool,
}

/// Raw options payload as it arrives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockOptions {
    /// Legacy `fullTx` flag.
    FullTx(bool),
    /// Structured options object.
    Args(BlockArgs),
}

impl BlockOptions {
    /// Decode an options payload, rejecting any shape other than a boolean or
    /// an object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl From<BlockArgs> for BlockOptions {
    fn from(args: BlockArgs) -> Self {
        BlockOptions::Args(args)
    }
}

/// Canonical rendering options, fixed for the duration of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub include_full_transactions: bool,
    pub include_signers: bool,
    pub include_staking_transactions: bool,
}

impl From<BlockArgs> for RenderOptions {
    fn from(args: BlockArgs) -> Self {
        Self {
            include_full_transactions: args.full_tx,
            include_signers: args.with_signers,
            include_staking_transactions: args.incl_staking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_shapes() {
        assert_eq!(
            BlockOptions::from_value(json!(true)).unwrap(),
            BlockOptions::FullTx(true)
        );
        assert_eq!(
            BlockOptions::from_value(json!({"withSigners": true, "fullTx": true})).unwrap(),
            BlockOptions::Args(BlockArgs {
                with_signers: true,
                full_tx: true,
                incl_staking: false,
            })
        );
        // Empty object falls back to defaults.
        assert_eq!(
            BlockOptions::from_value(json!({})).unwrap(),
            BlockOptions::Args(BlockArgs::default())
        );
    }

    #[test]
    fn test_unrecognized_shape_rejected() {
        assert!(BlockOptions::from_value(json!("full")).is_err());
        assert!(BlockOptions::from_value(json!(1)).is_err());
        assert!(BlockOptions::from_value(json!({"fullTx": "yes"})).is_err());
    }
}
