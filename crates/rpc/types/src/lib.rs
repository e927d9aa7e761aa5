//! Wire types for the chainview block-query RPC.
//!
//! The same chain data is served in three incompatible shapes (see
//! [`ApiVersion`]). Types here describe those shapes; choosing between them is
//! the job of the block factories in `chainview_jsonrpc`.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod block;
pub mod committee;
pub mod header;
pub mod network;
pub mod options;
pub mod quantity;
pub mod transaction;

pub use block::{
    EthBlock, EthTransactions, NativeBlock, NativeStakingTransactions, NativeTransactions,
    RenderedBlock,
};
pub use committee::{
    BadBlock, CommitteeMember, CrossLink, EpochCommitteeInfo, LatestChainHeaders,
    ShardCommitteeInfo, SuperCommitteeInfo,
};
pub use header::{format_utc, HeaderInformation};
pub use network::{ShardInfo, StakingNetworkInfo, UtilityMetrics};
pub use options::{BlockArgs, BlockOptions, RenderOptions};
pub use quantity::{Amount, FixedDecimal, Quantity};
pub use transaction::{
    EthTransaction, NativeStakingTransaction, NativeTransaction, StakingMessage,
    StakingTransactions,
};

/// API flavour a query service renders responses for.
///
/// Selected once per service; never per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiVersion {
    /// First-generation API: hex quantities, bech32 addresses, boolean options.
    LegacyV1,
    /// Structured API: plain integers, options object.
    V2,
    /// Ethereum-compatible API for standard wallets and tooling.
    #[serde(rename = "eth")]
    EthCompatible,
}

impl ApiVersion {
    /// JSON-RPC namespace the version is served under.
    pub fn namespace(&self) -> &'static str {
        match self {
            ApiVersion::LegacyV1 => "chain",
            ApiVersion::V2 => "chainv2",
            ApiVersion::EthCompatible => "eth",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Block height as requested by a client.
///
/// `Pending` is accepted on the wire but can never be resolved by the query
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockNumber {
    /// Explicit height.
    Number(u64),
    /// Current chain head.
    Latest,
    /// Block under construction.
    Pending,
}

impl Default for BlockNumber {
    fn default() -> Self {
        BlockNumber::Latest
    }
}

impl From<u64> for BlockNumber {
    fn from(number: u64) -> Self {
        BlockNumber::Number(number)
    }
}

impl BlockNumber {
    /// Parse a tag, hex quantity or decimal string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "latest" => Some(BlockNumber::Latest),
            "pending" => Some(BlockNumber::Pending),
            "earliest" => Some(BlockNumber::Number(0)),
            _ => {
                let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => s.parse::<u64>(),
                };
                parsed.ok().map(BlockNumber::Number)
            }
        }
    }
}

impl Serialize for BlockNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockNumber::Number(n) => serializer.serialize_str(&format!("{n:#x}")),
            BlockNumber::Latest => serializer.serialize_str("latest"),
            BlockNumber::Pending => serializer.serialize_str("pending"),
        }
    }
}

impl<'de> Deserialize<'de> for BlockNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BlockNumberVisitor;

        impl Visitor<'_> for BlockNumberVisitor {
            type Value = BlockNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a block number, hex quantity, or one of latest/pending/earliest")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(BlockNumber::Number(v))
            }

            // Negative sentinels used by older clients.
            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                match v {
                    -1 => Ok(BlockNumber::Latest),
                    -2 => Ok(BlockNumber::Pending),
                    v if v >= 0 => Ok(BlockNumber::Number(v as u64)),
                    v => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                BlockNumber::parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(BlockNumberVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_number_deserialization() {
        let cases = [
            ("100", BlockNumber::Number(100)),
            ("\"0x64\"", BlockNumber::Number(100)),
            ("\"100\"", BlockNumber::Number(100)),
            ("\"latest\"", BlockNumber::Latest),
            ("\"pending\"", BlockNumber::Pending),
            ("\"earliest\"", BlockNumber::Number(0)),
            ("-1", BlockNumber::Latest),
            ("-2", BlockNumber::Pending),
        ];
        for (json, expected) in cases {
            let parsed: BlockNumber = serde_json::from_str(json).unwrap();
            assert_eq!(parsed, expected, "failed for {json}");
        }
    }

    #[test]
    fn test_block_number_rejects_garbage() {
        assert!(serde_json::from_str::<BlockNumber>("\"safe-ish\"").is_err());
        assert!(serde_json::from_str::<BlockNumber>("-3").is_err());
        assert!(serde_json::from_str::<BlockNumber>("true").is_err());
    }

    #[test]
    fn test_block_number_serialization() {
        assert_eq!(
            serde_json::to_string(&BlockNumber::Number(255)).unwrap(),
            "\"0xff\""
        );
        assert_eq!(
            serde_json::to_string(&BlockNumber::Latest).unwrap(),
            "\"latest\""
        );
    }

    #[test]
    fn test_api_version_config_names() {
        let version: ApiVersion = serde_json::from_str("\"eth\"").unwrap();
        assert_eq!(version, ApiVersion::EthCompatible);
        let version: ApiVersion = serde_json::from_str("\"legacy_v1\"").unwrap();
        assert_eq!(version, ApiVersion::LegacyV1);
        assert_eq!(ApiVersion::V2.namespace(), "chainv2");
    }
}
