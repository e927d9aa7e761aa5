//! Header summary shared by every API version.

use alloy_primitives::B256;
use serde::Serialize;
use time::macros::format_description;
use time::OffsetDateTime;

/// Compact header view returned by `latestHeader` and `getHeaderByNumber`.
///
/// The shape is identical across versions: plain integers, bech32 leader and
/// an RFC 3339-like UTC timestamp next to the raw unix time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderInformation {
    pub block_hash: B256,
    pub block_number: u64,
    #[serde(rename = "shardID")]
    pub shard_id: u32,
    pub leader: String,
    #[serde(rename = "viewID")]
    pub view_id: u64,
    pub epoch: u64,
    pub timestamp: String,
    pub unixtime: u64,
}

/// Render a unix timestamp as `YYYY-MM-DD HH:MM:SS +0000 UTC`.
///
/// Returns `None` for timestamps past the representable calendar range.
pub fn format_utc(unix: u64) -> Option<String> {
    let secs = i64::try_from(unix).ok()?;
    OffsetDateTime::from_unix_timestamp(secs)
        .ok()?
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] +0000 UTC"
        ))
        .ok()
}
