//! Committee and cross-shard views served from the beacon chain.

use alloy_primitives::{Bytes, B256};
use serde::Serialize;

use crate::header::HeaderInformation;

/// One committee member of a shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommitteeMember {
    /// Hex-encoded BLS key, without prefix.
    pub bls_public_key: String,
    /// Bech32 address credited for the slot.
    pub earning_account: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShardCommitteeInfo {
    pub shard_id: u32,
    pub subcommittee: Vec<CommitteeMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpochCommitteeInfo {
    pub epoch: u64,
    pub shards: Vec<ShardCommitteeInfo>,
}

/// Committees of the previous and current epoch, across all shards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuperCommitteeInfo {
    pub previous: EpochCommitteeInfo,
    pub current: EpochCommitteeInfo,
}

/// Latest block of a shard as committed to the beacon chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrossLink {
    pub hash: B256,
    pub block_number: u64,
    pub view_id: u64,
    pub signature: Bytes,
    pub signature_bitmap: Bytes,
    pub shard_id: u32,
    pub epoch_number: u64,
}

/// A block the node rejected, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadBlock {
    pub hash: B256,
    pub number: u64,
    pub parent_hash: B256,
    pub reason: String,
}

/// Heads of the beacon chain and of the node's own shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LatestChainHeaders {
    pub beacon_chain_header: HeaderInformation,
    pub shard_chain_header: HeaderInformation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cross_link_keys() {
        let link = CrossLink {
            hash: B256::ZERO,
            block_number: 40,
            view_id: 41,
            signature: Bytes::from(vec![0xab]),
            signature_bitmap: Bytes::from(vec![0x07]),
            shard_id: 1,
            epoch_number: 2,
        };
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["block-number"], 40);
        assert_eq!(value["view-id"], 41);
        assert_eq!(value["shard-id"], 1);
        assert_eq!(value["signature-bitmap"], "0x07");
        assert_eq!(value["epoch-number"], 2);
    }

    #[test]
    fn test_committee_member_keys() {
        let member = CommitteeMember {
            bls_public_key: "aa".into(),
            earning_account: "one1xyz".into(),
        };
        assert_eq!(
            serde_json::to_value(&member).unwrap(),
            json!({"bls-public-key": "aa", "earning-account": "one1xyz"})
        );
    }
}
