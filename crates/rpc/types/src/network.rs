//! Network-wide statistics.

use serde::Serialize;

use crate::quantity::FixedDecimal;

/// One shard entry of `getShardingStructure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardInfo {
    /// Whether this is the shard the node serves.
    pub current: bool,
    #[serde(rename = "shardID")]
    pub shard_id: u32,
    pub http: String,
    pub ws: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StakingNetworkInfo {
    pub total_supply: FixedDecimal,
    pub circulating_supply: FixedDecimal,
    pub epoch_last_block: u64,
    pub total_staking: FixedDecimal,
    pub median_raw_stake: FixedDecimal,
}

/// Staking-reward utility snapshot of the beacon chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UtilityMetrics {
    pub accumulator_snapshot: FixedDecimal,
    pub current_staked_percentage: FixedDecimal,
    pub deviation: FixedDecimal,
    pub adjustment: FixedDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staking_network_info_keys() {
        let info = StakingNetworkInfo {
            total_supply: FixedDecimal::from_units(10),
            circulating_supply: FixedDecimal::from_units(8),
            epoch_last_block: 32767,
            total_staking: FixedDecimal::from_units(3),
            median_raw_stake: FixedDecimal::from_units(1),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["total-supply"], "10.000000000000000000");
        assert_eq!(value["epoch-last-block"], 32767);
        assert_eq!(value["median-raw-stake"], "1.000000000000000000");
    }
}
