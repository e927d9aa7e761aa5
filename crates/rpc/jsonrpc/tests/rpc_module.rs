//! End-to-end calls through the assembled RPC module.

use std::sync::Arc;

use chainview_chain::testing::{committee_slot, MockChain};
use chainview_chain::AddressCodec;
use chainview_jsonrpc::config::RateLimitConfig;
use chainview_jsonrpc::{build_module, RpcConfig, RpcMetrics};
use jsonrpsee::RpcModule;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

const NO_PARAMS: [Value; 0] = [];

struct Harness {
    module: RpcModule<()>,
    metrics: RpcMetrics,
    shutdown: CancellationToken,
}

fn harness(head: u64) -> Harness {
    let config = RpcConfig {
        rate_limit: RateLimitConfig::disabled(),
        ..RpcConfig::default()
    };
    let metrics = RpcMetrics::new();
    let shutdown = CancellationToken::new();
    let module = build_module(
        Arc::new(MockChain::new(head)),
        &config,
        metrics.clone(),
        shutdown.clone(),
    )
    .unwrap();
    Harness {
        module,
        metrics,
        shutdown,
    }
}

#[tokio::test]
async fn legacy_block_uses_hex_and_bech32() {
    let h = harness(20);
    let block: Value = h
        .module
        .call("chain_getBlockByNumber", [json!(7), json!(true)])
        .await
        .unwrap();

    assert_eq!(block["number"], "0x7");
    assert!(block["miner"].as_str().unwrap().starts_with("one1"));
    assert!(block["transactions"][0].is_object());
    // A bare boolean keeps staking transactions in the legacy shape.
    assert!(block["stakingTransactions"].is_array());
}

#[tokio::test]
async fn v2_block_with_signers() {
    let h = harness(20);
    let block: Value = h
        .module
        .call(
            "chainv2_getBlockByNumber",
            [json!(7), json!({"withSigners": true, "fullTx": false})],
        )
        .await
        .unwrap();

    assert_eq!(block["number"], 7);
    assert_eq!(block["signers"].as_array().unwrap().len(), 3);
    assert!(block.get("stakingTransactions").is_none());
}

#[tokio::test]
async fn v2_rejects_boolean_options() {
    let h = harness(20);
    let result = h
        .module
        .call::<_, Value>("chainv2_getBlockByNumber", [json!(7), json!(true)])
        .await;
    assert!(result.unwrap_err().to_string().contains("options"));
}

#[tokio::test]
async fn block_above_head_diverges_by_namespace() {
    let h = harness(100);

    let eth: Value = h
        .module
        .call("eth_getBlockByNumber", [json!("0x96"), json!(false)])
        .await
        .unwrap();
    assert!(eth.is_null());

    for method in ["chain_getBlockByNumber", "chainv2_getBlockByNumber"] {
        let err = h
            .module
            .call::<_, Value>(method, [json!(150), Value::Null])
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("greater than current block number"),
            "{method}: {err}"
        );
    }
}

#[tokio::test]
async fn eth_rejects_staking_options() {
    let h = harness(20);
    let err = h
        .module
        .call::<_, Value>(
            "eth_getBlockByNumber",
            [json!(3), json!({"inclStaking": true})],
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not supported"), "{err}");
}

#[tokio::test]
async fn chain_id_per_namespace() {
    let h = harness(1);
    let legacy: Value = h.module.call("chain_chainId", NO_PARAMS).await.unwrap();
    let v2: Value = h.module.call("chainv2_chainId", NO_PARAMS).await.unwrap();
    let eth: Value = h.module.call("eth_chainId", NO_PARAMS).await.unwrap();
    assert_eq!(legacy, json!("0x1"));
    assert_eq!(v2, json!(1));
    assert_eq!(eth, json!("0x63564c40"));
}

#[tokio::test]
async fn block_range_limits() {
    let h = harness(30);

    let err = h
        .module
        .call::<_, Value>("chainv2_getBlocks", [json!(0), json!(1025), Value::Null])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("at most 1024"), "{err}");

    let blocks: Vec<Value> = h
        .module
        .call("chainv2_getBlocks", [json!(25), json!(40), Value::Null])
        .await
        .unwrap();
    let numbers: Vec<u64> = blocks
        .iter()
        .map(|b| b["number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, (25..=30).collect::<Vec<_>>());
}

#[tokio::test]
async fn shutdown_cancels_range_queries() {
    let h = harness(30);
    h.shutdown.cancel();
    let err = h
        .module
        .call::<_, Value>("chain_getBlocks", [json!(1), json!(5), Value::Null])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cancelled"), "{err}");
}

#[tokio::test]
async fn genesis_is_never_signed() {
    let h = harness(10);
    for ns in ["chain", "chainv2", "eth"] {
        let signed: bool = h
            .module
            .call(&format!("{ns}_isBlockSigner"), [json!(0), json!("nonsense")])
            .await
            .unwrap();
        assert!(!signed, "{ns}");
    }
}

#[tokio::test]
async fn signer_queries_agree() {
    let h = harness(10);
    let codec = AddressCodec::default();
    let signers: Vec<String> = h
        .module
        .call("chain_getBlockSigners", [json!(6)])
        .await
        .unwrap();
    let keys: Vec<String> = h
        .module
        .call("chain_getBlockSignerKeys", [json!(6)])
        .await
        .unwrap();
    assert_eq!(signers.len(), keys.len());

    let slot_one = codec.encode(&committee_slot(1).address).unwrap();
    let signed: bool = h
        .module
        .call("chain_isBlockSigner", [json!(6), json!(slot_one)])
        .await
        .unwrap();
    assert!(signed);
}

#[tokio::test]
async fn staking_network_info_shape() {
    let h = harness(40);
    let info: Value = h
        .module
        .call("chainv2_getStakingNetworkInfo", NO_PARAMS)
        .await
        .unwrap();
    assert_eq!(info["epoch-last-block"], 47);
    assert_eq!(info["total-supply"], "12600000000.000000000000000000");
}

#[tokio::test]
async fn requests_are_counted() {
    let h = harness(5);
    let _: Value = h.module.call("chain_getEpoch", NO_PARAMS).await.unwrap();
    let text = h.metrics.encode_prometheus();
    assert!(
        text.contains("chainview_rpc_requests_total{namespace=\"chain\",method=\"getEpoch\"} 1"),
        "{text}"
    );
}

#[tokio::test]
async fn beacon_views_shape() {
    let h = harness(40);
    let heads: Value = h
        .module
        .call("chain_getLatestChainHeaders", NO_PARAMS)
        .await
        .unwrap();
    assert_eq!(heads["shard-chain-header"]["blockNumber"], 40);
    assert!(heads["beacon-chain-header"]["leader"]
        .as_str()
        .unwrap()
        .starts_with("one1"));

    let links: Value = h
        .module
        .call("chainv2_getLastCrossLinks", NO_PARAMS)
        .await
        .unwrap();
    assert_eq!(links[0]["block-number"], 40);

    let committees: Value = h
        .module
        .call("chain_getSuperCommittees", NO_PARAMS)
        .await
        .unwrap();
    assert_eq!(committees["current"]["epoch"], 2);
    assert!(committees["current"]["shards"][0]["subcommittee"][0]["earning-account"].is_string());

    let rlp: Value = h
        .module
        .call("eth_getHeaderByNumberRLPHex", [json!("0x96")])
        .await
        .unwrap();
    assert!(rlp.is_null());

    let bad: Vec<Value> = h
        .module
        .call("eth_getCurrentBadBlocks", NO_PARAMS)
        .await
        .unwrap();
    assert!(bad.is_empty());
}
