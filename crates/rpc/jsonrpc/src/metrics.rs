//! Prometheus metrics for the query service.

use std::future::Future;
use std::time::Instant;

use chainview_chain::CacheMetrics;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

use crate::error::RpcResult;

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct MethodLabels {
    pub namespace: String,
    pub method: String,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RateLimitLabels {
    pub rate_limit: String,
}

type HistogramFamily = Family<MethodLabels, Histogram, fn() -> Histogram>;

fn duration_histogram() -> Histogram {
    // 100us to ~6.5s
    Histogram::new(exponential_buckets(0.0001, 2.0, 17))
}

/// Request, failure, latency, throttling and cache counters.
///
/// Cloning is cheap; all clones share the same underlying series.
#[derive(Debug, Clone)]
pub struct RpcMetrics {
    pub requests: Family<MethodLabels, Counter>,
    pub failures: Family<MethodLabels, Counter>,
    pub request_duration_seconds: HistogramFamily,
    pub rate_limited: Family<RateLimitLabels, Counter>,
    pub cache: CacheMetrics,
}

impl Default for RpcMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcMetrics {
    pub fn new() -> Self {
        Self {
            requests: Family::default(),
            failures: Family::default(),
            request_duration_seconds: Family::new_with_constructor(
                duration_histogram as fn() -> Histogram,
            ),
            rate_limited: Family::default(),
            cache: CacheMetrics::new(),
        }
    }

    /// Count, time and record failure of one request.
    pub async fn instrument<T, F>(&self, namespace: &str, method: &str, request: F) -> RpcResult<T>
    where
        F: Future<Output = RpcResult<T>>,
    {
        let labels = MethodLabels {
            namespace: namespace.to_string(),
            method: method.to_string(),
        };
        self.requests.get_or_create(&labels).inc();
        let _timer = RequestTimer::start(self.request_duration_seconds.get_or_create(&labels).clone());

        let result = request.await;
        if result.is_err() {
            self.failures.get_or_create(&labels).inc();
        }
        result
    }

    /// Make the throttle series for `rate` visible before the first hit.
    pub fn init_rate_limit(&self, rate: u64) {
        let series = self.rate_limited.get_or_create(&RateLimitLabels {
            rate_limit: rate.to_string(),
        });
        drop(series);
    }

    pub fn record_rate_limited(&self, rate: u64) {
        self.rate_limited
            .get_or_create(&RateLimitLabels {
                rate_limit: rate.to_string(),
            })
            .inc();
    }

    /// Register all metrics with a Prometheus registry.
    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "chainview_rpc_requests",
            "Block-query RPC requests",
            self.requests.clone(),
        );
        registry.register(
            "chainview_rpc_failures",
            "Block-query RPC requests that returned an error",
            self.failures.clone(),
        );
        registry.register(
            "chainview_rpc_request_duration_seconds",
            "Block-query RPC request latency in seconds",
            self.request_duration_seconds.clone(),
        );
        registry.register(
            "chainview_rpc_rate_limited",
            "Requests that had to wait on the rate limiter",
            self.rate_limited.clone(),
        );
        self.cache.register(registry);
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode_prometheus(&self) -> String {
        let mut registry = Registry::default();
        self.register(&mut registry);

        let mut buffer = String::new();
        if encode(&mut buffer, &registry).is_err() {
            return String::from("# Error encoding metrics\n");
        }
        buffer
    }
}

/// Observes elapsed time into a histogram when dropped.
struct RequestTimer {
    start: Instant,
    histogram: Histogram,
}

impl RequestTimer {
    fn start(histogram: Histogram) -> Self {
        Self {
            start: Instant::now(),
            histogram,
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RpcError;

    fn labels(method: &str) -> MethodLabels {
        MethodLabels {
            namespace: "chain".into(),
            method: method.into(),
        }
    }

    #[tokio::test]
    async fn test_instrument_counts_failures() {
        let metrics = RpcMetrics::new();

        let ok: RpcResult<u64> = metrics.instrument("chain", "getEpoch", async { Ok(1) }).await;
        assert!(ok.is_ok());
        let err: RpcResult<u64> = metrics
            .instrument("chain", "getEpoch", async { Err(RpcError::BlockTooHigh) })
            .await;
        assert!(err.is_err());

        assert_eq!(metrics.requests.get_or_create(&labels("getEpoch")).get(), 2);
        assert_eq!(metrics.failures.get_or_create(&labels("getEpoch")).get(), 1);
    }

    #[test]
    fn test_encode_contains_series() {
        let metrics = RpcMetrics::new();
        metrics.init_rate_limit(1000);
        let text = metrics.encode_prometheus();
        assert!(text.contains("chainview_rpc_rate_limited_total{rate_limit=\"1000\"} 0"));
    }
}
