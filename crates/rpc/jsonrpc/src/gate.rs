//! Request admission gate.
//!
//! A token bucket with a burst of one request, shared by every request of a
//! service. Requests that find the bucket empty queue up behind each other
//! and give up after [`DEFAULT_WAIT_TIMEOUT`].

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::config::RateLimitConfig;
use crate::error::{RpcError, RpcResult};
use crate::metrics::RpcMetrics;

/// Longest a request waits for admission.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

struct Bucket {
    tokens: f64,
    updated: Instant,
}

impl Bucket {
    fn refill(&mut self, rate: u64, now: Instant) {
        let elapsed = now.saturating_duration_since(self.updated).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate as f64).min(1.0);
        self.updated = now;
    }
}

pub struct AdmissionGate {
    rate: u64,
    /// `None` when rate limiting is disabled.
    bucket: Option<Mutex<Bucket>>,
    metrics: RpcMetrics,
}

impl AdmissionGate {
    pub fn new(config: RateLimitConfig, metrics: RpcMetrics) -> Self {
        let bucket = config.enabled.then(|| {
            metrics.init_rate_limit(config.requests_per_second);
            Mutex::new(Bucket {
                tokens: 1.0,
                updated: Instant::now(),
            })
        });
        Self {
            rate: config.requests_per_second,
            bucket,
            metrics,
        }
    }

    /// Wait for admission.
    ///
    /// Returns immediately when disabled or when a token is available.
    /// Otherwise records a throttled wait and blocks until a token refills,
    /// failing with [`RpcError::DeadlineExceeded`] after
    /// [`DEFAULT_WAIT_TIMEOUT`].
    pub async fn wait(&self) -> RpcResult<()> {
        let Some(bucket) = &self.bucket else {
            return Ok(());
        };
        tokio::time::timeout(DEFAULT_WAIT_TIMEOUT, self.acquire(bucket))
            .await
            .map_err(|_| RpcError::DeadlineExceeded)
    }

    async fn acquire(&self, bucket: &Mutex<Bucket>) {
        let mut throttled = false;
        let mut state = bucket.lock().await;
        loop {
            state.refill(self.rate, Instant::now());
            if state.tokens >= 1.0 {
                state.tokens -= 1.0;
                return;
            }
            if !throttled {
                throttled = true;
                self.metrics.record_rate_limited(self.rate);
                trace!(rate = self.rate, "request throttled");
            }
            if self.rate == 0 {
                // Never refills; the caller's deadline ends the wait.
                std::future::pending::<()>().await;
            }
            let missing = 1.0 - state.tokens;
            tokio::time::sleep(Duration::from_secs_f64(missing / self.rate as f64)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RateLimitLabels;

    fn enabled(rate: u64, metrics: RpcMetrics) -> AdmissionGate {
        AdmissionGate::new(
            RateLimitConfig {
                enabled: true,
                requests_per_second: rate,
            },
            metrics,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_never_blocks() {
        let gate = AdmissionGate::new(RateLimitConfig::disabled(), RpcMetrics::new());
        let start = Instant::now();
        for _ in 0..10_000 {
            gate.wait().await.unwrap();
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_times_out() {
        let metrics = RpcMetrics::new();
        let gate = enabled(0, metrics.clone());

        // Bucket starts full.
        gate.wait().await.unwrap();

        let start = Instant::now();
        let err = gate.wait().await.unwrap_err();
        assert!(matches!(err, RpcError::DeadlineExceeded));
        assert_eq!(start.elapsed(), DEFAULT_WAIT_TIMEOUT);

        let labels = RateLimitLabels {
            rate_limit: "0".into(),
        };
        assert_eq!(metrics.rate_limited.get_or_create(&labels).get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_wait_succeeds_after_refill() {
        let metrics = RpcMetrics::new();
        let gate = enabled(10, metrics.clone());

        gate.wait().await.unwrap();
        let start = Instant::now();
        gate.wait().await.unwrap();
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(99), "waited {waited:?}");
        assert!(waited <= Duration::from_millis(101), "waited {waited:?}");

        let labels = RateLimitLabels {
            rate_limit: "10".into(),
        };
        assert_eq!(metrics.rate_limited.get_or_create(&labels).get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_label_registered_at_construction() {
        let metrics = RpcMetrics::new();
        let _gate = enabled(250, metrics.clone());
        assert!(metrics
            .encode_prometheus()
            .contains("chainview_rpc_rate_limited_total{rate_limit=\"250\"} 0"));
    }
}
