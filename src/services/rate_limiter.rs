//! Rate Limiter - cost-weighted token bucket for AlephX REST calls
//!
//! The exchange publishes a base rate limit in milliseconds per request.
//! Every endpoint carries a `cost` multiplier: a request spends `cost`
//! tokens from a bucket of capacity 1 that refills at one token per base
//! interval. Zero-cost endpoints never wait.

use crate::endpoints::Endpoint;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

/// Bucket capacity, in cost units
const CAPACITY: f64 = 1.0;

struct TokenBucket {
    tokens: f64,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    fn new(rate_limit: Duration) -> Self {
        Self {
            tokens: CAPACITY,
            max_tokens: CAPACITY,
            refill_rate: CAPACITY / rate_limit.as_secs_f64(),
            last_refill: Instant::now(),
        }
    }

    /// Refill tokens based on elapsed time
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
    }

    /// Requests costing more than the capacity only need a full bucket.
    /// The balance then goes negative and later callers absorb the debt.
    fn required(&self, cost: f64) -> f64 {
        cost.min(self.max_tokens)
    }

    fn try_acquire(&mut self, cost: f64) -> bool {
        self.refill();
        if self.tokens >= self.required(cost) {
            self.tokens -= cost;
            true
        } else {
            false
        }
    }

    fn time_until_available(&mut self, cost: f64) -> Duration {
        self.refill();
        let deficit = self.required(cost) - self.tokens;
        if deficit <= 0.0 {
            Duration::ZERO
        } else {
            // Saturates when the accumulated debt is too large to express
            Duration::try_from_secs_f64(deficit / self.refill_rate).unwrap_or(Duration::MAX)
        }
    }
}

/// Shared limiter; clone freely, all clones draw from the same bucket
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

impl RateLimiter {
    pub fn new(rate_limit_ms: u64) -> Self {
        let rate_limit = Duration::from_millis(rate_limit_ms.max(1));
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket::new(rate_limit))),
        }
    }

    /// Spend `cost` tokens, waiting until they are available.
    /// Returns true if we had to wait (i.e., were rate limited).
    ///
    /// NaN and infinite costs are ignored and never wait.
    pub async fn acquire(&self, cost: f64) -> bool {
        if !cost.is_finite() {
            warn!("Rate limiter: ignoring non-finite cost {}", cost);
            return false;
        }
        if cost <= 0.0 {
            return false;
        }

        let mut waited = false;
        loop {
            let wait_time = {
                let mut b = self.bucket.lock().await;
                if b.try_acquire(cost) {
                    return waited;
                }
                b.time_until_available(cost)
            };

            waited = true;
            debug!("Rate limiter: waiting {:?} for cost {}", wait_time, cost);
            tokio::time::sleep(wait_time).await;
        }
    }

    /// Spend the endpoint's configured cost
    pub async fn acquire_endpoint(&self, endpoint: &Endpoint) -> bool {
        self.acquire(endpoint.config.cost).await
    }

    /// Try to spend `cost` tokens without waiting. Returns true if successful.
    /// A non-finite cost is never granted.
    pub async fn try_acquire(&self, cost: f64) -> bool {
        if !cost.is_finite() {
            return false;
        }
        if cost <= 0.0 {
            return true;
        }
        let mut b = self.bucket.lock().await;
        b.try_acquire(cost)
    }

    /// Utilization (0.0 = idle, 1.0 = exhausted)
    pub async fn utilization(&self) -> f64 {
        let mut b = self.bucket.lock().await;
        b.refill();
        (1.0 - (b.tokens / b.max_tokens)).clamp(0.0, 1.0)
    }
}
