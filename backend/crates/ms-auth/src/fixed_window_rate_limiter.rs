use crate::{RateLimitConfig, RateLimitDecision, RateLimitKey, RateLimiter};

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug)]
struct WindowBucket {
    window_start: Instant,
    count: u32,
}

/// Fixed-window counter keyed by [`RateLimitKey`].
///
/// Each key holds `{window_start, count}`. A request is allowed iff the count
/// is below the limit before incrementing. The bucket resets lazily once
/// `window` has elapsed since `window_start`.
pub struct FixedWindowRateLimiter {
    buckets: DashMap<String, WindowBucket>,
    limit: u32,
    window: Duration,
}

impl FixedWindowRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            limit: config.max_requests,
            window: config.window(),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn allow(&self, key: &RateLimitKey) -> RateLimitDecision {
        let now = Instant::now();

        // The entry guard holds the shard lock: reset, compare and increment happen as one step
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| WindowBucket {
                window_start: now,
                count: 0,
            });

        let mut elapsed = now.saturating_duration_since(bucket.window_start);
        if elapsed >= self.window {
            bucket.window_start = now;
            bucket.count = 0;
            elapsed = Duration::ZERO;
        }

        if bucket.count < self.limit {
            bucket.count += 1;
            RateLimitDecision::Allowed {
                remaining: self.limit - bucket.count,
            }
        } else {
            RateLimitDecision::Denied {
                retry_after: self.window - elapsed,
            }
        }
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();

        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.window_start) < self.window);

        before.saturating_sub(self.buckets.len())
    }
}
