use std::time::Duration;

/// Counting strategy behind a limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitAlgorithm {
    /// Count per key inside windows that reset every `window_secs`
    #[default]
    FixedWindow,
    /// GCRA token bucket (smooth refill, burst up to `max_requests`)
    Gcra,
}

/// Configuration for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window duration in seconds
    pub window_secs: u64,
    pub algorithm: RateLimitAlgorithm,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs.max(1))
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100, // 100 requests
            window_secs: 60,   // per minute
            algorithm: RateLimitAlgorithm::FixedWindow,
        }
    }
}
