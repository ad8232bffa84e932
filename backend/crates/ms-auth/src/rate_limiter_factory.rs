use crate::{
    FixedWindowRateLimiter, GcraRateLimiter, RateLimitAlgorithm, RateLimitConfig, RateLimiter,
};

use std::sync::Arc;

/// Builds process-wide limiters from configuration
#[derive(Clone)]
pub struct RateLimiterFactory {
    config: RateLimitConfig,
}

impl RateLimiterFactory {
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn create(&self) -> Arc<dyn RateLimiter> {
        match self.config.algorithm {
            RateLimitAlgorithm::FixedWindow => {
                Arc::new(FixedWindowRateLimiter::new(&self.config))
            }
            RateLimitAlgorithm::Gcra => Arc::new(GcraRateLimiter::new(&self.config)),
        }
    }
}

impl Default for RateLimiterFactory {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
