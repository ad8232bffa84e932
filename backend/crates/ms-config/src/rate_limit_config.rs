use crate::{ConfigError, ConfigErrorResult};

use std::str::FromStr;

use serde::Deserialize;

// Rate limit constraints
pub const MIN_RATE_LIMIT_REQUESTS: u32 = 1;
pub const MAX_RATE_LIMIT_REQUESTS: u32 = 10000;
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
pub const DEFAULT_TENANT_RATE_LIMIT_REQUESTS: u32 = 1000;

pub const MIN_RATE_LIMIT_WINDOW_SECS: u64 = 1;
pub const MAX_RATE_LIMIT_WINDOW_SECS: u64 = 3600;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimiterAlgorithm {
    #[default]
    FixedWindow,
    Gcra,
}

impl FromStr for LimiterAlgorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed_window" => Ok(Self::FixedWindow),
            "gcra" => Ok(Self::Gcra),
            _ => Err(()),
        }
    }
}

/// Rate limiting settings.
/// `max_requests` is charged per client address before anything else runs;
/// `tenant_max_requests` per tenant once a context is bound.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per window per client address
    pub max_requests: u32,
    /// Window duration in seconds
    pub window_secs: u64,
    pub algorithm: LimiterAlgorithm,
    /// Maximum requests per window per tenant on authenticated routes
    pub tenant_max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            algorithm: LimiterAlgorithm::default(),
            tenant_max_requests: DEFAULT_TENANT_RATE_LIMIT_REQUESTS,
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        for (name, value) in [
            ("max_requests", self.max_requests),
            ("tenant_max_requests", self.tenant_max_requests),
        ] {
            if !(MIN_RATE_LIMIT_REQUESTS..=MAX_RATE_LIMIT_REQUESTS).contains(&value) {
                return Err(ConfigError::rate_limit(format!(
                    "rate_limit.{} must be {}-{}, got {}",
                    name, MIN_RATE_LIMIT_REQUESTS, MAX_RATE_LIMIT_REQUESTS, value
                )));
            }
        }

        if self.window_secs < MIN_RATE_LIMIT_WINDOW_SECS
            || self.window_secs > MAX_RATE_LIMIT_WINDOW_SECS
        {
            return Err(ConfigError::rate_limit(format!(
                "rate_limit.window_secs must be {}-{}, got {}",
                MIN_RATE_LIMIT_WINDOW_SECS, MAX_RATE_LIMIT_WINDOW_SECS, self.window_secs
            )));
        }

        Ok(())
    }
}
