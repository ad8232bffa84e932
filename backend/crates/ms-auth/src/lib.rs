pub mod bearer;
pub mod claims;
pub mod error;
pub mod fixed_window_rate_limiter;
pub mod gcra_rate_limiter;
pub mod rate_limit_config;
pub mod rate_limit_decision;
pub mod rate_limit_key;
pub mod rate_limiter;
pub mod rate_limiter_factory;
pub mod signing_algorithm;
pub mod tenant_context_binder;
pub mod token_codec;

pub use bearer::extract_bearer;
pub use claims::Claims;
pub use error::{AuthError, Result};
pub use fixed_window_rate_limiter::FixedWindowRateLimiter;
pub use gcra_rate_limiter::GcraRateLimiter;
pub use rate_limit_config::{RateLimitAlgorithm, RateLimitConfig};
pub use rate_limit_decision::RateLimitDecision;
pub use rate_limit_key::RateLimitKey;
pub use rate_limiter::RateLimiter;
pub use rate_limiter_factory::RateLimiterFactory;
pub use signing_algorithm::SigningAlgorithm;
pub use tenant_context_binder::{BindOutcome, TenantContextBinder};
pub use token_codec::TokenCodec;

#[cfg(test)]
mod tests;
