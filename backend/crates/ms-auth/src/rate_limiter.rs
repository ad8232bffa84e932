use crate::{RateLimitDecision, RateLimitKey};

/// Process-wide request counter shared by every in-flight request.
///
/// `allow` must charge and compare in one step per key; callers never touch
/// bucket state directly.
pub trait RateLimiter: Send + Sync {
    fn allow(&self, key: &RateLimitKey) -> RateLimitDecision;

    /// Drop state for keys whose window has fully elapsed; returns how many were removed
    fn purge_expired(&self) -> usize {
        0
    }
}
