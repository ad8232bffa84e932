use crate::{RateLimitConfig, RateLimitDecision, RateLimitKey, RateLimiter as RequestRateLimiter};

use std::num::NonZeroU32;

use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    middleware::StateInformationMiddleware,
    state::keyed::DefaultKeyedStateStore,
};

type KeyedGovernor =
    RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock, StateInformationMiddleware>;

/// Keyed GCRA limiter: `max_requests` burst, refilled evenly across the window
pub struct GcraRateLimiter {
    limiter: KeyedGovernor,
    clock: DefaultClock,
}

impl GcraRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
        let period = config.window() / burst.get();

        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota).with_middleware::<StateInformationMiddleware>(),
            clock: DefaultClock::default(),
        }
    }
}

impl RequestRateLimiter for GcraRateLimiter {
    fn allow(&self, key: &RateLimitKey) -> RateLimitDecision {
        match self.limiter.check_key(&key.to_string()) {
            Ok(snapshot) => RateLimitDecision::Allowed {
                remaining: snapshot.remaining_burst_capacity(),
            },
            Err(not_until) => RateLimitDecision::Denied {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }

    fn purge_expired(&self) -> usize {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        before.saturating_sub(self.limiter.len())
    }
}
