use crate::{
    FixedWindowRateLimiter, GcraRateLimiter, RateLimitAlgorithm, RateLimitConfig,
    RateLimitDecision, RateLimitKey, RateLimiter, RateLimiterFactory,
};

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use googletest::prelude::*;

fn config(max_requests: u32, window_secs: u64) -> RateLimitConfig {
    RateLimitConfig {
        max_requests,
        window_secs,
        algorithm: RateLimitAlgorithm::FixedWindow,
    }
}

#[test]
fn given_default_config_then_one_hundred_per_minute_fixed_window() {
    let config = RateLimitConfig::default();

    assert_that!(config.max_requests, eq(100));
    assert_that!(config.window(), eq(Duration::from_secs(60)));
    assert_that!(config.algorithm, eq(RateLimitAlgorithm::FixedWindow));
}

#[test]
fn given_zero_window_then_clamped_to_one_second() {
    assert_that!(config(3, 0).window(), eq(Duration::from_secs(1)));
}

#[test]
fn given_keys_then_display_is_namespaced() {
    assert_that!(RateLimitKey::client("1.2.3.4").to_string(), eq("ip:1.2.3.4"));
    assert_that!(RateLimitKey::tenant("acme").to_string(), eq("tenant:acme"));
    assert_that!(RateLimitKey::user("u1").to_string(), eq("user:u1"));
}

#[tokio::test(start_paused = true)]
async fn given_limit_three_when_fourth_request_in_window_then_denied_until_window_passes() {
    let limiter = FixedWindowRateLimiter::new(&config(3, 60));
    let key = RateLimitKey::client("1.2.3.4");

    assert_that!(limiter.allow(&key), eq(RateLimitDecision::Allowed { remaining: 2 }));
    assert_that!(limiter.allow(&key), eq(RateLimitDecision::Allowed { remaining: 1 }));
    assert_that!(limiter.allow(&key), eq(RateLimitDecision::Allowed { remaining: 0 }));

    tokio::time::advance(Duration::from_secs(10)).await;
    let denied = limiter.allow(&key);
    assert_that!(
        denied,
        eq(RateLimitDecision::Denied {
            retry_after: Duration::from_secs(50)
        })
    );

    tokio::time::advance(Duration::from_secs(50)).await;
    assert!(limiter.allow(&key).is_allowed());
}

#[tokio::test(start_paused = true)]
async fn given_exhausted_key_when_other_key_requests_then_other_key_unaffected() {
    let limiter = FixedWindowRateLimiter::new(&config(1, 60));

    assert!(limiter.allow(&RateLimitKey::client("1.2.3.4")).is_allowed());
    assert!(!limiter.allow(&RateLimitKey::client("1.2.3.4")).is_allowed());

    assert!(limiter.allow(&RateLimitKey::client("5.6.7.8")).is_allowed());
    assert!(limiter.allow(&RateLimitKey::tenant("1.2.3.4")).is_allowed());
}

#[tokio::test(start_paused = true)]
async fn given_denied_request_then_count_does_not_grow_past_limit() {
    let limiter = FixedWindowRateLimiter::new(&config(2, 60));
    let key = RateLimitKey::client("1.2.3.4");

    for _ in 0..10 {
        limiter.allow(&key);
    }
    tokio::time::advance(Duration::from_secs(60)).await;

    // Fresh window grants the full limit again
    assert_that!(limiter.allow(&key), eq(RateLimitDecision::Allowed { remaining: 1 }));
}

#[tokio::test(start_paused = true)]
async fn given_stale_buckets_when_purged_then_only_expired_keys_removed() {
    let limiter = FixedWindowRateLimiter::new(&config(5, 60));

    limiter.allow(&RateLimitKey::client("old"));
    tokio::time::advance(Duration::from_secs(45)).await;
    limiter.allow(&RateLimitKey::client("recent"));
    tokio::time::advance(Duration::from_secs(20)).await;

    let removed = limiter.purge_expired();

    assert_that!(removed, eq(1));
    assert_that!(limiter.tracked_keys(), eq(1));
}

#[test]
fn given_many_threads_on_one_key_then_allowed_count_never_exceeds_limit() {
    let limiter = FixedWindowRateLimiter::new(&config(50, 3600));
    let key = RateLimitKey::client("10.0.0.1");
    let allowed = AtomicU32::new(0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..25 {
                    if limiter.allow(&key).is_allowed() {
                        allowed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    assert_that!(allowed.load(Ordering::SeqCst), eq(50));
}

#[test]
fn given_gcra_limit_three_when_burst_exhausted_then_denied_with_retry_after() {
    let limiter = GcraRateLimiter::new(&RateLimitConfig {
        max_requests: 3,
        window_secs: 60,
        algorithm: RateLimitAlgorithm::Gcra,
    });
    let key = RateLimitKey::client("1.2.3.4");

    for _ in 0..3 {
        assert!(limiter.allow(&key).is_allowed());
    }
    let denied = limiter.allow(&key);

    assert!(!denied.is_allowed());
    assert_that!(denied.retry_after(), some(gt(Duration::ZERO)));
    assert!(limiter.allow(&RateLimitKey::client("5.6.7.8")).is_allowed());
}

#[test]
fn given_factory_then_builds_limiter_for_configured_algorithm() {
    let factory = RateLimiterFactory::new(RateLimitConfig {
        max_requests: 1,
        window_secs: 60,
        algorithm: RateLimitAlgorithm::Gcra,
    });
    let limiter = factory.create();
    let key = RateLimitKey::user("u1");

    assert!(limiter.allow(&key).is_allowed());
    assert!(!limiter.allow(&key).is_allowed());
    assert_that!(factory.config().algorithm, eq(RateLimitAlgorithm::Gcra));
}
