use crate::tests::{EnvGuard, setup_valid_env};
use crate::{Config, LimiterAlgorithm};

use googletest::assert_that;
use googletest::prelude::{anything, contains_substring, eq, err, ok};
use serial_test::serial;

// =========================================================================
// Validation Tests - Rate Limit
// =========================================================================

#[test]
#[serial]
fn given_defaults_then_fixed_window_hundred_per_minute() {
    // Given
    let (_temp, _dir, _secret) = setup_valid_env();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.rate_limit.max_requests, eq(100));
    assert_that!(config.rate_limit.window_secs, eq(60));
    assert_that!(config.rate_limit.algorithm, eq(LimiterAlgorithm::FixedWindow));
    assert_that!(config.validate(), ok(anything()));
}

#[test]
#[serial]
fn given_gcra_override_when_load_then_algorithm_is_gcra() {
    // Given
    let (_temp, _dir, _secret) = setup_valid_env();
    let _alg = EnvGuard::set("MS_RATE_LIMIT_ALGORITHM", "gcra");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.rate_limit.algorithm, eq(LimiterAlgorithm::Gcra));
}

#[test]
#[serial]
fn given_unknown_algorithm_override_when_load_then_keeps_default() {
    // Given
    let (_temp, _dir, _secret) = setup_valid_env();
    let _alg = EnvGuard::set("MS_RATE_LIMIT_ALGORITHM", "leaky_bucket");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.rate_limit.algorithm, eq(LimiterAlgorithm::FixedWindow));
}

#[test]
#[serial]
fn given_zero_max_requests_when_validate_then_error() {
    // Given
    let (_temp, _dir, _secret) = setup_valid_env();
    let _max = EnvGuard::set("MS_RATE_LIMIT_MAX_REQUESTS", "0");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
    let err_msg = format!("{}", result.unwrap_err());
    assert_that!(err_msg, contains_substring("rate_limit.max_requests"));
}

#[test]
#[serial]
fn given_window_over_an_hour_when_validate_then_error() {
    // Given
    let (_temp, _dir, _secret) = setup_valid_env();
    let _window = EnvGuard::set("MS_RATE_LIMIT_WINDOW_SECS", "7200");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_zero_tenant_quota_when_validate_then_error() {
    // Given
    let (_temp, _dir, _secret) = setup_valid_env();
    let _tenant = EnvGuard::set("MS_RATE_LIMIT_TENANT_MAX_REQUESTS", "0");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    let err_msg = format!("{}", result.unwrap_err());
    assert_that!(err_msg, contains_substring("tenant_max_requests"));
}
