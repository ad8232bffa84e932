use crate::Config;
use crate::tests::{EnvGuard, setup_valid_env};

use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{anything, contains_substring, eq, err};
use serial_test::serial;

// =========================================================================
// Validation Tests - Database
// =========================================================================

#[test]
#[serial]
fn given_database_path_with_traversal_when_validate_then_error() {
    // Given
    let (_temp, _dir, _secret) = setup_valid_env();
    let _path = EnvGuard::set("MS_DATABASE_PATH", "../../../etc/passwd");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
    let err_msg = format!("{}", result.unwrap_err());
    assert_that!(err_msg, contains_substring(".."));
}

#[test]
#[serial]
fn given_absolute_database_path_when_validate_then_error() {
    // Given
    let (_temp, _dir, _secret) = setup_valid_env();
    let _path = EnvGuard::set("MS_DATABASE_PATH", "/tmp/data.db");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_zero_pool_size_when_validate_then_error() {
    // Given
    let (_temp, _dir, _secret) = setup_valid_env();
    let _pool = EnvGuard::set("MS_DATABASE_MAX_CONNECTIONS", "0");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    let err_msg = format!("{}", result.unwrap_err());
    assert_that!(err_msg, contains_substring("database.max_connections"));
}

#[test]
#[serial]
fn given_relative_path_when_resolving_then_joined_to_config_dir() {
    // Given
    let (temp, _dir, _secret) = setup_valid_env();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(
        config.database_path().unwrap(),
        eq(&temp.path().join("gatekeeper.db"))
    );
    assert_that!(config.acquire_timeout(), eq(Duration::from_secs(5)));
}
