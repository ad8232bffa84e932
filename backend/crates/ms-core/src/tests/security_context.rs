use crate::{CoreError, MAX_TENANT_ID_LENGTH, SecurityContext};

use googletest::prelude::*;

#[test]
fn given_user_and_tenant_when_building_context_then_fields_are_exposed() {
    let context = SecurityContext::try_new("user-1", "tenant-a", 1_700_000_000).unwrap();

    assert_that!(context.user_id(), eq("user-1"));
    assert_that!(context.tenant_id(), eq("tenant-a"));
    assert_that!(context.issued_at(), eq(1_700_000_000));
}

#[test]
fn given_empty_user_when_building_context_then_sub_is_rejected() {
    let result = SecurityContext::try_new("", "tenant-a", 0);

    assert!(matches!(result, Err(CoreError::Validation { field: "sub", .. })));
}

#[test]
fn given_blank_tenant_when_building_context_then_tenant_is_rejected() {
    let result = SecurityContext::try_new("user-1", "   ", 0);

    let error = result.unwrap_err();
    assert_that!(error.field(), eq("tenant_id"));
}

#[test]
fn given_oversized_tenant_when_building_context_then_rejected() {
    let tenant = "t".repeat(MAX_TENANT_ID_LENGTH + 1);

    let result = SecurityContext::try_new("user-1", tenant, 0);

    assert_that!(result, err(anything()));
}

#[test]
fn given_multibyte_tenant_then_limit_counts_bytes() {
    // 64 two-byte characters fill the limit exactly, 65 go over it
    let at_limit = "é".repeat(MAX_TENANT_ID_LENGTH / 2);
    let over_limit = "é".repeat(MAX_TENANT_ID_LENGTH / 2 + 1);

    assert_that!(SecurityContext::try_new("user-1", at_limit, 0), ok(anything()));

    let error = SecurityContext::try_new("user-1", over_limit, 0).unwrap_err();
    assert_that!(error.to_string(), contains_substring("exceeds 128 bytes"));
}
