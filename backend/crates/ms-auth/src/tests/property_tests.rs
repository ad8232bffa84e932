use crate::tests::{NOW, TEST_SECRET};
use crate::{AuthError, SigningAlgorithm, TokenCodec};

use std::time::Duration;

use proptest::prelude::*;

// =========================================================================
// Property-Based Tests - Token Codec
// =========================================================================

proptest! {
    #[test]
    fn given_any_identity_when_issued_and_verified_then_claims_round_trip(
        user in "[a-zA-Z0-9-]{1,40}",
        tenant in "[a-zA-Z0-9_-]{1,64}",
        ttl in 1u64..86_400,
        elapsed in 0u64..86_400,
    ) {
        prop_assume!(elapsed < ttl);
        let codec = TokenCodec::new(TEST_SECRET, SigningAlgorithm::HS256);
        let token = codec.issue_at(&user, &tenant, Duration::from_secs(ttl), NOW).unwrap();

        let claims = codec.verify_at(&token, NOW + elapsed as i64).unwrap();

        prop_assert_eq!(claims.sub, user);
        prop_assert_eq!(claims.tenant_id, tenant);
        prop_assert_eq!(claims.exp, NOW + ttl as i64);
    }

    #[test]
    fn given_any_foreign_secret_when_verified_then_invalid_signature(
        secret in "[a-zA-Z0-9]{32,64}",
        tenant in "[a-z]{1,16}",
    ) {
        prop_assume!(secret.as_bytes() != TEST_SECRET);
        let token = TokenCodec::new(secret.as_bytes(), SigningAlgorithm::HS256)
            .issue_at("user", &tenant, Duration::from_secs(600), NOW)
            .unwrap();

        let result = TokenCodec::new(TEST_SECRET, SigningAlgorithm::HS256).verify_at(&token, NOW);

        prop_assert!(
            matches!(result, Err(AuthError::InvalidSignature { .. })),
            "expected InvalidSignature"
        );
    }

    #[test]
    fn given_arbitrary_text_when_verified_then_never_panics(input in ".{0,200}") {
        let codec = TokenCodec::new(TEST_SECRET, SigningAlgorithm::HS256);

        prop_assert!(codec.verify_at(&input, NOW).is_err());
    }
}
