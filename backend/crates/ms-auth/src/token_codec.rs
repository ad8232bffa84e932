use crate::{AuthError, Claims, Result as AuthErrorResult, SigningAlgorithm};

use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

/// Issues and verifies bearer tokens with a symmetric secret.
///
/// Verification is a pure function of the token, the supplied clock reading and
/// the configured secret; [`TokenCodec::verify`] reads the system clock and
/// delegates to [`TokenCodec::verify_at`].
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    algorithm: SigningAlgorithm,
    leeway_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: &[u8], algorithm: SigningAlgorithm) -> Self {
        Self::with_leeway(secret, algorithm, 0)
    }

    /// Create a codec tolerating `leeway_secs` of clock skew on expiry
    pub fn with_leeway(secret: &[u8], algorithm: SigningAlgorithm, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(algorithm.into());
        // Expiry is checked against the caller-supplied clock in verify_at
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            algorithm,
            leeway_secs: i64::try_from(leeway_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for `user_id` in `tenant_id` valid for `ttl` from now
    #[track_caller]
    pub fn issue(&self, user_id: &str, tenant_id: &str, ttl: Duration) -> AuthErrorResult<String> {
        self.issue_at(user_id, tenant_id, ttl, chrono::Utc::now().timestamp())
    }

    #[track_caller]
    pub fn issue_at(
        &self,
        user_id: &str,
        tenant_id: &str,
        ttl: Duration,
        now: i64,
    ) -> AuthErrorResult<String> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims::new(user_id, tenant_id, now, now.saturating_add(ttl_secs));

        encode(
            &Header::new(self.algorithm.into()),
            &claims,
            &self.encoding_key,
        )
        .map_err(|source| AuthError::Signing {
            source,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Verify a token against the system clock
    #[track_caller]
    pub fn verify(&self, token: &str) -> AuthErrorResult<Claims> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify signature, claim shape and expiry as of `now` (Unix seconds)
    #[track_caller]
    pub fn verify_at(&self, token: &str, now: i64) -> AuthErrorResult<Claims> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::InvalidSignature {
                        location: ErrorLocation::from(Location::caller()),
                    },
                    ErrorKind::ExpiredSignature => AuthError::Expired {
                        expired_at: now,
                        location: ErrorLocation::from(Location::caller()),
                    },
                    ErrorKind::MissingRequiredClaim(claim) => AuthError::Malformed {
                        message: format!("missing required claim '{claim}'"),
                        location: ErrorLocation::from(Location::caller()),
                    },
                    _ => AuthError::Malformed {
                        message: e.to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    },
                }
            })?;

        let claims = token_data.claims;

        if claims.is_expired_at(now, self.leeway_secs) {
            return Err(AuthError::Expired {
                expired_at: claims.exp,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(claims)
    }

    /// Get the algorithm being used (for logging/debugging)
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }
}
