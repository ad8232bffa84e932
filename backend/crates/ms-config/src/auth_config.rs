use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

pub const MIN_JWT_SECRET_LENGTH: usize = 32;

pub const MIN_TOKEN_TTL_SECS: u64 = 60;
pub const MAX_TOKEN_TTL_SECS: u64 = 86_400;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 1800;

pub const MAX_LEEWAY_SECS: u64 = 300;

pub const SUPPORTED_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];
const DEFAULT_ALGORITHM: &str = "HS256";

/// Bearer token settings.
/// The secret is required; there is no unauthenticated mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric signing secret (>= 32 chars)
    pub jwt_secret: Option<String>,
    /// HS256, HS384 or HS512
    pub algorithm: String,
    /// Lifetime of issued tokens
    pub token_ttl_secs: u64,
    /// Clock skew tolerated on expiry
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            algorithm: String::from(DEFAULT_ALGORITHM),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            leeway_secs: 0,
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        match &self.jwt_secret {
            None => {
                return Err(ConfigError::auth(
                    "auth.jwt_secret is required (set MS_AUTH_JWT_SECRET)",
                ));
            }
            Some(secret) if secret.len() < MIN_JWT_SECRET_LENGTH => {
                return Err(ConfigError::auth(format!(
                    "auth.jwt_secret must be at least {} characters",
                    MIN_JWT_SECRET_LENGTH
                )));
            }
            Some(_) => {}
        }

        if !SUPPORTED_ALGORITHMS
            .iter()
            .any(|a| a.eq_ignore_ascii_case(&self.algorithm))
        {
            return Err(ConfigError::auth(format!(
                "auth.algorithm must be one of {:?}, got '{}'",
                SUPPORTED_ALGORITHMS, self.algorithm
            )));
        }

        if self.token_ttl_secs < MIN_TOKEN_TTL_SECS || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::auth(format!(
                "auth.token_ttl_secs must be {}-{}, got {}",
                MIN_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS, self.token_ttl_secs
            )));
        }

        if self.leeway_secs > MAX_LEEWAY_SECS {
            return Err(ConfigError::auth(format!(
                "auth.leeway_secs must be at most {}, got {}",
                MAX_LEEWAY_SECS, self.leeway_secs
            )));
        }

        Ok(())
    }
}
