use crate::Gatekeeper;
use crate::error::Result as ServerErrorResult;

use ms_auth::{
    RateLimitAlgorithm, RateLimitConfig, RateLimiter, RateLimiterFactory, SigningAlgorithm,
    TenantContextBinder, TokenCodec,
};
use ms_config::{AuthConfig, Config, ConfigError, LimiterAlgorithm};
use ms_db::{IsolationPolicy, PoolConfig, TenantScopeManager};

use std::str::FromStr;
use std::sync::Arc;

use log::info;

/// Shared application state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub gatekeeper: Gatekeeper,
}

impl AppState {
    pub fn new(gatekeeper: Gatekeeper) -> Self {
        Self { gatekeeper }
    }

    /// Wire limiters, binder and scope manager from validated configuration
    pub async fn from_config(config: &Config) -> ServerErrorResult<Self> {
        let codec = Arc::new(token_codec(&config.auth)?);
        info!("JWT: {} verification enabled", codec.algorithm());
        let binder = TenantContextBinder::new(codec);

        let ip_limiter = limiter(config, config.rate_limit.max_requests);
        let tenant_limiter = limiter(config, config.rate_limit.tenant_max_requests);

        let pool_config = PoolConfig {
            database_path: config.database_path()?,
            max_connections: config.database.max_connections,
            acquire_timeout: config.acquire_timeout(),
        };
        let scopes = TenantScopeManager::connect(&pool_config, IsolationPolicy::default()).await?;

        Ok(Self::new(Gatekeeper::new(
            ip_limiter,
            tenant_limiter,
            binder,
            scopes,
        )))
    }
}

/// Codec for the configured secret and algorithm
pub fn token_codec(auth: &AuthConfig) -> ServerErrorResult<TokenCodec> {
    let secret = auth
        .jwt_secret
        .as_deref()
        .ok_or_else(|| ConfigError::auth("jwt_secret is required"))?;
    let algorithm = SigningAlgorithm::from_str(&auth.algorithm)?;

    Ok(TokenCodec::with_leeway(
        secret.as_bytes(),
        algorithm,
        auth.leeway_secs,
    ))
}

fn limiter(config: &Config, max_requests: u32) -> Arc<dyn RateLimiter> {
    let algorithm = match config.rate_limit.algorithm {
        LimiterAlgorithm::FixedWindow => RateLimitAlgorithm::FixedWindow,
        LimiterAlgorithm::Gcra => RateLimitAlgorithm::Gcra,
    };

    RateLimiterFactory::new(RateLimitConfig {
        max_requests,
        window_secs: config.rate_limit.window_secs,
        algorithm,
    })
    .create()
}
