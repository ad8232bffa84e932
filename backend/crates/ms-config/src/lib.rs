mod auth_config;
mod config;
mod database_config;
mod error;
mod log_level;
mod logging_config;
mod rate_limit_config;
mod server_config;

pub use auth_config::{
    AuthConfig, DEFAULT_TOKEN_TTL_SECS, MAX_LEEWAY_SECS, MAX_TOKEN_TTL_SECS,
    MIN_JWT_SECRET_LENGTH, MIN_TOKEN_TTL_SECS, SUPPORTED_ALGORITHMS,
};
pub use config::Config;
pub use database_config::{
    DatabaseConfig, MAX_ACQUIRE_TIMEOUT_SECS, MAX_POOL_CONNECTIONS, MIN_ACQUIRE_TIMEOUT_SECS,
    MIN_POOL_CONNECTIONS,
};
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use rate_limit_config::{
    LimiterAlgorithm, MAX_RATE_LIMIT_REQUESTS, MAX_RATE_LIMIT_WINDOW_SECS,
    MIN_RATE_LIMIT_REQUESTS, MIN_RATE_LIMIT_WINDOW_SECS, RateLimitConfig,
};
pub use server_config::ServerConfig;

const CONFIG_DIR_ENV: &str = "MS_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".ms";
const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const MIN_PORT: u16 = 1024;
const DEFAULT_DATABASE_FILENAME: &str = "gatekeeper.db";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";

#[cfg(test)]
mod tests;
