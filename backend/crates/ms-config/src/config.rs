use crate::{
    AuthConfig, CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, DatabaseConfig, LoggingConfig, RateLimitConfig, ServerConfig,
};

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Defaults, then `config.toml` from [`Config::config_dir`] (created if
    /// absent), then `MS_*` variables. Unvalidated; see [`Config::validate`].
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir).map_err(|source| ConfigError::Io {
            path: config_dir.clone(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILENAME);
        let mut config = match config_path.try_exists() {
            Ok(true) => Self::load_toml(&config_path)?,
            Ok(false) => Self::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: config_path,
                    source,
                });
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Priority: MS_CONFIG_DIR env var > ./.ms/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => std::env::current_dir()
                .map(|cwd| cwd.join(DEFAULT_CONFIG_DIR))
                .map_err(|e| ConfigError::config(format!("no usable working directory: {e}"))),
        }
    }

    /// First failing section wins; run once at startup
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.auth.validate()?;
        self.rate_limit.validate()?;
        self.database.validate()?;
        self.server.validate()
    }

    /// Absolute path to the database file
    pub fn database_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.database.path))
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.database.acquire_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log configuration summary (NEVER logs secrets).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  server: {}:{}", self.server.host, self.server.port);
        info!(
            "  database: {} (pool {}, acquire timeout {}s)",
            self.database.path, self.database.max_connections, self.database.acquire_timeout_secs
        );
        info!(
            "  auth: {} (ttl {}s, leeway {}s, secret {})",
            self.auth.algorithm.to_uppercase(),
            self.auth.token_ttl_secs,
            self.auth.leeway_secs,
            if self.auth.jwt_secret.is_some() {
                "set"
            } else {
                "missing"
            }
        );
        info!(
            "  rate_limit: {}/{}s per client, {}/{}s per tenant ({:?})",
            self.rate_limit.max_requests,
            self.rate_limit.window_secs,
            self.rate_limit.tenant_max_requests,
            self.rate_limit.window_secs,
            self.rate_limit.algorithm
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        let Self {
            server,
            database,
            auth,
            rate_limit,
            logging,
        } = self;

        env_override("MS_SERVER_HOST", &mut server.host);
        env_override("MS_SERVER_PORT", &mut server.port);

        env_override("MS_DATABASE_PATH", &mut database.path);
        env_override("MS_DATABASE_MAX_CONNECTIONS", &mut database.max_connections);
        env_override(
            "MS_DATABASE_ACQUIRE_TIMEOUT_SECS",
            &mut database.acquire_timeout_secs,
        );

        env_override_some("MS_AUTH_JWT_SECRET", &mut auth.jwt_secret);
        env_override("MS_AUTH_ALGORITHM", &mut auth.algorithm);
        env_override("MS_AUTH_TOKEN_TTL_SECS", &mut auth.token_ttl_secs);
        env_override("MS_AUTH_LEEWAY_SECS", &mut auth.leeway_secs);

        env_override("MS_RATE_LIMIT_MAX_REQUESTS", &mut rate_limit.max_requests);
        env_override("MS_RATE_LIMIT_WINDOW_SECS", &mut rate_limit.window_secs);
        env_override("MS_RATE_LIMIT_ALGORITHM", &mut rate_limit.algorithm);
        env_override(
            "MS_RATE_LIMIT_TENANT_MAX_REQUESTS",
            &mut rate_limit.tenant_max_requests,
        );

        env_override("MS_LOG_LEVEL", &mut logging.level);
        env_flag("MS_LOG_COLORED", &mut logging.colored);
        env_override_some("MS_LOG_FILE", &mut logging.file);
    }
}

/// Replace `target` with the parsed value of `var`; unparseable values are ignored
/// and left for `validate()` to judge the file/default value instead.
fn env_override<T: FromStr>(var: &str, target: &mut T) {
    if let Some(parsed) = std::env::var(var).ok().and_then(|v| v.parse().ok()) {
        *target = parsed;
    }
}

fn env_override_some(var: &str, target: &mut Option<String>) {
    if let Ok(value) = std::env::var(var) {
        *target = Some(value);
    }
}

/// "true"/"1" enable, anything else disables
fn env_flag(var: &str, target: &mut bool) {
    if let Ok(value) = std::env::var(var) {
        *target = matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1");
    }
}
