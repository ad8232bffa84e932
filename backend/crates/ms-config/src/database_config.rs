use crate::{ConfigError, ConfigErrorResult, DEFAULT_DATABASE_FILENAME};

use std::path::Path;

use serde::Deserialize;

pub const MIN_POOL_CONNECTIONS: u32 = 1;
pub const MAX_POOL_CONNECTIONS: u32 = 64;
const DEFAULT_POOL_CONNECTIONS: u32 = 5;

pub const MIN_ACQUIRE_TIMEOUT_SECS: u64 = 1;
pub const MAX_ACQUIRE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// File name relative to the config directory
    pub path: String,
    pub max_connections: u32,
    /// How long a request waits for a pooled connection
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: String::from(DEFAULT_DATABASE_FILENAME),
            max_connections: DEFAULT_POOL_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        // Must stay inside the config dir
        if Path::new(&self.path).is_absolute() || self.path.contains("..") {
            return Err(ConfigError::database(
                "database.path must be relative and cannot contain '..'",
            ));
        }

        if self.max_connections < MIN_POOL_CONNECTIONS || self.max_connections > MAX_POOL_CONNECTIONS
        {
            return Err(ConfigError::database(format!(
                "database.max_connections must be {}-{}, got {}",
                MIN_POOL_CONNECTIONS, MAX_POOL_CONNECTIONS, self.max_connections
            )));
        }

        if self.acquire_timeout_secs < MIN_ACQUIRE_TIMEOUT_SECS
            || self.acquire_timeout_secs > MAX_ACQUIRE_TIMEOUT_SECS
        {
            return Err(ConfigError::database(format!(
                "database.acquire_timeout_secs must be {}-{}, got {}",
                MIN_ACQUIRE_TIMEOUT_SECS, MAX_ACQUIRE_TIMEOUT_SECS, self.acquire_timeout_secs
            )));
        }

        Ok(())
    }
}
