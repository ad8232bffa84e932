use crate::connection::tenant_marker;
use crate::{DbError, IsolationPolicy, Result};

use error_location::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use sqlx::Connection;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};

/// Where the shared pool lives and how large it may grow
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
    }
}

/// Build the process-wide pool.
///
/// Migrations run first on a standalone connection because the isolation
/// triggers can only be created once their tables exist. Every pooled
/// connection then gets the policy installed in `after_connect`; the release and
/// acquire hooks make sure no marker outlives a lease, even when the lease was
/// dropped without an explicit release.
pub async fn create_pool(config: &PoolConfig, policy: IsolationPolicy) -> Result<SqlitePool> {
    if let Some(parent) = config.database_path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DbError::Initialization {
                message: format!("Failed to create database directory: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
    }

    let options = config.connect_options();

    run_migrations(&options).await?;

    let policy = Arc::new(policy);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(config.acquire_timeout)
        .after_connect(move |conn, _meta| {
            let policy = Arc::clone(&policy);
            Box::pin(async move {
                policy
                    .install(conn)
                    .await
                    .map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;
                debug!("Installed isolation policy on new connection");
                Ok(())
            })
        })
        .before_acquire(|conn, _meta| {
            Box::pin(async move {
                match tenant_marker::current(conn).await {
                    Ok(None) => Ok(true),
                    Ok(Some(stale)) => {
                        warn!("Discarding idle connection still bound to tenant '{stale}'");
                        metrics::counter!("scope_connections_discarded_total", "hook" => "before_acquire")
                            .increment(1);
                        Ok(false)
                    }
                    Err(e) => {
                        warn!("Discarding idle connection, marker unreadable: {e}");
                        Ok(false)
                    }
                }
            })
        })
        .after_release(|conn, _meta| {
            Box::pin(async move {
                match tenant_marker::clear(conn).await {
                    Ok(()) => Ok(true),
                    Err(e) => {
                        warn!("Discarding released connection, marker clear failed: {e}");
                        metrics::counter!("scope_connections_discarded_total", "hook" => "after_release")
                            .increment(1);
                        Ok(false)
                    }
                }
            })
        })
        .connect_with(options)
        .await?;

    info!(
        "Database pool ready at {} (max {} connections)",
        config.database_path.display(),
        config.max_connections.max(1)
    );

    Ok(pool)
}

async fn run_migrations(options: &SqliteConnectOptions) -> Result<()> {
    let mut conn = SqliteConnection::connect_with(options).await?;

    sqlx::migrate!("./migrations")
        .run(&mut conn)
        .await
        .map_err(|e| DbError::Migration {
            message: format!("Migration failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    conn.close().await?;

    Ok(())
}
