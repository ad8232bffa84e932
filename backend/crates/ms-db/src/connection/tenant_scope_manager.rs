use crate::connection::tenant_marker;
use crate::{DbError, IsolationPolicy, PoolConfig, Result, ScopedConnection, create_pool};

use ms_core::SecurityContext;

use error_location::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, error, warn};
use sqlx::SqlitePool;

/// What happened to a connection when its lease ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Marker cleared; connection is back in the pool
    Returned,
    /// Marker could not be cleared; connection was closed instead
    Discarded,
}

/// Binds security contexts to pooled connections.
///
/// The marker is set on the leased connection as its first statement and is
/// gone before the connection can be leased again. A lease that cannot be
/// bound is never handed out.
#[derive(Clone)]
pub struct TenantScopeManager {
    pool: SqlitePool,
    acquire_timeout: Duration,
}

impl TenantScopeManager {
    pub fn new(pool: SqlitePool, acquire_timeout: Duration) -> Self {
        Self {
            pool,
            acquire_timeout,
        }
    }

    /// Build the pool (migrations + isolation hooks) and wrap it
    pub async fn connect(config: &PoolConfig, policy: IsolationPolicy) -> Result<Self> {
        let pool = create_pool(config, policy).await?;
        Ok(Self::new(pool, config.acquire_timeout))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Lease one connection and bind it to `context`.
    ///
    /// With no context the lease is anonymous: the marker is cleared, so
    /// isolated tables read empty and reject writes.
    pub async fn acquire(&self, context: Option<&SecurityContext>) -> Result<ScopedConnection> {
        let mut conn = self.pool.acquire().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => {
                metrics::counter!("scope_acquire_failures_total", "reason" => "pool_exhausted")
                    .increment(1);
                DbError::PoolExhausted {
                    timeout: self.acquire_timeout,
                    location: ErrorLocation::from(Location::caller()),
                }
            }
            other => DbError::from(other),
        })?;

        let bound = match context {
            Some(context) => tenant_marker::set(&mut conn, context.tenant_id()).await,
            None => tenant_marker::clear(&mut conn).await.map_err(|e| {
                DbError::ScopeBindingFailed {
                    tenant_id: String::new(),
                    message: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                }
            }),
        };

        if let Err(e) = bound {
            // Never return a connection whose marker state is unknown
            drop(conn.detach());
            metrics::counter!("scope_acquire_failures_total", "reason" => "binding_failed")
                .increment(1);
            error!("Tenant scope binding failed: {e}");
            return Err(e);
        }

        let tenant_id = context.map(|c| c.tenant_id().to_string());
        debug!("Scope acquired for tenant {:?}", tenant_id);

        Ok(ScopedConnection::new(conn, tenant_id))
    }

    /// End a lease: clear the marker, or discard the connection if that fails.
    ///
    /// The marker is read back first. If it no longer matches the tenant the
    /// lease was bound to, the connection is discarded and the lease fails with
    /// [`DbError::ScopeTampered`], so whatever ran on it must not be trusted.
    pub async fn release(&self, mut scoped: ScopedConnection) -> Result<ReleaseOutcome> {
        let observed = tenant_marker::current(&mut scoped).await;
        let leased_for = scoped.leased_at().elapsed();
        metrics::histogram!("scope_lease_duration_seconds").record(leased_for.as_secs_f64());

        let expected = scoped.tenant_id().map(str::to_string);
        let mismatch = match observed {
            Ok(observed) if observed == expected => None,
            Ok(observed) => Some(format!("marker read back as {observed:?}")),
            Err(e) => Some(format!("marker unreadable: {e}")),
        };

        if let Some(message) = mismatch {
            error!("Discarding connection, tenant scope {expected:?} was not intact: {message}");
            metrics::counter!("scope_connections_discarded_total", "hook" => "tampered")
                .increment(1);
            drop(scoped.into_inner().detach());
            return Err(DbError::ScopeTampered {
                expected,
                message,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let cleared = tenant_marker::clear(&mut scoped).await;
        let conn = scoped.into_inner();
        match cleared {
            Ok(()) => {
                drop(conn);
                Ok(ReleaseOutcome::Returned)
            }
            Err(e) => {
                warn!("Discarding connection after failed marker clear: {e}");
                metrics::counter!("scope_connections_discarded_total", "hook" => "release")
                    .increment(1);
                drop(conn.detach());
                Ok(ReleaseOutcome::Discarded)
            }
        }
    }

    /// Run `work` on a connection bound to `context`, releasing it on every exit path.
    ///
    /// If the scope cannot be bound, `work` never runs. If the marker was changed
    /// while `work` ran, its result is dropped and the scope error returned.
    pub async fn with_scope<F, T, E>(
        &self,
        context: &SecurityContext,
        work: F,
    ) -> std::result::Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut ScopedConnection) -> BoxFuture<'c, std::result::Result<T, E>>,
        E: From<DbError>,
    {
        self.with_optional_scope(Some(context), work).await
    }

    /// [`Self::with_scope`] for routes that may run without an identity
    pub async fn with_optional_scope<F, T, E>(
        &self,
        context: Option<&SecurityContext>,
        work: F,
    ) -> std::result::Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut ScopedConnection) -> BoxFuture<'c, std::result::Result<T, E>>,
        E: From<DbError>,
    {
        let mut scoped = self.acquire(context).await?;

        let result = work(&mut scoped).await;

        self.release(scoped).await?;

        result
    }
}
