use crate::Result;
use crate::connection::tenant_marker;

use std::ops::{Deref, DerefMut};
use std::time::Instant;

use sqlx::Sqlite;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteConnection;

/// A pooled connection leased for exactly one request.
///
/// While leased, the engine-visible marker equals [`ScopedConnection::tenant_id`]
/// (or is absent for an anonymous lease). Handlers borrow it mutably for the
/// duration of the scope and never own it; only the scope manager can release it.
pub struct ScopedConnection {
    conn: PoolConnection<Sqlite>,
    tenant_id: Option<String>,
    leased_at: Instant,
}

impl ScopedConnection {
    pub(crate) fn new(conn: PoolConnection<Sqlite>, tenant_id: Option<String>) -> Self {
        Self {
            conn,
            tenant_id,
            leased_at: Instant::now(),
        }
    }

    /// Tenant this lease was bound to; `None` for anonymous (deny-all) leases
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Ask the engine which marker it currently enforces on this connection
    pub async fn current_marker(&mut self) -> Result<Option<String>> {
        tenant_marker::current(&mut self.conn).await
    }

    pub(crate) fn leased_at(&self) -> Instant {
        self.leased_at
    }

    pub(crate) fn into_inner(self) -> PoolConnection<Sqlite> {
        self.conn
    }
}

impl Deref for ScopedConnection {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for ScopedConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl std::fmt::Debug for ScopedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedConnection")
            .field("tenant_id", &self.tenant_id)
            .field("leased_for", &self.leased_at.elapsed())
            .finish()
    }
}
