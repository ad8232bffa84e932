//! Reads and writes the per-connection tenant marker.
//!
//! Every write is read back before it is trusted.

use crate::{DbError, Result};

use error_location::ErrorLocation;

use std::panic::Location;

use sqlx::SqliteConnection;

const SET_MARKER: &str = "INSERT INTO temp.tenant_scope (slot, tenant_id) VALUES (1, ?)";
const CLEAR_MARKER: &str = "DELETE FROM temp.tenant_scope";
const READ_MARKER: &str = "SELECT tenant_id FROM temp.tenant_scope WHERE slot = 1";

/// Bind `tenant_id` to the connection
pub async fn set(conn: &mut SqliteConnection, tenant_id: &str) -> Result<()> {
    sqlx::query(SET_MARKER)
        .bind(tenant_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DbError::ScopeBindingFailed {
            tenant_id: tenant_id.to_string(),
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    match current(conn).await {
        Ok(Some(observed)) if observed == tenant_id => Ok(()),
        Ok(observed) => Err(DbError::ScopeBindingFailed {
            tenant_id: tenant_id.to_string(),
            message: format!("marker read back as {observed:?}"),
            location: ErrorLocation::from(Location::caller()),
        }),
        Err(e) => Err(DbError::ScopeBindingFailed {
            tenant_id: tenant_id.to_string(),
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Remove any marker; the connection is left in the deny-all state
pub async fn clear(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(CLEAR_MARKER).execute(&mut *conn).await?;

    match current(conn).await? {
        None => Ok(()),
        Some(stale) => Err(DbError::ScopeBindingFailed {
            tenant_id: stale,
            message: "marker survived clear".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// The marker the engine currently sees on this connection
pub async fn current(conn: &mut SqliteConnection) -> Result<Option<String>> {
    let marker = sqlx::query_scalar::<_, String>(READ_MARKER)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(marker)
}
