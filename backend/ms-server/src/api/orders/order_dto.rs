use serde::Serialize;
use sqlx::FromRow;

/// Order row as read through the tenant-scoped view
#[derive(Debug, Serialize, FromRow)]
pub struct OrderDto {
    pub id: String,
    pub tenant_id: String,
    pub client_id: Option<String>,
    pub description: String,
    pub total_cents: i64,
    pub status: String,
    pub created_at: String,
}
