use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// What is being built or repaired (required)
    pub description: String,

    /// Order total in cents
    #[serde(default)]
    pub total_cents: i64,

    /// Client the order belongs to; must be visible to the caller's tenant
    #[serde(default)]
    pub client_id: Option<String>,
}
