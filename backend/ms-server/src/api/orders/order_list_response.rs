use crate::OrderDto;

use serde::Serialize;

/// List of orders response
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderDto>,
}
