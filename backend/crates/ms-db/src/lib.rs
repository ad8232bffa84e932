pub mod connection;
pub mod error;

pub use connection::isolation_policy::{Column, IsolationPolicy, TableLayout};
pub use connection::pool_builder::{PoolConfig, create_pool};
pub use connection::scoped_connection::ScopedConnection;
pub use connection::tenant_scope_manager::{ReleaseOutcome, TenantScopeManager};
pub use error::{DbError, Result};
