pub mod isolation_policy;
pub mod pool_builder;
pub mod scoped_connection;
pub mod tenant_marker;
pub mod tenant_scope_manager;
