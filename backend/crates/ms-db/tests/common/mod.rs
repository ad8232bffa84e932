#![allow(dead_code)]

use ms_core::SecurityContext;
use ms_db::{DbError, IsolationPolicy, PoolConfig, TenantScopeManager};

use std::time::Duration;

use tempfile::TempDir;

/// Scope manager over a fresh on-disk database.
///
/// The TempDir must outlive the manager.
pub async fn create_test_manager(max_connections: u32) -> (TenantScopeManager, TempDir) {
    create_test_manager_with_timeout(max_connections, Duration::from_secs(5)).await
}

pub async fn create_test_manager_with_timeout(
    max_connections: u32,
    acquire_timeout: Duration,
) -> (TenantScopeManager, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = PoolConfig {
        database_path: temp_dir.path().join("gatekeeper.db"),
        max_connections,
        acquire_timeout,
    };

    let manager = TenantScopeManager::connect(&config, IsolationPolicy::default())
        .await
        .unwrap();

    (manager, temp_dir)
}

pub fn context(tenant_id: &str) -> SecurityContext {
    SecurityContext::try_new(format!("user-of-{tenant_id}"), tenant_id, 0).unwrap()
}

/// Insert `count` clients for `tenant_id` through a scope bound to that tenant
pub async fn seed_clients(manager: &TenantScopeManager, tenant_id: &str, count: usize) {
    let ctx = context(tenant_id);
    let tenant = tenant_id.to_string();

    manager
        .with_scope(&ctx, |conn| {
            Box::pin(async move {
                for i in 0..count {
                    sqlx::query("INSERT INTO clients (id, tenant_id, name) VALUES (?, ?, ?)")
                        .bind(format!("{tenant}-client-{i}"))
                        .bind(&tenant)
                        .bind(format!("Client {i}"))
                        .execute(&mut **conn)
                        .await?;
                }
                Ok::<_, DbError>(())
            })
        })
        .await
        .unwrap();
}

/// Tenant ids of every client row a scope sees under the plain table name
pub async fn visible_client_tenants(
    manager: &TenantScopeManager,
    ctx: Option<&SecurityContext>,
) -> Vec<String> {
    manager
        .with_optional_scope(ctx, |conn| {
            Box::pin(async move {
                let rows = sqlx::query_scalar::<_, String>("SELECT tenant_id FROM clients")
                    .fetch_all(&mut **conn)
                    .await?;
                Ok::<_, DbError>(rows)
            })
        })
        .await
        .unwrap()
}
