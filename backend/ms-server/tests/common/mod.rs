#![allow(dead_code)]

//! Test infrastructure for ms-server pipeline tests

use ms_auth::{
    RateLimitAlgorithm, RateLimitConfig, RateLimiterFactory, SigningAlgorithm,
    TenantContextBinder, TokenCodec,
};
use ms_core::SecurityContext;
use ms_db::{DbError, IsolationPolicy, PoolConfig, TenantScopeManager};
use ms_server::{AppState, Gatekeeper};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use tempfile::TempDir;

pub const TEST_SECRET: &[u8] = b"pipeline-test-secret-at-least-32-bytes";

pub const CLIENT_ADDR: &str = "203.0.113.7:41000";

/// Knobs for the gatekeeper under test
pub struct TestOptions {
    pub ip_max_requests: u32,
    pub tenant_max_requests: u32,
    pub window_secs: u64,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            ip_max_requests: 100,
            tenant_max_requests: 1000,
            window_secs: 60,
            max_connections: 4,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// App state over a fresh on-disk database; the TempDir must outlive it
pub struct TestApp {
    pub state: AppState,
    pub codec: Arc<TokenCodec>,
    _dir: TempDir,
}

impl TestApp {
    pub fn scopes(&self) -> &TenantScopeManager {
        self.state.gatekeeper.scopes()
    }

    /// Token valid for five minutes from now
    pub fn token(&self, user_id: &str, tenant_id: &str) -> String {
        self.codec
            .issue(user_id, tenant_id, Duration::from_secs(300))
            .unwrap()
    }

    /// Token that expired an hour ago
    pub fn expired_token(&self, user_id: &str, tenant_id: &str) -> String {
        let issued = chrono::Utc::now().timestamp() - 3600;
        self.codec
            .issue_at(user_id, tenant_id, Duration::from_secs(60), issued)
            .unwrap()
    }
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(TestOptions::default()).await
}

pub async fn create_test_app_with(options: TestOptions) -> TestApp {
    let dir = TempDir::new().unwrap();
    let pool_config = PoolConfig {
        database_path: dir.path().join("gatekeeper.db"),
        max_connections: options.max_connections,
        acquire_timeout: options.acquire_timeout,
    };
    let scopes = TenantScopeManager::connect(&pool_config, IsolationPolicy::default())
        .await
        .unwrap();

    let codec = Arc::new(TokenCodec::new(TEST_SECRET, SigningAlgorithm::HS256));
    let binder = TenantContextBinder::new(Arc::clone(&codec));

    let limiter = |max_requests| {
        RateLimiterFactory::new(RateLimitConfig {
            max_requests,
            window_secs: options.window_secs,
            algorithm: RateLimitAlgorithm::FixedWindow,
        })
        .create()
    };

    let gatekeeper = Gatekeeper::new(
        limiter(options.ip_max_requests),
        limiter(options.tenant_max_requests),
        binder,
        scopes,
    );

    TestApp {
        state: AppState::new(gatekeeper),
        codec,
        _dir: dir,
    }
}

/// Request from the default client address, optionally with a raw Authorization header
pub fn request(method: &str, uri: &str, authorization: Option<&str>) -> Request<Body> {
    request_from(CLIENT_ADDR, method, uri, authorization, Body::empty())
}

pub fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    request(method, uri, Some(&format!("Bearer {token}")))
}

pub fn json_request(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    let mut request = request_from(
        CLIENT_ADDR,
        "POST",
        uri,
        Some(&format!("Bearer {token}")),
        Body::from(body.to_string()),
    );
    request.headers_mut().insert(
        header::CONTENT_TYPE,
        "application/json".parse().unwrap(),
    );
    request
}

pub fn request_from(
    client: &str,
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: Body,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    let mut request = builder.body(body).unwrap();
    let addr: SocketAddr = client.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub fn context(tenant_id: &str) -> SecurityContext {
    SecurityContext::try_new(format!("user-of-{tenant_id}"), tenant_id, 0).unwrap()
}

/// Insert orders for `tenant_id` through a scope bound to that tenant
pub async fn seed_orders(app: &TestApp, tenant_id: &str, descriptions: &[&str]) {
    let ctx = context(tenant_id);
    let tenant = tenant_id.to_string();
    let descriptions: Vec<String> = descriptions.iter().map(|d| d.to_string()).collect();

    app.scopes()
        .with_scope(&ctx, |conn| {
            Box::pin(async move {
                for (i, description) in descriptions.iter().enumerate() {
                    sqlx::query(
                        "INSERT INTO orders (id, tenant_id, description, total_cents) VALUES (?, ?, ?, ?)",
                    )
                    .bind(format!("{tenant}-order-{i}"))
                    .bind(&tenant)
                    .bind(description)
                    .bind(1000 * (i as i64 + 1))
                    .execute(&mut **conn)
                    .await?;
                }
                Ok::<_, DbError>(())
            })
        })
        .await
        .unwrap();
}

pub async fn seed_client(app: &TestApp, tenant_id: &str, client_id: &str) {
    let ctx = context(tenant_id);
    let tenant = tenant_id.to_string();
    let client_id = client_id.to_string();

    app.scopes()
        .with_scope(&ctx, |conn| {
            Box::pin(async move {
                sqlx::query("INSERT INTO clients (id, tenant_id, name) VALUES (?, ?, ?)")
                    .bind(&client_id)
                    .bind(&tenant)
                    .bind("Workshop client")
                    .execute(&mut **conn)
                    .await?;
                Ok::<_, DbError>(())
            })
        })
        .await
        .unwrap();
}
