use serde::{Deserialize, Serialize};

/// JWT claims carried by every bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user_id)
    pub sub: String,
    /// Tenant identifier
    pub tenant_id: String,
    /// Issued at timestamp (Unix)
    pub iat: i64,
    /// Expiration timestamp (Unix)
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
        issued_at: i64,
        expires_at: i64,
    ) -> Self {
        Self {
            sub: user_id.into(),
            tenant_id: tenant_id.into(),
            iat: issued_at,
            exp: expires_at,
        }
    }

    /// `now >= exp` counts as expired
    pub fn is_expired_at(&self, now: i64, leeway_secs: i64) -> bool {
        now >= self.exp.saturating_add(leeway_secs)
    }
}
