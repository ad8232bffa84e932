use std::fmt;

/// Identity a request is charged against.
///
/// Client address is used before authentication; tenant and user keys only
/// once a context has been bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RateLimitKey {
    ClientAddress(String),
    Tenant(String),
    User(String),
}

impl RateLimitKey {
    pub fn client(address: impl Into<String>) -> Self {
        Self::ClientAddress(address.into())
    }

    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self::Tenant(tenant_id.into())
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User(user_id.into())
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientAddress(address) => write!(f, "ip:{address}"),
            Self::Tenant(tenant_id) => write!(f, "tenant:{tenant_id}"),
            Self::User(user_id) => write!(f, "user:{user_id}"),
        }
    }
}
