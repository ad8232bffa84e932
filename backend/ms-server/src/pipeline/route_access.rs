/// Whether a route may run without an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// No credential needed; a presented credential must still be valid
    Public,
    /// A bound security context is mandatory
    TenantRequired,
}

impl RouteAccess {
    pub fn requires_context(&self) -> bool {
        matches!(self, Self::TenantRequired)
    }
}
