//! Portal Provider (C9): an injected collaborator that mints one-shot,
//! role-scoped web-portal URLs on demand. The core only knows this trait;
//! the HTTPS staff portal itself is an external collaborator out of scope
//! here (spec section 1).

use crate::model::Role;

#[derive(Debug, Clone)]
pub struct PortalLink {
    pub url: String,
    pub expires: i64,
    pub role: Role,
}

/// Absence of an implementation (no provider configured) is represented by
/// simply not holding one; callers treat `None` as "portal not configured"
/// rather than modeling a no-op provider.
#[async_trait::async_trait]
pub trait PortalProvider: Send + Sync {
    async fn generate_link(&self, role: Role, requester_name: &str) -> anyhow::Result<PortalLink>;
}
