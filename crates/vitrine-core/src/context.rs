//! Per-request caller identity.

use serde::{Deserialize, Serialize};

/// Identity of the caller on whose behalf a registry operation runs.
///
/// Only the auth token is forwarded to the registry; the remaining fields
/// describe the caller for logging and for upstream policy decisions.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Authentication token presented to the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// User identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Tenant (project) identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Roles granted to the caller.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Whether the caller has administrative rights.
    #[serde(default)]
    pub is_admin: bool,
}

impl RequestContext {
    /// Creates an anonymous context without a token.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates a context carrying the given auth token.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitrine_core::RequestContext;
    ///
    /// let ctx = RequestContext::with_token("abc");
    /// assert_eq!(ctx.auth_token(), Some("abc"));
    /// assert!(!ctx.is_admin);
    /// ```
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            auth_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Sets the user identifier.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the tenant identifier.
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Adds a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Marks the caller as administrator.
    #[must_use]
    pub const fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Returns the auth token, if any.
    #[must_use]
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

// Tokens must not leak into logs.
impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .field("tenant", &self.tenant)
            .field("roles", &self.roles)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_no_token() {
        let ctx = RequestContext::anonymous();
        assert!(ctx.auth_token().is_none());
        assert!(ctx.roles.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let ctx = RequestContext::with_token("t")
            .with_user("alice")
            .with_tenant("demo")
            .with_role("member")
            .admin();

        assert_eq!(ctx.user.as_deref(), Some("alice"));
        assert_eq!(ctx.tenant.as_deref(), Some("demo"));
        assert_eq!(ctx.roles, vec!["member".to_string()]);
        assert!(ctx.is_admin);
    }

    #[test]
    fn test_debug_redacts_token() {
        let ctx = RequestContext::with_token("super-secret");
        let rendered = format!("{ctx:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
