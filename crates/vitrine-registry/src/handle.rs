//! Per-call client handle.

use std::fmt;

use vitrine_core::RequestContext;

use crate::config::{AdminCredentials, EncryptionKey, RegistryClientConfig, TransportConfig};

/// Everything a wire client needs for one call.
///
/// A handle merges the process-wide [`RegistryClientConfig`] with the
/// caller's auth token. It is built fresh for every operation and owned by
/// that operation alone.
#[derive(Clone)]
pub struct RegistryClientHandle {
    transport: TransportConfig,
    encryption_key: Option<EncryptionKey>,
    credentials: Option<AdminCredentials>,
    auth_token: Option<String>,
}

impl RegistryClientHandle {
    /// Composes a handle from the config snapshot and request context.
    ///
    /// Admin credentials are attached only when the config carries them.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitrine_core::RequestContext;
    /// use vitrine_registry::{RegistryClientConfig, RegistryClientHandle, TransportConfig};
    ///
    /// let config = RegistryClientConfig::new(TransportConfig::new("10.0.0.5", 9292));
    /// let handle = RegistryClientHandle::new(&config, &RequestContext::with_token("tok"));
    ///
    /// assert_eq!(handle.auth_token(), Some("tok"));
    /// assert!(handle.credentials().is_none());
    /// ```
    #[must_use]
    pub fn new(config: &RegistryClientConfig, ctx: &RequestContext) -> Self {
        Self {
            transport: config.transport.clone(),
            encryption_key: config.encryption_key.clone(),
            credentials: config.credentials.clone(),
            auth_token: ctx.auth_token.clone(),
        }
    }

    /// Returns the transport parameters.
    #[must_use]
    pub const fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Returns true when the handle talks TLS.
    #[must_use]
    pub fn use_ssl(&self) -> bool {
        self.transport.use_ssl()
    }

    /// Returns the location encryption key.
    #[must_use]
    pub const fn encryption_key(&self) -> Option<&EncryptionKey> {
        self.encryption_key.as_ref()
    }

    /// Returns the admin credentials, if resolved.
    #[must_use]
    pub const fn credentials(&self) -> Option<&AdminCredentials> {
        self.credentials.as_ref()
    }

    /// Returns the caller's auth token.
    #[must_use]
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

impl fmt::Debug for RegistryClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryClientHandle")
            .field("transport", &self.transport)
            .field("encryption_key", &self.encryption_key)
            .field("credentials", &self.credentials)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
