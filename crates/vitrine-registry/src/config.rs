//! Connection and credential resolution.
//!
//! Process settings are turned into one immutable [`RegistryClientConfig`]
//! in two independent steps:
//!
//! - [`resolve_connection`] reads transport options and the metadata
//!   encryption key. Problems here are hard misconfiguration.
//! - [`resolve_credentials`] reads the administrative identity and derives
//!   the authentication strategy. It never fails; a registry may run with no
//!   admin identity at all.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use figment::error::Kind;
use figment::Figment;
use secrecy::{ExposeSecret, SecretString};
use vitrine_core::{LocationCipher, LocationError};

use crate::error::RegistryError;
use crate::settings::{
    ConnectionSettings, CredentialSettings, AUTH_URL_ENV, DEFAULT_REGISTRY_HOST,
    DEFAULT_REGISTRY_PORT, DEFAULT_TIMEOUT_SECS,
};

/// Wire protocol used to reach the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl Protocol {
    /// Maps a configured protocol name.
    ///
    /// Only `https` (in any case) selects TLS; every other value means plain
    /// HTTP.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitrine_registry::Protocol;
    ///
    /// assert_eq!(Protocol::from_config("HTTPS"), Protocol::Https);
    /// assert_eq!(Protocol::from_config("ftp"), Protocol::Http);
    /// ```
    #[must_use]
    pub fn from_config(value: &str) -> Self {
        if value.eq_ignore_ascii_case("https") {
            Self::Https
        } else {
            Self::Http
        }
    }

    /// Returns the URL scheme.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Resolved transport parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Wire protocol.
    pub protocol: Protocol,

    /// Registry host name or address.
    pub host: String,

    /// Registry port.
    pub port: u16,

    /// Path to the client private key.
    pub key_file: Option<PathBuf>,

    /// Path to the client certificate.
    pub cert_file: Option<PathBuf>,

    /// Path to the CA certificate bundle.
    pub ca_file: Option<PathBuf>,

    /// Skip server certificate verification.
    pub insecure: bool,

    /// Request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    /// Creates a plain-HTTP transport with the default timeout.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitrine_registry::TransportConfig;
    ///
    /// let transport = TransportConfig::new("registry.local", 9191);
    /// assert!(!transport.use_ssl());
    /// assert_eq!(transport.base_url(), "http://registry.local:9191");
    /// ```
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol: Protocol::Http,
            host: host.into(),
            port,
            key_file: None,
            cert_file: None,
            ca_file: None,
            insecure: false,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Sets the protocol.
    #[must_use]
    pub const fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets the CA certificate path.
    #[must_use]
    pub fn with_ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_file = Some(path.into());
        self
    }

    /// Sets the client certificate and key paths.
    #[must_use]
    pub fn with_client_cert(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.cert_file = Some(cert.into());
        self.key_file = Some(key.into());
        self
    }

    /// Sets whether certificate verification is skipped.
    #[must_use]
    pub const fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Sets the timeout from a number of seconds; zero disables it.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = timeout_from_secs(secs);
        self
    }

    /// Returns true when requests go over TLS.
    #[must_use]
    pub fn use_ssl(&self) -> bool {
        self.protocol == Protocol::Https
    }

    /// Returns the registry base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{}://[{}]:{}", self.protocol.scheme(), self.host, self.port)
        } else {
            format!("{}://{}:{}", self.protocol.scheme(), self.host, self.port)
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_HOST, DEFAULT_REGISTRY_PORT)
    }
}

const fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

/// Authentication strategy presented to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// No authentication.
    NoAuth,
    /// Keystone-backed token authentication.
    Keystone,
    /// Any other configured strategy, kept verbatim.
    Other(String),
}

impl AuthStrategy {
    /// Returns the strategy name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoAuth => "noauth",
            Self::Keystone => "keystone",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for AuthStrategy {
    fn from(value: &str) -> Self {
        match value {
            "noauth" => Self::NoAuth,
            "keystone" => Self::Keystone,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives the effective authentication strategy.
///
/// A configured auth endpoint, from settings or from the environment
/// override, forces [`AuthStrategy::Keystone`]. Otherwise the configured
/// default is used verbatim. Empty URLs count as absent.
///
/// # Examples
///
/// ```
/// use vitrine_registry::{resolve_strategy, AuthStrategy};
///
/// assert_eq!(
///     resolve_strategy("noauth", Some("http://keystone:5000/v3"), None),
///     AuthStrategy::Keystone
/// );
/// assert_eq!(
///     resolve_strategy("customstrategy", None, None),
///     AuthStrategy::Other("customstrategy".to_string())
/// );
/// ```
#[must_use]
pub fn resolve_strategy(
    configured_default: &str,
    auth_url: Option<&str>,
    env_auth_url: Option<&str>,
) -> AuthStrategy {
    let present = |url: Option<&str>| url.is_some_and(|u| !u.is_empty());

    if present(auth_url) || present(env_auth_url) {
        AuthStrategy::Keystone
    } else {
        AuthStrategy::from(configured_default)
    }
}

/// Administrative identity used for privileged registry calls.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    /// Admin user name.
    pub user: Option<String>,

    /// Admin password.
    pub password: Option<SecretString>,

    /// Admin tenant name.
    pub tenant: Option<String>,

    /// Auth service endpoint.
    pub auth_url: Option<String>,

    /// Effective authentication strategy.
    pub strategy: AuthStrategy,

    /// Auth service region.
    pub region: Option<String>,
}

impl AdminCredentials {
    /// Creates credentials with only a strategy set.
    #[must_use]
    pub const fn new(strategy: AuthStrategy) -> Self {
        Self {
            user: None,
            password: None,
            tenant: None,
            auth_url: None,
            strategy,
            region: None,
        }
    }

    /// Sets user and password.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Sets the tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Exposes the password for the wire client.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.expose_secret())
    }
}

/// Shared secret protecting image `location` values.
#[derive(Clone)]
pub struct EncryptionKey(SecretString);

impl EncryptionKey {
    /// Wraps a secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(SecretString::from(secret.into()))
    }

    /// Builds the location cipher for this key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub fn cipher(&self) -> Result<LocationCipher, LocationError> {
        LocationCipher::new(self.0.expose_secret())
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// Everything a client needs besides the caller's token.
///
/// Built once by the composition root and shared by reference. Re-resolution
/// produces a new value rather than mutating this one.
#[derive(Debug, Clone)]
pub struct RegistryClientConfig {
    /// Transport parameters.
    pub transport: TransportConfig,

    /// Location encryption key, if configured.
    pub encryption_key: Option<EncryptionKey>,

    /// Admin identity, present once credentials are resolved.
    pub credentials: Option<AdminCredentials>,
}

impl RegistryClientConfig {
    /// Creates a config without key or credentials.
    #[must_use]
    pub const fn new(transport: TransportConfig) -> Self {
        Self {
            transport,
            encryption_key: None,
            credentials: None,
        }
    }

    /// Sets the encryption key.
    #[must_use]
    pub fn with_encryption_key(mut self, key: EncryptionKey) -> Self {
        self.encryption_key = Some(key);
        self
    }

    /// Sets the admin credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: AdminCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Runs both resolution steps against `figment`, reading the auth
    /// endpoint override from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Configuration`] if the connection settings
    /// are missing or malformed.
    pub fn resolve(figment: &Figment) -> Result<Self, RegistryError> {
        let config = resolve_connection(figment)?;
        Ok(config.with_credentials(resolve_credentials_from_env(figment)))
    }
}

/// Resolves transport parameters and the encryption key.
///
/// The returned config carries no credentials.
///
/// # Errors
///
/// Returns [`RegistryError::Configuration`] when a required option is absent
/// or any option has the wrong type or format. Both cases are logged at error
/// level and yield the same error kind.
pub fn resolve_connection(figment: &Figment) -> Result<RegistryClientConfig, RegistryError> {
    let settings: ConnectionSettings = figment.extract().map_err(|e| {
        let message = if is_missing(&e) {
            "Could not find required configuration option"
        } else {
            "Configuration option was not valid"
        };
        tracing::error!(error = %e, "{message}");
        RegistryError::Configuration {
            message: message.to_string(),
        }
    })?;

    let protocol = Protocol::from_config(&settings.registry_client_protocol);
    let transport = TransportConfig {
        protocol,
        host: settings.registry_host,
        port: settings.registry_port,
        key_file: settings.registry_client_key_file,
        cert_file: settings.registry_client_cert_file,
        ca_file: settings.registry_client_ca_file,
        insecure: settings.registry_client_insecure,
        timeout: timeout_from_secs(settings.registry_client_timeout),
    };

    tracing::info!(
        host = %transport.host,
        port = transport.port,
        use_ssl = transport.use_ssl(),
        insecure = transport.insecure,
        encrypted_locations = settings.metadata_encryption_key.is_some(),
        "Resolved registry connection"
    );

    let mut config = RegistryClientConfig::new(transport);
    if let Some(key) = settings.metadata_encryption_key {
        config = config.with_encryption_key(EncryptionKey::new(key));
    }
    Ok(config)
}

/// Resolves the admin identity and effective strategy.
///
/// `env_auth_url` is the environment-style override for the auth endpoint.
/// Each option is read on its own, so an unreadable value drops only that
/// option and never hides a configured auth endpoint.
#[must_use]
pub fn resolve_credentials(figment: &Figment, env_auth_url: Option<&str>) -> AdminCredentials {
    let settings = CredentialSettings::read(figment);

    let strategy = resolve_strategy(
        &settings.auth_strategy,
        settings.auth_url.as_deref(),
        env_auth_url,
    );

    tracing::info!(
        strategy = %strategy,
        admin_user = settings.admin_user.is_some(),
        region = settings.auth_region.as_deref().unwrap_or_default(),
        "Resolved registry admin credentials"
    );

    AdminCredentials {
        user: settings.admin_user,
        password: settings.admin_password.map(SecretString::from),
        tenant: settings.admin_tenant_name,
        auth_url: settings.auth_url,
        strategy,
        region: settings.auth_region,
    }
}

/// Like [`resolve_credentials`], taking the override from `OS_AUTH_URL`.
#[must_use]
pub fn resolve_credentials_from_env(figment: &Figment) -> AdminCredentials {
    let env_auth_url = std::env::var(AUTH_URL_ENV).ok();
    resolve_credentials(figment, env_auth_url.as_deref())
}

fn is_missing(err: &figment::Error) -> bool {
    err.clone()
        .into_iter()
        .any(|e| matches!(e.kind, Kind::MissingField(_)))
}
