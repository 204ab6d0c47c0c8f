//! Process-wide settings consumed by the resolver.
//!
//! Settings are layered with `figment`: built-in defaults, then an optional
//! YAML file, then `VITRINE_`-prefixed environment variables.
//!
//! ```yaml
//! registry_host: 10.0.0.5
//! registry_port: 9292
//! registry_client_protocol: https
//! registry_client_ca_file: /etc/vitrine/ca.pem
//! auth_strategy: keystone
//! admin_user: vitrine
//! ```

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};

/// Default registry address.
pub const DEFAULT_REGISTRY_HOST: &str = "0.0.0.0";

/// Default registry port.
pub const DEFAULT_REGISTRY_PORT: u16 = 9191;

/// Default client protocol.
pub const DEFAULT_PROTOCOL: &str = "http";

/// Default request timeout in seconds. Zero disables the timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Default authentication strategy.
pub const DEFAULT_AUTH_STRATEGY: &str = "noauth";

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "VITRINE_";

/// Environment variable whose presence forces the keystone strategy.
pub const AUTH_URL_ENV: &str = "OS_AUTH_URL";

/// Default values for every option that has one.
///
/// Secrets and file paths have no default and are therefore absent here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDefaults {
    /// Address of the registry server.
    pub registry_host: String,
    /// Port the registry server listens on.
    pub registry_port: u16,
    /// `http` or `https`.
    pub registry_client_protocol: String,
    /// Skip certificate verification.
    pub registry_client_insecure: bool,
    /// Request timeout in seconds.
    pub registry_client_timeout: u64,
    /// Configured authentication strategy.
    pub auth_strategy: String,
}

impl Default for SettingsDefaults {
    fn default() -> Self {
        Self {
            registry_host: DEFAULT_REGISTRY_HOST.to_string(),
            registry_port: DEFAULT_REGISTRY_PORT,
            registry_client_protocol: DEFAULT_PROTOCOL.to_string(),
            registry_client_insecure: false,
            registry_client_timeout: DEFAULT_TIMEOUT_SECS,
            auth_strategy: DEFAULT_AUTH_STRATEGY.to_string(),
        }
    }
}

/// Builds the layered settings source.
///
/// A `path` that does not exist contributes nothing.
#[must_use]
pub fn load(path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(SettingsDefaults::default()));

    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }

    figment.merge(Env::prefixed(ENV_PREFIX))
}

/// Connection options, extracted by `resolve_connection`.
///
/// Host and port carry no serde default: a source without them is a
/// configuration error. String options accept any scalar, so an all-digit
/// key or a numeric host name survives the env and YAML parsers.
#[derive(Deserialize)]
pub(crate) struct ConnectionSettings {
    #[serde(deserialize_with = "scalar_string")]
    pub registry_host: String,
    pub registry_port: u16,
    #[serde(default = "default_protocol", deserialize_with = "scalar_string")]
    pub registry_client_protocol: String,
    #[serde(default, deserialize_with = "optional_scalar_path")]
    pub registry_client_key_file: Option<PathBuf>,
    #[serde(default, deserialize_with = "optional_scalar_path")]
    pub registry_client_cert_file: Option<PathBuf>,
    #[serde(default, deserialize_with = "optional_scalar_path")]
    pub registry_client_ca_file: Option<PathBuf>,
    #[serde(default)]
    pub registry_client_insecure: bool,
    #[serde(default = "default_timeout")]
    pub registry_client_timeout: u64,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub metadata_encryption_key: Option<String>,
}

/// Administrative identity options, read by `resolve_credentials`.
///
/// Every key is read on its own: an unreadable value drops only that key.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct CredentialSettings {
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
    pub admin_tenant_name: Option<String>,
    pub auth_url: Option<String>,
    pub auth_strategy: String,
    pub auth_region: Option<String>,
}

impl CredentialSettings {
    /// Reads each credential key from `figment`.
    pub fn read(figment: &Figment) -> Self {
        Self {
            admin_user: lookup_string(figment, "admin_user"),
            admin_password: lookup_string(figment, "admin_password"),
            admin_tenant_name: lookup_string(figment, "admin_tenant_name"),
            auth_url: lookup_string(figment, "auth_url"),
            auth_strategy: lookup_string(figment, "auth_strategy")
                .unwrap_or_else(default_strategy),
            auth_region: lookup_string(figment, "auth_region"),
        }
    }
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            admin_user: None,
            admin_password: None,
            admin_tenant_name: None,
            auth_url: None,
            auth_strategy: default_strategy(),
            auth_region: None,
        }
    }
}

/// A scalar setting read as text.
///
/// Env and YAML parsing turn `123456` into an integer and `true` into a
/// boolean; string options take them back verbatim.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::UInt(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(Scalar::into_string)
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<Scalar>::deserialize(deserializer).map(|s| s.map(Scalar::into_string))
}

fn optional_scalar_path<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PathBuf>, D::Error> {
    optional_scalar_string(deserializer).map(|s| s.map(PathBuf::from))
}

/// Reads one string option. Absent keys are `None`; unreadable values are
/// logged and treated as absent.
fn lookup_string(figment: &Figment, key: &str) -> Option<String> {
    let value = figment.find_value(key).ok()?;
    match value.deserialize::<Scalar>() {
        Ok(scalar) => Some(scalar.into_string()),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring unreadable credential setting");
            None
        }
    }
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_string()
}

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_strategy() -> String {
    DEFAULT_AUTH_STRATEGY.to_string()
}
