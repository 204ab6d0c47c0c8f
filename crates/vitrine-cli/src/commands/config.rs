//! Configuration inspection commands.
//!
//! Prints what the resolver produced from the layered settings, with every
//! secret reduced to a presence flag.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use vitrine_registry::{resolve_connection, resolve_credentials_from_env, RegistryClientConfig};

use super::{load_settings, GlobalArgs};

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved connection and credentials
    Show {
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct TransportView {
    url: String,
    use_ssl: bool,
    insecure: bool,
    key_file: Option<String>,
    cert_file: Option<String>,
    ca_file: Option<String>,
    timeout_secs: Option<u64>,
    encrypted_locations: bool,
}

#[derive(Debug, Serialize)]
struct CredentialsView {
    strategy: String,
    user: Option<String>,
    password_set: bool,
    tenant: Option<String>,
    auth_url: Option<String>,
    region: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConfigView {
    transport: TransportView,
    credentials: Option<CredentialsView>,
}

impl From<&RegistryClientConfig> for ConfigView {
    fn from(config: &RegistryClientConfig) -> Self {
        let t = &config.transport;
        let path = |p: &Option<std::path::PathBuf>| p.as_ref().map(|p| p.display().to_string());

        Self {
            transport: TransportView {
                url: t.base_url(),
                use_ssl: t.use_ssl(),
                insecure: t.insecure,
                key_file: path(&t.key_file),
                cert_file: path(&t.cert_file),
                ca_file: path(&t.ca_file),
                timeout_secs: t.timeout.map(|d| d.as_secs()),
                encrypted_locations: config.encryption_key.is_some(),
            },
            credentials: config.credentials.as_ref().map(|c| CredentialsView {
                strategy: c.strategy.to_string(),
                user: c.user.clone(),
                password_set: c.password.is_some(),
                tenant: c.tenant.clone(),
                auth_url: c.auth_url.clone(),
                region: c.region.clone(),
            }),
        }
    }
}

/// Runs a config subcommand.
///
/// # Errors
///
/// Returns an error if the connection settings are missing or malformed.
pub fn run(global: &GlobalArgs, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show { json } => {
            let figment = load_settings(global)?;
            let config = resolve_connection(&figment)
                .context("Failed to resolve registry connection")?
                .with_credentials(resolve_credentials_from_env(&figment));

            let view = ConfigView::from(&config);
            if *json {
                super::print_json(&view)
            } else {
                print!("{}", serde_yaml::to_string(&view)?);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_registry::{
        AdminCredentials, AuthStrategy, EncryptionKey, Protocol, TransportConfig,
    };

    #[test]
    fn test_view_hides_secrets() {
        let config = RegistryClientConfig::new(
            TransportConfig::new("10.0.0.5", 9292)
                .with_protocol(Protocol::Https)
                .with_timeout_secs(0),
        )
        .with_encryption_key(EncryptionKey::new("key-material"))
        .with_credentials(AdminCredentials::new(AuthStrategy::Keystone).with_user("admin", "hunter2"));

        let view = ConfigView::from(&config);
        let rendered = serde_yaml::to_string(&view).unwrap();

        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("key-material"));
        assert!(rendered.contains("https://10.0.0.5:9292"));
        assert!(rendered.contains("strategy: keystone"));
        assert!(rendered.contains("password_set: true"));
        assert!(view.transport.timeout_secs.is_none());
    }
}
