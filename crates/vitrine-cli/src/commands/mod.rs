//! CLI commands and argument parsing.

pub mod config;
pub mod images;
pub mod members;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use figment::Figment;
use serde::Serialize;
use vitrine_core::RequestContext;
use vitrine_registry::{settings, Registry};

/// Vitrine - image-metadata registry client
#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// YAML settings file
    #[arg(short, long, global = true, env = "VITRINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Auth token presented to the registry
    #[arg(long, global = true, env = "VITRINE_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Caller tenant, recorded in the request context
    #[arg(long, global = true, env = "VITRINE_TENANT")]
    pub tenant: Option<String>,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage image metadata
    #[command(subcommand)]
    Images(images::ImagesCommand),

    /// Manage image membership
    #[command(subcommand)]
    Members(members::MembersCommand),

    /// Inspect resolved configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),

    /// Print version information
    Version,
}

/// Loads layered settings, requiring an explicitly named file to exist.
pub fn load_settings(global: &GlobalArgs) -> Result<Figment> {
    if let Some(ref path) = global.config {
        anyhow::ensure!(
            path.is_file(),
            "Settings file not found: {}",
            path.display()
        );
    }
    Ok(settings::load(global.config.as_deref()))
}

/// Resolves settings and builds the registry facade.
pub fn connect(global: &GlobalArgs) -> Result<Registry> {
    let figment = load_settings(global)?;
    Registry::from_settings(&figment).context("Failed to configure registry client")
}

/// Builds the request context from global options.
pub fn context(global: &GlobalArgs) -> RequestContext {
    let mut ctx = RequestContext {
        auth_token: global.token.clone(),
        ..RequestContext::default()
    };
    if let Some(ref tenant) = global.tenant {
        ctx = ctx.with_tenant(tenant);
    }
    ctx
}

/// Parses `key=value` arguments for clap.
pub fn parse_pair(input: &str) -> Result<(String, String), String> {
    vitrine_core::image::parse_key_value(input).map_err(|e| e.to_string())
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
