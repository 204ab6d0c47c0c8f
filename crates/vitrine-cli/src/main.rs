//! Vitrine CLI - Command-line interface for the image-metadata registry.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine_cli=info,vitrine_registry=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Images(command) => commands::images::run(&cli.global, command).await,
        Commands::Members(command) => commands::members::run(&cli.global, command).await,
        Commands::Config(command) => commands::config::run(&cli.global, &command),
        Commands::Version => {
            println!("vitrine {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
