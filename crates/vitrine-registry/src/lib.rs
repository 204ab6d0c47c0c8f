//! # Vitrine Registry
//!
//! Client factory for the image-metadata registry service.
//!
//! This crate turns process settings into a ready-to-use registry client and
//! exposes the registry operations on behalf of callers holding a
//! [`vitrine_core::RequestContext`].
//!
//! ## Features
//!
//! - **Layered settings**: defaults, YAML file and environment via `figment`
//! - **Connection resolution**: host, port, TLS mode and certificate material
//! - **Credential resolution**: admin identity and auth strategy, forced to
//!   keystone whenever an auth endpoint is configured
//! - **Location encryption**: the shared metadata key is threaded into every
//!   client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vitrine_core::{ImageFilters, RequestContext};
//! use vitrine_registry::{settings, Registry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let figment = settings::load(Some("vitrine.yaml".as_ref()));
//!     let registry = Registry::from_settings(&figment)?;
//!
//!     let ctx = RequestContext::with_token("tok-123");
//!     let images = registry.list_images(&ctx, &ImageFilters::new()).await?;
//!     println!("{} images", images.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   settings (figment)
//!         │ resolve_connection / resolve_credentials
//!         ▼
//!   RegistryClientConfig ──┐
//!                          ├─► Registry::build_client ─► RegistryClientHandle
//!   RequestContext ────────┘                                   │
//!                                                              ▼
//!                               ClientConnector::connect ─► RegistryApi (HTTP)
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod client;
mod config;
mod error;
mod handle;
mod registry;
pub mod settings;

pub use api::{ClientConnector, RegistryApi};
pub use client::{HttpConnector, HttpRegistryClient, AUTH_TOKEN_HEADER, PURGE_PROPS_HEADER};
pub use config::{
    resolve_connection, resolve_credentials, resolve_credentials_from_env, resolve_strategy,
    AdminCredentials, AuthStrategy, EncryptionKey, Protocol, RegistryClientConfig,
    TransportConfig,
};
pub use error::RegistryError;
pub use handle::RegistryClientHandle;
pub use registry::Registry;
