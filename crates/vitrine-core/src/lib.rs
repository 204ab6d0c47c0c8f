//! # Vitrine Core
//!
//! Core types for the Vitrine image-metadata registry client.
//!
//! This crate provides the records exchanged with the registry service and
//! the per-request identity that travels with every call:
//!
//! - [`ImageMeta`] - Full image metadata record
//! - [`ImageSummary`] - Lightweight listing entry
//! - [`ImageFilters`] - Query options for image listings
//! - [`ImageMember`] / [`SharedImage`] - Image membership records
//! - [`RequestContext`] - Per-request caller identity and auth token
//! - [`location`] - Symmetric encryption of image `location` values
//!
//! ## Example
//!
//! ```rust
//! use vitrine_core::{ImageFilters, ImageMeta, RequestContext};
//!
//! let ctx = RequestContext::with_token("tok-123");
//! assert_eq!(ctx.auth_token(), Some("tok-123"));
//!
//! let meta = ImageMeta::new()
//!     .with_name("ubuntu-24.04")
//!     .with_property("os_distro", "ubuntu");
//! assert_eq!(meta.name.as_deref(), Some("ubuntu-24.04"));
//!
//! let filters = ImageFilters::new().with_filter("status", "active").with_limit(20);
//! assert_eq!(filters.to_query().len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod image;
pub mod location;
pub mod member;

#[cfg(test)]
mod proptest_tests;

pub use context::RequestContext;
pub use error::{Error, Result};
pub use image::{ImageFilters, ImageMeta, ImageSummary, SortDir};
pub use location::{LocationCipher, LocationError};
pub use member::{ImageMember, MemberData, SharedImage};
