//! Error types for Vitrine core operations.
//!
//! This module defines the error types used throughout the `vitrine-core` crate.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Vitrine core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A filter or property argument could not be parsed.
    #[error("Invalid key=value pair '{input}': {reason}")]
    InvalidKeyValue {
        /// The offending input.
        input: String,
        /// Reason for the parse failure.
        reason: String,
    },

    /// Unknown sort direction.
    #[error("Invalid sort direction '{0}', expected 'asc' or 'desc'")]
    InvalidSortDir(String),
}
