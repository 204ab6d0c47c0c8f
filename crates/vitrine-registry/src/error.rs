//! Error types for registry operations.

use std::path::PathBuf;
use thiserror::Error;
use vitrine_core::LocationError;

/// Errors that can occur during registry configuration or operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Connection configuration is missing or malformed.
    ///
    /// A missing option and an invalid option are reported as the same kind.
    #[error("Bad registry connection configuration: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// Failed to connect to registry.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The registry rejected the caller's credentials.
    #[error("Not authorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// The caller is not allowed to perform the operation.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Image or membership not found in registry.
    #[error("Not found: {resource}")]
    NotFound {
        /// Resource that did not resolve.
        resource: String,
    },

    /// The request conflicts with the registry's current state.
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// HTTP error from registry.
    #[error("HTTP error from registry: {status} - {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// TLS material could not be loaded.
    #[error("Invalid TLS material: {message}")]
    Tls {
        /// Error message.
        message: String,
    },

    /// File I/O error.
    #[error("File I/O error at {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// URL string.
        url: String,
    },

    /// Location encryption or decryption failed.
    #[error(transparent)]
    Location(#[from] LocationError),
}

impl RegistryError {
    /// Returns true if the error means the requested resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Maps a non-success HTTP status to the matching error kind.
    pub(crate) fn from_status(status: u16, resource: &str, message: String) -> Self {
        match status {
            401 => Self::Unauthorized { message },
            403 => Self::Forbidden { message },
            404 => Self::NotFound {
                resource: resource.to_string(),
            },
            409 => Self::Conflict { message },
            _ => Self::Http { status, message },
        }
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
                source: err,
            }
        } else if err.is_status() {
            let status = err.status().map_or(0, |s| s.as_u16());
            Self::Http {
                status,
                message: err.to_string(),
            }
        } else {
            Self::Http {
                status: 0,
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json { source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_configuration() {
        let err = RegistryError::Configuration {
            message: "Configuration option was not valid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Bad registry connection configuration: Configuration option was not valid"
        );
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            RegistryError::from_status(401, "img", String::new()),
            RegistryError::Unauthorized { .. }
        ));
        assert!(matches!(
            RegistryError::from_status(403, "img", String::new()),
            RegistryError::Forbidden { .. }
        ));
        assert!(RegistryError::from_status(404, "image img-1", String::new()).is_not_found());
        assert!(matches!(
            RegistryError::from_status(409, "img", String::new()),
            RegistryError::Conflict { .. }
        ));
        assert!(matches!(
            RegistryError::from_status(500, "img", "boom".to_string()),
            RegistryError::Http { status: 500, .. }
        ));
    }

    #[test]
    fn test_error_display_not_found() {
        let err = RegistryError::from_status(404, "image img-1", String::new());
        assert_eq!(err.to_string(), "Not found: image img-1");
    }

    #[test]
    fn test_location_error_is_transparent() {
        let err: RegistryError = LocationError::Truncated.into();
        assert_eq!(err.to_string(), "encrypted location is truncated");
    }
}
