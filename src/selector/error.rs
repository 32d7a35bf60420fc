//! Selector Errors
//!
//! TigerStyle: Explicit error types with context.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors from backend selection.
///
/// A disabled backend is not an error, see [`super::Selection::Disabled`].
#[derive(Debug, Error)]
pub enum SelectError {
    /// Driver kind is empty, unknown, or has no registered driver
    #[error("Flow backend driver '{driver}' not supported for backend '{backend}'")]
    UnsupportedDriver {
        /// Driver kind read from configuration
        driver: String,
        /// Backend identity being selected
        backend: String,
    },

    /// Registered driver failed to construct its storage
    #[error("Can't connect to {family} server: {source}")]
    Connect {
        /// Engine family of the driver
        family: String,
        /// Backend identity being selected
        backend: String,
        /// Error reported by the driver
        #[source]
        source: StorageError,
    },
}

impl SelectError {
    /// True for misconfiguration, which retrying cannot fix.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnsupportedDriver { .. })
    }

    /// True when the driver could not construct its storage.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    /// Backend identity the error is about.
    #[must_use]
    pub fn backend(&self) -> &str {
        match self {
            Self::UnsupportedDriver { backend, .. } | Self::Connect { backend, .. } => backend,
        }
    }
}

/// Errors from driver registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("driver kind '{0}' is reserved")]
    ReservedKind(String),

    #[error("driver kind cannot be empty")]
    EmptyKind,

    #[error("driver kind '{0}' is already registered")]
    AlreadyRegistered(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_connect_error_keeps_source() {
        let err = SelectError::Connect {
            family: "OrientDB".to_string(),
            backend: "graph1".to_string(),
            source: StorageError::connection("refused"),
        };

        assert_eq!(
            err.to_string(),
            "Can't connect to OrientDB server: connection error: refused"
        );
        assert!(err.is_connection());
        assert!(!err.is_configuration());
        assert_eq!(err.backend(), "graph1");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unsupported_driver_message() {
        let err = SelectError::UnsupportedDriver {
            driver: String::new(),
            backend: "b".to_string(),
        };
        assert_eq!(err.to_string(), "Flow backend driver '' not supported for backend 'b'");
        assert!(err.is_configuration());
    }
}
