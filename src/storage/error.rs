//! Storage Errors
//!
//! TigerStyle: Explicit error types with context.

use thiserror::Error;

/// Errors from flow storage operations.
///
/// The contract does not classify driver failures beyond these shapes.
/// Callers branch on [`StorageError::NoStorageConfigured`] by equality.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Storage is disabled and an operation was attempted anyway
    #[error("No storage backend has been configured")]
    NoStorageConfigured,

    /// Backend could not be reached
    #[error("connection error: {message}")]
    Connection {
        /// Connection error message
        message: String,
    },

    /// Backend rejected or failed a read or write
    #[error("query error: {message}")]
    Query {
        /// Query error message
        message: String,
    },

    /// Input rejected before reaching the backend
    #[error("validation error: {message}")]
    Validation {
        /// Validation error message
        message: String,
    },

    /// Simulated fault (for DST)
    #[error("simulated fault: {fault_type}")]
    SimulatedFault {
        /// Type of simulated fault
        fault_type: String,
    },

    /// Internal error
    #[error("internal error: {message}")]
    Internal {
        /// Error message
        message: String,
    },
}

impl StorageError {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a simulated fault error.
    #[must_use]
    pub fn simulated_fault(fault_type: impl Into<String>) -> Self {
        Self::SimulatedFault {
            fault_type: fault_type.into(),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a read error (wraps query error for reads).
    #[must_use]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Query {
            message: format!("read: {}", message.into()),
        }
    }

    /// Create a write error (wraps query error for writes).
    #[must_use]
    pub fn write(message: impl Into<String>) -> Self {
        Self::Query {
            message: format!("write: {}", message.into()),
        }
    }

    /// True if this is the "no storage backend configured" sentinel.
    #[must_use]
    pub fn is_not_configured(&self) -> bool {
        *self == Self::NoStorageConfigured
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
