//! Error types for ordset-core.
//!
//! This module defines the central error type [`OrdSetError`] shared by the
//! facade and every backend, along with the [`OrdSetResult<T>`] alias.
//!
//! Store errors are never caught or downgraded on the way up: a backend
//! failure reaches the caller exactly as the backend reported it.
//!
//! # Examples
//!
//! ```rust
//! use ordset_core::OrdSetError;
//!
//! let err = OrdSetError::invalid_argument("member", "null is not a valid member");
//! assert!(err.to_string().contains("member"));
//! assert!(err.is_invalid_argument());
//! ```

use thiserror::Error;

/// Top-level error type for ordered-set operations.
#[derive(Debug, Error)]
pub enum OrdSetError {
    /// An argument failed validation before anything reached the store.
    ///
    /// # When This Occurs
    ///
    /// - A null or structured (array/object) value used as a member
    /// - NaN used as a score, bound, or weight
    /// - More weights than sets, or the same set named twice
    /// - A pipeline stage applied to documents that lack its input field
    ///
    /// Empty key or member lists are NOT errors; those operations return
    /// their trivial result instead.
    #[error("Invalid argument: {field} - {message}")]
    InvalidArgument {
        /// Name of the offending argument
        field: String,
        /// Description of the violation
        message: String,
    },

    /// The store could not be reached.
    ///
    /// # When This Occurs
    ///
    /// - The store was closed or never opened
    /// - The database directory could not be opened or is locked
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store rejected a command, or at least one command of a batch failed.
    ///
    /// A failed batch may still have mutated the keys whose commands
    /// succeeded: every key of a batch is attempted independently.
    #[error("Store operation '{operation}' failed: {message}")]
    StoreOperationFailed {
        /// The command or batch that failed
        operation: String,
        /// Store-provided detail
        message: String,
    },

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Encoding or decoding of stored data failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl OrdSetError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a store-operation error.
    pub fn operation_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreOperationFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a store-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// True for [`OrdSetError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// True for [`OrdSetError::StoreUnavailable`].
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// True for [`OrdSetError::StoreOperationFailed`].
    pub fn is_operation_failed(&self) -> bool {
        matches!(self, Self::StoreOperationFailed { .. })
    }
}

impl From<serde_json::Error> for OrdSetError {
    fn from(err: serde_json::Error) -> Self {
        OrdSetError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for OrdSetError {
    fn from(err: config::ConfigError) -> Self {
        OrdSetError::ConfigError(err.to_string())
    }
}

/// Result type alias for ordered-set operations.
pub type OrdSetResult<T> = Result<T, OrdSetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrdSetError::invalid_argument("weights", "more weights than sets");
        assert_eq!(
            err.to_string(),
            "Invalid argument: weights - more weights than sets"
        );
    }

    #[test]
    fn test_operation_failed_display() {
        let err = OrdSetError::operation_failed("ZREM", "wrong type");
        assert!(err.to_string().contains("ZREM"));
        assert!(err.to_string().contains("wrong type"));
        assert!(err.is_operation_failed());
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_from_serde_json() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: OrdSetError = bad.into();
        assert!(matches!(err, OrdSetError::SerializationError(_)));
    }
}
