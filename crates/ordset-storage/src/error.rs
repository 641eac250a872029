//! Storage-engine error types.
//!
//! Engine-level failures are described by [`StorageError`] and converted to
//! [`OrdSetError`] at the backend boundary: lifecycle failures become
//! `StoreUnavailable`, everything else `StoreOperationFailed`.

use ordset_core::OrdSetError;
use thiserror::Error;

/// Errors raised by the storage engines themselves.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database failed to open.
    #[error("Failed to open database at '{path}': {message}")]
    OpenFailed { path: String, message: String },

    /// Column family not found (should never happen if DB opened correctly).
    #[error("Column family '{name}' not found")]
    ColumnFamilyNotFound { name: String },

    /// The store has been closed.
    #[error("Store is closed")]
    Closed,

    /// Write operation failed.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Read operation failed.
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// A stored row could not be decoded.
    #[error("Corrupted row in {cf}: {details}")]
    Corrupted { cf: String, details: String },

    /// The engine rejected a command.
    #[error("{command}: {message}")]
    CommandRejected { command: String, message: String },
}

impl StorageError {
    pub fn rejected(command: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::CommandRejected {
            command: command.into(),
            message: message.into(),
        }
    }
}

impl From<StorageError> for OrdSetError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::OpenFailed { .. } | StorageError::Closed => {
                OrdSetError::unavailable(err.to_string())
            }
            StorageError::ColumnFamilyNotFound { .. } => OrdSetError::unavailable(err.to_string()),
            StorageError::WriteFailed(msg) => OrdSetError::operation_failed("write", msg),
            StorageError::ReadFailed(msg) => OrdSetError::operation_failed("read", msg),
            StorageError::Corrupted { cf, details } => {
                OrdSetError::operation_failed(format!("decode {cf}"), details)
            }
            StorageError::CommandRejected { command, message } => {
                OrdSetError::operation_failed(command, message)
            }
        }
    }
}
