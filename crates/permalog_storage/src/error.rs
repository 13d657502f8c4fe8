//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An injected hard failure from a test decorator.
    ///
    /// Production backends never return this variant; fault-injecting
    /// wrappers use it so tests can tell a scripted failure apart from a
    /// real OS error.
    #[error("injected fault: {0}")]
    Faulted(String),
}
