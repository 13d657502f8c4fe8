//! Error types for journal operations.

use permalog_storage::StorageError;
use std::io;
use thiserror::Error;

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;

/// Errors that can occur in journal operations.
///
/// These are all *operational* failures. Corruption of on-disk data is not
/// represented here: the recovery scan bounds corruption by truncating the
/// valid prefix and the operation still succeeds (see the crate docs).
#[derive(Debug, Error)]
pub enum JournalError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A write made no forward progress after a retry.
    ///
    /// The journal's tail cursor is unchanged; any bytes that did land
    /// beyond the old tail are ignored by every future read.
    #[error("write stalled at offset {offset} with {remaining} bytes unwritten")]
    WriteStalled {
        /// Offset the stalled transfer targeted.
        offset: u64,
        /// Bytes of the frame still untransferred.
        remaining: usize,
    },

    /// A record payload exceeds the configured maximum length.
    #[error("record of {len} bytes exceeds maximum {max}")]
    RecordTooLarge {
        /// The rejected payload length.
        len: usize,
        /// The configured maximum.
        max: usize,
    },

    /// The journal has been closed.
    #[error("journal is closed")]
    Closed,
}
