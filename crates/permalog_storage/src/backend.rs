//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for the journal.
///
/// Storage backends are **opaque byte stores**. They provide positioned
/// reads and writes and a durability barrier. The journal owns all frame
/// format interpretation - backends do not understand records or recovery.
///
/// # Contract
///
/// Every operation may be short, misdirected by a faulty layer underneath,
/// silently a no-op that still reports success, or erroring. Callers must
/// never conclude from a successful return code alone that the requested
/// transfer happened in full; persisted content is verified only by
/// checksummed decode on a later read.
///
/// - `read_at` returns *up to* `len` bytes; fewer means the store ended
/// - `write_at` returns the number of bytes accepted, which may be short
/// - `sync` guarantees previously accepted writes and file metadata are on
///   stable storage before it returns
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads up to `len` bytes starting at `offset`.
    ///
    /// A result shorter than `len` means the read ran off the end of the
    /// store. Reading entirely past the end yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns an error only for operational failures - the file cannot be
    /// read at all.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Writes `data` at `offset`, returning the number of bytes accepted.
    ///
    /// The count may be smaller than `data.len()` (a short write). Writing
    /// past the current end extends the store.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<usize>;

    /// Durability barrier.
    ///
    /// After this returns successfully, all previously accepted writes and
    /// the file metadata are guaranteed to survive process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the barrier fails; callers must then treat the
    /// preceding writes as not durable.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the current size of the storage in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;
}
