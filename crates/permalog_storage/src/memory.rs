//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend stores all data in memory and is suitable for:
/// - Unit tests
/// - Ephemeral journals that don't need persistence
///
/// Writing past the current end zero-fills the gap, matching how a sparse
/// file behaves when a write lands beyond EOF.
///
/// # Example
///
/// ```rust
/// use permalog_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.write_at(0, b"test data").unwrap();
/// assert_eq!(backend.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of all data in the backend.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.data.read();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);

        if start >= data.len() {
            return Ok(Vec::new());
        }

        let end = start.saturating_add(len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    fn write_at(&mut self, offset: u64, new_data: &[u8]) -> StorageResult<usize> {
        if new_data.is_empty() {
            return Ok(0);
        }

        let mut data = self.data.write();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let end = start + new_data.len();

        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(new_data);

        Ok(new_data.len())
    }

    fn sync(&mut self) -> StorageResult<()> {
        // Nothing to persist
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.data().is_empty());
    }

    #[test]
    fn memory_write_and_read() {
        let mut backend = InMemoryBackend::new();

        assert_eq!(backend.write_at(0, b"hello").unwrap(), 5);
        assert_eq!(backend.write_at(5, b" world").unwrap(), 6);
        assert_eq!(backend.size().unwrap(), 11);

        assert_eq!(backend.read_at(0, 5).unwrap(), b"hello");
        assert_eq!(backend.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn memory_read_past_end_is_short() {
        let mut backend = InMemoryBackend::new();
        backend.write_at(0, b"hello").unwrap();

        assert_eq!(backend.read_at(3, 10).unwrap(), b"lo");
        assert!(backend.read_at(10, 5).unwrap().is_empty());
    }

    #[test]
    fn memory_write_past_end_zero_fills() {
        let mut backend = InMemoryBackend::new();
        backend.write_at(4, b"ab").unwrap();

        assert_eq!(backend.size().unwrap(), 6);
        assert_eq!(backend.read_at(0, 6).unwrap(), b"\0\0\0\0ab");
    }

    #[test]
    fn memory_overwrite_in_place() {
        let mut backend = InMemoryBackend::new();
        backend.write_at(0, b"aaaaaa").unwrap();
        backend.write_at(2, b"bb").unwrap();

        assert_eq!(backend.size().unwrap(), 6);
        assert_eq!(backend.read_at(0, 6).unwrap(), b"aabbaa");
    }

    #[test]
    fn memory_empty_write() {
        let mut backend = InMemoryBackend::new();
        backend.write_at(0, b"x").unwrap();

        assert_eq!(backend.write_at(1, b"").unwrap(), 0);
        assert_eq!(backend.size().unwrap(), 1);
    }

    #[test]
    fn memory_empty_read() {
        let mut backend = InMemoryBackend::new();
        backend.write_at(0, b"hello").unwrap();

        assert!(backend.read_at(2, 0).unwrap().is_empty());
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(b"preloaded".to_vec());
        assert_eq!(backend.size().unwrap(), 9);
        assert_eq!(backend.read_at(0, 9).unwrap(), b"preloaded");
    }

    #[test]
    fn memory_sync_succeeds() {
        let mut backend = InMemoryBackend::new();
        backend.write_at(0, b"data").unwrap();
        assert!(backend.sync().is_ok());
    }
}
