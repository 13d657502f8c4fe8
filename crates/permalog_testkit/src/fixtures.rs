//! Test fixtures and journal helpers.
//!
//! Convenience wrappers for setting up tempdir-backed journals and the
//! deterministic payloads the crash scenarios are written against.

use crate::fault::{FaultBackend, FaultHandle};
use permalog_core::{Journal, JournalOptions};
use permalog_storage::FileBackend;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A journal file in a temporary directory with automatic cleanup.
///
/// The fixture owns the path, not a journal instance: crash tests open and
/// reopen the same file repeatedly, and the reopen is where recovery is
/// exercised.
pub struct TestJournal {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestJournal {
    /// Creates a fresh fixture with no journal file yet.
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_dir.path().join("journal.dat");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the journal directly over a file backend.
    #[must_use]
    pub fn open(&self) -> Journal {
        Journal::open(&self.path).expect("failed to open journal")
    }

    /// Reopens the journal, running recovery over whatever the previous
    /// session left on disk.
    #[must_use]
    pub fn reopen(&self) -> Journal {
        self.open()
    }

    /// Opens the journal through a fault-injecting decorator.
    ///
    /// Returns the journal and the handle for scripting faults. Recovery
    /// reads during open count toward the handle's read index; call
    /// [`FaultHandle::reset`] first if a test wants indices relative to its
    /// own operations.
    #[must_use]
    pub fn open_faulty(&self) -> (Journal, FaultHandle) {
        self.open_faulty_with_options(JournalOptions::default())
    }

    /// Same as [`TestJournal::open_faulty`] with explicit journal options.
    #[must_use]
    pub fn open_faulty_with_options(&self, options: JournalOptions) -> (Journal, FaultHandle) {
        let file = FileBackend::open(&self.path).expect("failed to open file backend");
        let backend = FaultBackend::new(Box::new(file));
        let handle = backend.handle();
        let journal = Journal::with_backend_and_options(Box::new(backend), options)
            .expect("failed to open journal");
        (journal, handle)
    }
}

impl Default for TestJournal {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic test payload for record `id`.
pub fn record_payload(id: usize) -> Vec<u8> {
    format!("Record number {id} with some test data").into_bytes()
}

/// Appends `count` deterministic records, panicking on any failure.
pub fn append_records(journal: &mut Journal, count: usize) {
    for id in 0..count {
        journal
            .append(&record_payload(id))
            .unwrap_or_else(|e| panic!("append of record {id} failed: {e}"));
    }
}

/// The expected payload sequence for `count` deterministic records.
#[must_use]
pub fn expected_records(count: usize) -> Vec<Vec<u8>> {
    (0..count).map(record_payload).collect()
}
