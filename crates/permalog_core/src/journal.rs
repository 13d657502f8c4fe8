//! The journal: open, append, read, close.

use crate::error::{JournalError, JournalResult};
use crate::frame::{encode_frame, DEFAULT_MAX_RECORD_LEN};
use crate::scan::FrameScanner;
use permalog_storage::{FileBackend, StorageBackend};
use std::path::Path;
use tracing::{debug, warn};

/// Tunables for a journal instance.
#[derive(Debug, Clone, Copy)]
pub struct JournalOptions {
    /// Maximum accepted payload length for a single record.
    ///
    /// Also bounds the length field honored during recovery: a declared
    /// length above this decodes as `LengthOutOfRange` and ends the scan.
    pub max_record_len: usize,
}

impl Default for JournalOptions {
    fn default() -> Self {
        Self {
            max_record_len: DEFAULT_MAX_RECORD_LEN,
        }
    }
}

/// A crash-consistent, append-only journal over one storage backend.
///
/// The journal owns its backend exclusively: appends take `&mut self` and
/// block until their durability barrier completes. Callers needing
/// concurrent appends must serialize externally; opening two journals on
/// one path is a caller error and is not detected here.
///
/// `valid_len` - the byte offset up to which every frame has verified
/// intact - is the sole source of truth: reads stop there and the next
/// append lands exactly there. It is computed once by the recovery scan at
/// open and afterwards only grows, one frame per successful append.
pub struct Journal {
    backend: Box<dyn StorageBackend>,
    options: JournalOptions,
    valid_len: u64,
    record_count: usize,
    closed: bool,
}

impl Journal {
    /// Opens the journal at `path`, creating the file if absent.
    ///
    /// Recovery runs synchronously before this returns: the file is scanned
    /// from offset 0 and the valid prefix established. The file is never
    /// truncated - trailing garbage is simply never read.
    ///
    /// # Errors
    ///
    /// Fails only if the file cannot be opened or read at all. Corruption
    /// does not fail open; it yields a shorter recovered prefix.
    pub fn open(path: &Path) -> JournalResult<Self> {
        Self::open_with_options(path, JournalOptions::default())
    }

    /// Opens the journal at `path` with explicit options.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Journal::open`].
    pub fn open_with_options(path: &Path, options: JournalOptions) -> JournalResult<Self> {
        let backend = FileBackend::open(path)?;
        Self::with_backend_and_options(Box::new(backend), options)
    }

    /// Builds a journal over an externally constructed backend.
    ///
    /// This is the seam tests use to interpose fault-injecting decorators;
    /// production code goes through [`Journal::open`].
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot be sized or read during recovery.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> JournalResult<Self> {
        Self::with_backend_and_options(backend, JournalOptions::default())
    }

    /// Builds a journal over an externally constructed backend with
    /// explicit options.
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot be sized or read during recovery.
    pub fn with_backend_and_options(
        backend: Box<dyn StorageBackend>,
        mut options: JournalOptions,
    ) -> JournalResult<Self> {
        // The length field is 32 bits; a wider configured cap is meaningless.
        options.max_record_len = options.max_record_len.min(u32::MAX as usize);

        let size = backend.size()?;
        let mut scanner = FrameScanner::new(&*backend, size, options.max_record_len);
        let mut record_count = 0usize;
        for item in scanner.by_ref() {
            item?;
            record_count += 1;
        }
        let valid_len = scanner.pos();

        if let Some(cause) = scanner.stop_cause() {
            warn!(
                valid_len,
                discarded = size - valid_len,
                %cause,
                "journal tail truncated during recovery"
            );
        }
        debug!(records = record_count, valid_len, "journal recovered");

        Ok(Self {
            backend,
            options,
            valid_len,
            record_count,
            closed: false,
        })
    }

    fn ensure_open(&self) -> JournalResult<()> {
        if self.closed {
            return Err(JournalError::Closed);
        }
        Ok(())
    }

    /// Appends one record and blocks until it is durable.
    ///
    /// The frame is written at the explicit offset `valid_len` - never an
    /// implicit end-of-file position - and followed by exactly one
    /// durability barrier. Only after the barrier completes does the tail
    /// cursor advance, so a successful return means the record survives any
    /// later crash.
    ///
    /// Short transfers are retried from the point reached. On any failure
    /// the tail cursor is unchanged: bytes that did land beyond the old
    /// tail are ignored by every read and overwritten by a future append.
    ///
    /// Returns the offset at which the record's frame begins.
    ///
    /// # Errors
    ///
    /// - [`JournalError::RecordTooLarge`] if `payload` exceeds the
    ///   configured maximum
    /// - [`JournalError::WriteStalled`] if a retried write makes zero
    ///   forward progress
    /// - [`JournalError::Storage`] for backend write or barrier failures
    /// - [`JournalError::Closed`] after [`Journal::close`]
    pub fn append(&mut self, payload: &[u8]) -> JournalResult<u64> {
        self.ensure_open()?;

        if payload.len() > self.options.max_record_len {
            return Err(JournalError::RecordTooLarge {
                len: payload.len(),
                max: self.options.max_record_len,
            });
        }

        let offset = self.valid_len;
        let frame = encode_frame(offset, payload);

        let mut written = 0usize;
        let mut stalled = false;
        while written < frame.len() {
            let n = self
                .backend
                .write_at(offset + written as u64, &frame[written..])?;
            if n == 0 {
                if stalled {
                    return Err(JournalError::WriteStalled {
                        offset: offset + written as u64,
                        remaining: frame.len() - written,
                    });
                }
                stalled = true;
                continue;
            }
            stalled = false;
            written += n;
        }

        self.backend.sync()?;

        self.valid_len += frame.len() as u64;
        self.record_count += 1;
        debug!(offset, len = payload.len(), "record appended");

        Ok(offset)
    }

    /// Reads back all records in order.
    ///
    /// Records are re-read from the backend and re-verified frame by frame;
    /// nothing is served from memory, so a misdirected or corrupted read is
    /// caught by checksum here rather than believed. The scan stops at
    /// `valid_len`, or earlier at the first frame that fails to decode - in
    /// which case the intact prefix is returned and the tail cursor is left
    /// where recovery put it (a transient read fault must not move the
    /// append position).
    ///
    /// # Errors
    ///
    /// Only operational failures: the backend could not be read at all, or
    /// the journal is closed. Corruption is never an error here.
    pub fn read_records(&self) -> JournalResult<Vec<Vec<u8>>> {
        self.ensure_open()?;

        let mut scanner =
            FrameScanner::new(&*self.backend, self.valid_len, self.options.max_record_len);
        let mut records = Vec::with_capacity(self.record_count);
        for item in scanner.by_ref() {
            let (_, payload) = item?;
            records.push(payload);
        }

        if let Some(cause) = scanner.stop_cause() {
            warn!(
                pos = scanner.pos(),
                valid_len = self.valid_len,
                %cause,
                "read stopped before the recovered tail"
            );
        }

        Ok(records)
    }

    /// The byte offset up to which all frames have been verified intact.
    #[must_use]
    pub fn valid_len(&self) -> u64 {
        self.valid_len
    }

    /// Number of records in the valid prefix (recovered plus appended).
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Whether the journal holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Closes the journal. Idempotent.
    ///
    /// There is no buffered state to flush - every successful append
    /// already completed its durability barrier. Subsequent operations
    /// return [`JournalError::Closed`].
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("valid_len", &self.valid_len)
            .field("record_count", &self.record_count)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
