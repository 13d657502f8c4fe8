//! Sequential frame scan over a storage backend.
//!
//! The scanner is the single engine behind recovery at open, reads, and the
//! CLI's verify/dump tools: walk frames from a start offset, decode each
//! through the codec, and stop - silently - at the first window that fails
//! to decode. Where it stopped, and why, stay queryable afterwards.

use crate::error::JournalResult;
use crate::frame::{declared_frame_len, decode_frame, DecodeError, HEADER_LEN};
use permalog_storage::StorageBackend;

/// A sequential scanner over the frames of a journal.
///
/// Yields `(offset, payload)` pairs. Iteration ends at `limit`, or at the
/// first decode failure, whichever comes first. A decode failure is not an
/// iterator error - it marks the end of the valid prefix; query it with
/// [`FrameScanner::stop_cause`] and the recovered tail with
/// [`FrameScanner::pos`]. Operational backend failures do surface as `Err`
/// items.
///
/// Each frame costs two positioned reads: one header window to learn the
/// declared length (validated against the configured maximum before it can
/// size anything), then the full frame window for checksum verification.
///
/// # Example
///
/// ```ignore
/// let mut scanner = FrameScanner::new(&backend, backend.size()?, max_len);
/// while let Some(item) = scanner.next() {
///     let (offset, payload) = item?;
///     // ...
/// }
/// let valid_len = scanner.pos();
/// ```
pub struct FrameScanner<'a> {
    backend: &'a dyn StorageBackend,
    /// Scan stops at this offset; bytes at or beyond it are never trusted.
    limit: u64,
    max_record_len: usize,
    pos: u64,
    stop: Option<DecodeError>,
    finished: bool,
}

impl<'a> FrameScanner<'a> {
    /// Creates a scanner over `backend` from offset 0 up to `limit`.
    #[must_use]
    pub fn new(backend: &'a dyn StorageBackend, limit: u64, max_record_len: usize) -> Self {
        Self {
            backend,
            limit,
            max_record_len,
            pos: 0,
            stop: None,
            finished: false,
        }
    }

    /// Creates a scanner over the backend's entire current extent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend size cannot be determined.
    pub fn to_end(backend: &'a dyn StorageBackend, max_record_len: usize) -> JournalResult<Self> {
        let limit = backend.size()?;
        Ok(Self::new(backend, limit, max_record_len))
    }

    /// The scan cursor: start offset of the next undecoded frame.
    ///
    /// After iteration ends this is the recovered tail - the byte offset up
    /// to which every frame decoded intact.
    #[must_use]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Why the scan stopped early, if it did.
    ///
    /// `None` means the scan reached `limit` cleanly.
    #[must_use]
    pub fn stop_cause(&self) -> Option<&DecodeError> {
        self.stop.as_ref()
    }

    fn halt(&mut self, cause: DecodeError) {
        self.stop = Some(cause);
        self.finished = true;
    }

    fn read_next(&mut self) -> JournalResult<Option<(u64, Vec<u8>)>> {
        if self.finished || self.pos >= self.limit {
            self.finished = true;
            return Ok(None);
        }

        let start = self.pos;
        let budget = usize::try_from(self.limit - start).unwrap_or(usize::MAX);

        let header = self.backend.read_at(start, HEADER_LEN.min(budget))?;
        let frame_len = match declared_frame_len(&header, self.max_record_len) {
            Ok(len) => len,
            Err(cause) => {
                self.halt(cause);
                return Ok(None);
            }
        };

        if frame_len > budget {
            self.halt(DecodeError::IncompleteFrame {
                have: budget,
                need: frame_len,
            });
            return Ok(None);
        }

        let window = self.backend.read_at(start, frame_len)?;
        match decode_frame(start, &window, self.max_record_len) {
            Ok((payload, consumed)) => {
                self.pos = start + consumed as u64;
                Ok(Some((start, payload)))
            }
            Err(cause) => {
                self.halt(cause);
                Ok(None)
            }
        }
    }
}

impl Iterator for FrameScanner<'_> {
    type Item = JournalResult<(u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{encode_frame, DEFAULT_MAX_RECORD_LEN};
    use permalog_storage::InMemoryBackend;

    fn backend_with_frames(payloads: &[&[u8]]) -> InMemoryBackend {
        let mut data = Vec::new();
        for payload in payloads {
            let frame = encode_frame(data.len() as u64, payload);
            data.extend_from_slice(&frame);
        }
        InMemoryBackend::with_data(data)
    }

    fn collect(scanner: &mut FrameScanner<'_>) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        for item in scanner.by_ref() {
            out.push(item.unwrap().1);
        }
        out
    }

    #[test]
    fn scan_empty_backend() {
        let backend = InMemoryBackend::new();
        let mut scanner = FrameScanner::to_end(&backend, DEFAULT_MAX_RECORD_LEN).unwrap();

        assert!(collect(&mut scanner).is_empty());
        assert_eq!(scanner.pos(), 0);
        assert!(scanner.stop_cause().is_none());
    }

    #[test]
    fn scan_yields_frames_in_order() {
        let backend = backend_with_frames(&[b"A", b"BB", b"CCC"]);
        let mut scanner = FrameScanner::to_end(&backend, DEFAULT_MAX_RECORD_LEN).unwrap();

        let records = collect(&mut scanner);
        assert_eq!(records, vec![b"A".to_vec(), b"BB".to_vec(), b"CCC".to_vec()]);
        assert_eq!(scanner.pos(), backend.size().unwrap());
        assert!(scanner.stop_cause().is_none());
    }

    #[test]
    fn scan_offsets_advance_by_frame_size() {
        let backend = backend_with_frames(&[b"aa", b"bbbb"]);
        let mut scanner = FrameScanner::to_end(&backend, DEFAULT_MAX_RECORD_LEN).unwrap();

        let first = scanner.next().unwrap().unwrap();
        assert_eq!(first.0, 0);
        let second = scanner.next().unwrap().unwrap();
        assert_eq!(second.0, (HEADER_LEN + 2) as u64);
    }

    #[test]
    fn scan_stops_at_torn_tail() {
        let mut data = Vec::new();
        let first = encode_frame(0, b"whole");
        data.extend_from_slice(&first);
        let second = encode_frame(data.len() as u64, b"torn record");
        data.extend_from_slice(&second[..second.len() / 2]);

        let backend = InMemoryBackend::with_data(data);
        let mut scanner = FrameScanner::to_end(&backend, DEFAULT_MAX_RECORD_LEN).unwrap();

        let records = collect(&mut scanner);
        assert_eq!(records, vec![b"whole".to_vec()]);
        assert_eq!(scanner.pos(), first.len() as u64);
        assert!(matches!(
            scanner.stop_cause(),
            Some(DecodeError::IncompleteFrame { .. })
        ));
    }

    #[test]
    fn scan_stops_at_garbage() {
        let mut data = Vec::new();
        data.extend_from_slice(&encode_frame(0, b"good"));
        let tail = data.len() as u64;
        data.extend_from_slice(b"\xDE\xAD\xBE\xEFgarbage bytes here");

        let backend = InMemoryBackend::with_data(data);
        let mut scanner = FrameScanner::to_end(&backend, DEFAULT_MAX_RECORD_LEN).unwrap();

        let records = collect(&mut scanner);
        assert_eq!(records, vec![b"good".to_vec()]);
        assert_eq!(scanner.pos(), tail);
        assert!(matches!(
            scanner.stop_cause(),
            Some(DecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn scan_respects_limit() {
        let backend = backend_with_frames(&[b"one", b"two"]);
        let first_len = (HEADER_LEN + 3) as u64;

        let mut scanner = FrameScanner::new(&backend, first_len, DEFAULT_MAX_RECORD_LEN);
        let records = collect(&mut scanner);

        assert_eq!(records, vec![b"one".to_vec()]);
        assert_eq!(scanner.pos(), first_len);
        assert!(scanner.stop_cause().is_none());
    }

    #[test]
    fn scan_does_not_trust_bytes_past_limit() {
        // A frame that extends beyond the limit must not decode, even
        // though its bytes are all physically present.
        let backend = backend_with_frames(&[b"oversteps"]);
        let size = backend.size().unwrap();

        let mut scanner = FrameScanner::new(&backend, size - 1, DEFAULT_MAX_RECORD_LEN);
        assert!(collect(&mut scanner).is_empty());
        assert_eq!(scanner.pos(), 0);
        assert!(matches!(
            scanner.stop_cause(),
            Some(DecodeError::IncompleteFrame { .. })
        ));
    }

    #[test]
    fn scan_rescans_identically() {
        let backend = backend_with_frames(&[b"r0", b"r1", b"r2"]);

        for _ in 0..3 {
            let mut scanner = FrameScanner::to_end(&backend, DEFAULT_MAX_RECORD_LEN).unwrap();
            let records = collect(&mut scanner);
            assert_eq!(records, vec![b"r0".to_vec(), b"r1".to_vec(), b"r2".to_vec()]);
        }
    }
}
