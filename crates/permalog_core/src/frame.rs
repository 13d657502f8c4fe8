//! On-disk frame encoding and decoding.
//!
//! Each appended record is stored as one self-describing frame:
//!
//! ```text
//! | magic (4) | length (4, u32 LE) | crc32 (4, LE) | payload (length) |
//! ```
//!
//! The CRC covers the frame's own start offset (as u64 LE) followed by the
//! magic, the length field, and the payload. Covering the header fields
//! makes a corrupted length or magic detectable, not just payload damage;
//! keying the checksum to the offset makes a frame image that is written or
//! read at the wrong position fail verification even when its content is
//! intact. Frames never relocate - the journal is append-only - so the key
//! is stable for the life of the file.

use thiserror::Error;

/// Magic bytes identifying a journal frame.
pub const FRAME_MAGIC: [u8; 4] = *b"PLG1";

/// Size of the frame header: magic (4) + length (4) + crc32 (4).
pub const HEADER_LEN: usize = 12;

/// Default cap on a single record payload: 16 MiB.
///
/// The length field could describe up to 4 GiB, but an unguarded cap would
/// let a corrupted length field drive an equally oversized read during
/// recovery.
pub const DEFAULT_MAX_RECORD_LEN: usize = 16 * 1024 * 1024;

/// Why a byte window failed to decode as a frame.
///
/// Decode failures are how the recovery scan finds the end of the valid
/// prefix; they are classifications, not terminal errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bytes available than the header, or than the header declares.
    ///
    /// A torn or partial write, or end-of-file mid-frame.
    #[error("incomplete frame: have {have} bytes, need {need}")]
    IncompleteFrame {
        /// Bytes available in the window.
        have: usize,
        /// Bytes the frame requires.
        need: usize,
    },

    /// The magic sentinel does not match.
    ///
    /// Garbage bytes, or a write or read misdirected to this offset.
    #[error("bad magic: found {found:02x?}")]
    BadMagic {
        /// The four bytes found where the magic should be.
        found: [u8; 4],
    },

    /// The recomputed checksum differs from the stored one.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// The checksum stored in the frame.
        expected: u32,
        /// The checksum recomputed over the covered fields.
        actual: u32,
    },

    /// The declared payload length exceeds the configured maximum.
    #[error("declared length {length} exceeds maximum {max}")]
    LengthOutOfRange {
        /// The declared payload length.
        length: usize,
        /// The configured maximum.
        max: usize,
    },
}

/// Computes the frame checksum over `offset || magic || length || payload`.
fn frame_crc(offset: u64, header_prefix: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&offset.to_le_bytes());
    hasher.update(header_prefix);
    hasher.update(payload);
    hasher.finalize()
}

/// Encodes `payload` into a frame keyed to the file offset it will occupy.
///
/// The caller must have bounded `payload.len()` to a configured maximum no
/// larger than `u32::MAX`; the journal enforces this before encoding.
#[must_use]
pub fn encode_frame(offset: u64, payload: &[u8]) -> Vec<u8> {
    debug_assert!(u32::try_from(payload.len()).is_ok());

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&FRAME_MAGIC);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());

    let crc = frame_crc(offset, &frame[0..8], payload);
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.extend_from_slice(payload);

    frame
}

/// Validates the header window and returns the total frame length it
/// declares (header plus payload).
///
/// Only the magic and the length range are checked - enough to size the
/// full-frame read without trusting an unchecked length, but no content
/// verification. Use [`decode_frame`] on the full window for that.
///
/// # Errors
///
/// Returns [`DecodeError::IncompleteFrame`], [`DecodeError::BadMagic`], or
/// [`DecodeError::LengthOutOfRange`].
pub fn declared_frame_len(header: &[u8], max_len: usize) -> Result<usize, DecodeError> {
    if header.len() < HEADER_LEN {
        return Err(DecodeError::IncompleteFrame {
            have: header.len(),
            need: HEADER_LEN,
        });
    }

    if header[0..4] != FRAME_MAGIC {
        let mut found = [0u8; 4];
        found.copy_from_slice(&header[0..4]);
        return Err(DecodeError::BadMagic { found });
    }

    let length = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if length > max_len {
        return Err(DecodeError::LengthOutOfRange {
            length,
            max: max_len,
        });
    }

    Ok(HEADER_LEN + length)
}

/// Decodes one frame from a byte window read at `offset`.
///
/// On success returns the payload and the total frame size consumed, so the
/// caller can advance its scan cursor.
///
/// # Errors
///
/// Returns the [`DecodeError`] classifying why the window is not a valid
/// frame at this offset.
pub fn decode_frame(
    offset: u64,
    window: &[u8],
    max_len: usize,
) -> Result<(Vec<u8>, usize), DecodeError> {
    let frame_len = declared_frame_len(window, max_len)?;

    if window.len() < frame_len {
        return Err(DecodeError::IncompleteFrame {
            have: window.len(),
            need: frame_len,
        });
    }

    let expected = u32::from_le_bytes([window[8], window[9], window[10], window[11]]);
    let actual = frame_crc(offset, &window[0..8], &window[HEADER_LEN..frame_len]);

    if expected != actual {
        return Err(DecodeError::ChecksumMismatch { expected, actual });
    }

    Ok((window[HEADER_LEN..frame_len].to_vec(), frame_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_roundtrip() {
        let frame = encode_frame(0, b"hello");
        let (payload, consumed) = decode_frame(0, &frame, DEFAULT_MAX_RECORD_LEN).unwrap();
        assert_eq!(payload, b"hello");
        assert_eq!(consumed, frame.len());
    }

    #[test]
    fn frame_roundtrip_empty_payload() {
        let frame = encode_frame(64, b"");
        assert_eq!(frame.len(), HEADER_LEN);

        let (payload, consumed) = decode_frame(64, &frame, DEFAULT_MAX_RECORD_LEN).unwrap();
        assert!(payload.is_empty());
        assert_eq!(consumed, HEADER_LEN);
    }

    #[test]
    fn frame_roundtrip_with_trailing_bytes() {
        let mut bytes = encode_frame(0, b"record");
        let frame_len = bytes.len();
        bytes.extend_from_slice(b"trailing garbage");

        let (payload, consumed) = decode_frame(0, &bytes, DEFAULT_MAX_RECORD_LEN).unwrap();
        assert_eq!(payload, b"record");
        assert_eq!(consumed, frame_len);
    }

    #[test]
    fn decode_short_header_is_incomplete() {
        let frame = encode_frame(0, b"hello");
        let err = decode_frame(0, &frame[..7], DEFAULT_MAX_RECORD_LEN).unwrap_err();
        assert_eq!(
            err,
            DecodeError::IncompleteFrame {
                have: 7,
                need: HEADER_LEN
            }
        );
    }

    #[test]
    fn decode_short_payload_is_incomplete() {
        let frame = encode_frame(0, b"hello");
        let err = decode_frame(0, &frame[..frame.len() - 2], DEFAULT_MAX_RECORD_LEN).unwrap_err();
        assert_eq!(
            err,
            DecodeError::IncompleteFrame {
                have: frame.len() - 2,
                need: frame.len()
            }
        );
    }

    #[test]
    fn decode_bad_magic() {
        let mut frame = encode_frame(0, b"hello");
        frame[0] ^= 0xFF;

        let err = decode_frame(0, &frame, DEFAULT_MAX_RECORD_LEN).unwrap_err();
        assert!(matches!(err, DecodeError::BadMagic { .. }));
    }

    #[test]
    fn decode_flipped_length_detected() {
        let mut frame = encode_frame(0, b"hello");
        // Flip a low bit of the length field: still within range, but the
        // checksum covers the header so it cannot pass.
        frame[4] ^= 0x01;

        let err = decode_frame(0, &frame, DEFAULT_MAX_RECORD_LEN).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ChecksumMismatch { .. } | DecodeError::IncompleteFrame { .. }
        ));
    }

    #[test]
    fn decode_flipped_payload_bit_detected() {
        for bit in 0..8 {
            let mut frame = encode_frame(0, b"hello");
            frame[HEADER_LEN + 2] ^= 1 << bit;

            let err = decode_frame(0, &frame, DEFAULT_MAX_RECORD_LEN).unwrap_err();
            assert!(matches!(err, DecodeError::ChecksumMismatch { .. }));
        }
    }

    #[test]
    fn decode_oversized_length_rejected_before_read() {
        let mut frame = encode_frame(0, b"hello");
        frame[4..8].copy_from_slice(&u32::MAX.to_le_bytes());

        let err = decode_frame(0, &frame, DEFAULT_MAX_RECORD_LEN).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthOutOfRange {
                length: u32::MAX as usize,
                max: DEFAULT_MAX_RECORD_LEN
            }
        );
    }

    #[test]
    fn decode_at_wrong_offset_fails_checksum() {
        // A byte-identical frame image read back at a different offset must
        // not verify: this is what catches misdirected reads and writes.
        let frame = encode_frame(1024, b"displaced");
        let err = decode_frame(0, &frame, DEFAULT_MAX_RECORD_LEN).unwrap_err();
        assert!(matches!(err, DecodeError::ChecksumMismatch { .. }));

        let (payload, _) = decode_frame(1024, &frame, DEFAULT_MAX_RECORD_LEN).unwrap();
        assert_eq!(payload, b"displaced");
    }

    #[test]
    fn declared_len_checks_magic_and_range_only() {
        let frame = encode_frame(0, b"abc");
        assert_eq!(
            declared_frame_len(&frame, DEFAULT_MAX_RECORD_LEN).unwrap(),
            HEADER_LEN + 3
        );

        // A corrupted checksum does not matter at this stage.
        let mut corrupt_crc = frame.clone();
        corrupt_crc[9] ^= 0xFF;
        assert_eq!(
            declared_frame_len(&corrupt_crc, DEFAULT_MAX_RECORD_LEN).unwrap(),
            HEADER_LEN + 3
        );
    }
}
