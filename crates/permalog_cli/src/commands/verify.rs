//! Verify command implementation.

use permalog_core::{FrameScanner, DEFAULT_MAX_RECORD_LEN};
use permalog_storage::{FileBackend, StorageBackend};
use std::path::Path;
use tracing::info;

/// Runs the verify command.
///
/// Returns `true` when every byte of the file belongs to a verified frame.
pub fn run(path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No journal found at {:?}", path).into());
    }

    info!("Verifying journal {:?}", path);

    let backend = FileBackend::open(path)?;
    let file_size = backend.size()?;

    let mut scanner = FrameScanner::to_end(&backend, DEFAULT_MAX_RECORD_LEN)?;
    let mut record_count = 0usize;
    for item in scanner.by_ref() {
        let (offset, payload) = item?;
        println!(
            "frame {record_count}: offset {offset}, payload {} bytes, ok",
            payload.len()
        );
        record_count += 1;
    }

    let valid_len = scanner.pos();

    match scanner.stop_cause() {
        None => {
            println!("OK: {record_count} records, {valid_len} bytes, no trailing data");
            Ok(true)
        }
        Some(cause) => {
            println!(
                "TAIL: {record_count} records verified; {} unreadable bytes at offset {valid_len} ({cause})",
                file_size - valid_len
            );
            Ok(false)
        }
    }
}
