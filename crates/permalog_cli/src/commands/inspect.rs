//! Inspect command implementation.

use permalog_core::{FrameScanner, DEFAULT_MAX_RECORD_LEN};
use permalog_storage::{FileBackend, StorageBackend};
use std::path::Path;
use tracing::info;

/// Runs the inspect command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No journal found at {:?}", path).into());
    }

    info!("Inspecting journal {:?}", path);

    let backend = FileBackend::open(path)?;
    let file_size = backend.size()?;

    let mut scanner = FrameScanner::to_end(&backend, DEFAULT_MAX_RECORD_LEN)?;
    let mut record_count = 0usize;
    let mut payload_bytes = 0u64;
    for item in scanner.by_ref() {
        let (_, payload) = item?;
        record_count += 1;
        payload_bytes += payload.len() as u64;
    }

    let valid_len = scanner.pos();

    println!("Journal:         {}", path.display());
    println!("File size:       {file_size} bytes");
    println!("Valid prefix:    {valid_len} bytes");
    println!("Records:         {record_count}");
    println!("Payload bytes:   {payload_bytes}");
    println!("Trailing bytes:  {}", file_size - valid_len);
    if let Some(cause) = scanner.stop_cause() {
        println!("Tail stopped by: {cause}");
    }

    Ok(())
}
