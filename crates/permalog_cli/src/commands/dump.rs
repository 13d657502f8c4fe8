//! Dump command implementation.

use permalog_core::{FrameScanner, DEFAULT_MAX_RECORD_LEN};
use permalog_storage::FileBackend;
use std::path::Path;
use tracing::info;

/// Runs the dump command.
pub fn run(path: &Path, limit: Option<usize>, hex: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No journal found at {:?}", path).into());
    }

    info!("Dumping journal {:?}", path);

    let backend = FileBackend::open(path)?;
    let max_records = limit.unwrap_or(usize::MAX);

    let mut scanner = FrameScanner::to_end(&backend, DEFAULT_MAX_RECORD_LEN)?;
    let mut printed = 0usize;
    while printed < max_records {
        let Some(item) = scanner.next() else { break };
        let (offset, payload) = item?;

        if hex {
            let encoded: String = payload.iter().map(|b| format!("{b:02x}")).collect();
            println!("[{printed}] offset {offset}, {} bytes: {encoded}", payload.len());
        } else {
            println!(
                "[{printed}] offset {offset}, {} bytes: {}",
                payload.len(),
                String::from_utf8_lossy(&payload)
            );
        }
        printed += 1;
    }

    if let Some(cause) = scanner.stop_cause() {
        println!("-- scan stopped at offset {}: {cause}", scanner.pos());
    }

    Ok(())
}
