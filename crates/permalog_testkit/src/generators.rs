//! Property-based test generators using proptest.

use proptest::prelude::*;

/// Strategy for a single record payload (arbitrary bytes, up to 1 KiB).
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..1024)
}

/// Strategy for a batch of record payloads.
pub fn payload_batch_strategy(max_records: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(payload_strategy(), 0..max_records)
}
