//! # permalog testkit
//!
//! Test utilities for permalog.
//!
//! This crate provides:
//! - A fault-injecting storage backend decorator for simulating torn
//!   writes, misdirected I/O, silent write loss, bit corruption, and
//!   failed durability barriers
//! - Tempdir-backed journal fixtures
//! - Property-based test generators using proptest
//!
//! The fault backend is an injected decorator around any
//! [`permalog_storage::StorageBackend`] - there is no global interception
//! state, so faults are deterministic and per-instance.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use permalog_testkit::prelude::*;
//!
//! let fixture = TestJournal::new();
//! let (mut journal, faults) = fixture.open_faulty();
//! faults.fault_write(4, WriteFault::Drop);
//! // ... drive the journal, then fixture.reopen() and verify
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fault;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fault::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fault::{FaultBackend, FaultHandle, ReadFault, WriteFault};
pub use fixtures::{record_payload, TestJournal};
pub use generators::{payload_batch_strategy, payload_strategy};
