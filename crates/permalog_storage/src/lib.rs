//! # permalog storage
//!
//! Storage backend trait and implementations for permalog.
//!
//! This crate provides the lowest-level I/O abstraction for the journal.
//! Storage backends are **opaque byte stores** addressed by explicit
//! offsets - they do not interpret the frames written through them.
//!
//! ## Design Principles
//!
//! - Backends expose positioned reads and writes plus a durability barrier
//! - Transfers may be short: `write_at` and `read_at` report what actually
//!   moved, and the caller owns the retry/verification policy
//! - No knowledge of the journal frame format
//! - Must be `Send + Sync` so a backend can be boxed behind test decorators
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral journals
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use permalog_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.write_at(0, b"hello world").unwrap();
//! let data = backend.read_at(0, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
