//! Fault-injecting storage backend decorator.
//!
//! Wraps any [`StorageBackend`] and substitutes scripted misbehavior for
//! individual operations: short transfer counts, redirected offsets, bit
//! flips, silently dropped writes, injected errors, and failed durability
//! barriers. Operations are addressed by a per-kind zero-based index, so a
//! test can say "the fifth write is torn in half" and nothing else changes.
//!
//! The decorator is transparent to the journal: faults surface only as the
//! (mis)behavior the storage contract already permits.

use parking_lot::Mutex;
use permalog_storage::{StorageBackend, StorageError, StorageResult};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A scripted fault for one `write_at` invocation.
#[derive(Debug, Clone)]
pub enum WriteFault {
    /// Accept only the first `keep` bytes (a torn write).
    Short {
        /// Bytes actually transferred before the tear.
        keep: usize,
    },
    /// Land the write at `offset` instead of where it was aimed.
    Redirect {
        /// The wrong offset the write lands at.
        offset: u64,
    },
    /// Write nothing, report complete success.
    Drop,
    /// XOR the listed `(index, mask)` pairs into the buffer before writing.
    Corrupt {
        /// Byte index within the write buffer, and the XOR mask to apply.
        flips: Vec<(usize, u8)>,
    },
    /// Fail the operation outright.
    Fail,
}

/// A scripted fault for one `read_at` invocation.
#[derive(Debug, Clone)]
pub enum ReadFault {
    /// Serve the read from `offset` instead of where it was aimed.
    Redirect {
        /// The wrong offset the read is served from.
        offset: u64,
    },
    /// Fail the operation outright.
    Fail,
}

#[derive(Debug, Default)]
struct FaultState {
    write_faults: HashMap<usize, WriteFault>,
    read_faults: HashMap<usize, ReadFault>,
    sync_failures: HashSet<usize>,
    halt_after_fault: bool,
    halted: bool,
    writes_seen: usize,
    reads_seen: usize,
    syncs_seen: usize,
    faults_fired: usize,
}

impl FaultState {
    fn fired(&mut self) {
        self.faults_fired += 1;
        if self.halt_after_fault {
            self.halted = true;
        }
    }
}

/// Shared controller for a [`FaultBackend`].
///
/// Cheaply cloneable; stays valid after the backend is boxed into a
/// journal, which is what makes mid-session fault scheduling possible.
#[derive(Clone)]
pub struct FaultHandle {
    state: Arc<Mutex<FaultState>>,
}

impl FaultHandle {
    /// Scripts a fault for the `nth` `write_at` (zero-based, counted from
    /// the last [`FaultHandle::reset`]).
    pub fn fault_write(&self, nth: usize, fault: WriteFault) {
        self.state.lock().write_faults.insert(nth, fault);
    }

    /// Scripts a fault for the `nth` `read_at`.
    pub fn fault_read(&self, nth: usize, fault: ReadFault) {
        self.state.lock().read_faults.insert(nth, fault);
    }

    /// Fails the `nth` `sync` barrier.
    pub fn fail_sync(&self, nth: usize) {
        self.state.lock().sync_failures.insert(nth);
    }

    /// When set, every operation after the first fired fault fails -
    /// simulating the process dying mid-run.
    pub fn halt_after_fault(&self, halt: bool) {
        self.state.lock().halt_after_fault = halt;
    }

    /// Whether the backend has entered the halted state.
    #[must_use]
    pub fn has_halted(&self) -> bool {
        self.state.lock().halted
    }

    /// Number of `write_at` calls observed since the last reset.
    #[must_use]
    pub fn writes_seen(&self) -> usize {
        self.state.lock().writes_seen
    }

    /// Number of `read_at` calls observed since the last reset.
    #[must_use]
    pub fn reads_seen(&self) -> usize {
        self.state.lock().reads_seen
    }

    /// Number of `sync` calls observed since the last reset.
    #[must_use]
    pub fn syncs_seen(&self) -> usize {
        self.state.lock().syncs_seen
    }

    /// Number of scripted faults that have fired.
    #[must_use]
    pub fn faults_fired(&self) -> usize {
        self.state.lock().faults_fired
    }

    /// Clears all scripted faults, counters, and the halted state.
    pub fn reset(&self) {
        *self.state.lock() = FaultState::default();
    }
}

/// A storage backend decorator that injects scripted faults.
///
/// All unscripted operations pass through to the wrapped backend
/// unchanged.
pub struct FaultBackend {
    inner: Box<dyn StorageBackend>,
    state: Arc<Mutex<FaultState>>,
}

impl FaultBackend {
    /// Wraps `inner`, with no faults scripted yet.
    #[must_use]
    pub fn new(inner: Box<dyn StorageBackend>) -> Self {
        Self {
            inner,
            state: Arc::new(Mutex::new(FaultState::default())),
        }
    }

    /// Returns a controller handle for scripting faults.
    #[must_use]
    pub fn handle(&self) -> FaultHandle {
        FaultHandle {
            state: Arc::clone(&self.state),
        }
    }
}

fn halted_error() -> StorageError {
    StorageError::Faulted("backend halted after injected fault".to_string())
}

impl StorageBackend for FaultBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let fault = {
            let mut state = self.state.lock();
            if state.halted {
                return Err(halted_error());
            }
            let nth = state.reads_seen;
            state.reads_seen += 1;
            let fault = state.read_faults.remove(&nth);
            if fault.is_some() {
                state.fired();
            }
            fault
        };

        match fault {
            None => self.inner.read_at(offset, len),
            Some(ReadFault::Redirect { offset: wrong }) => self.inner.read_at(wrong, len),
            Some(ReadFault::Fail) => Err(StorageError::Faulted(format!(
                "injected read failure at offset {offset}"
            ))),
        }
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<usize> {
        let fault = {
            let mut state = self.state.lock();
            if state.halted {
                return Err(halted_error());
            }
            let nth = state.writes_seen;
            state.writes_seen += 1;
            let fault = state.write_faults.remove(&nth);
            if fault.is_some() {
                state.fired();
            }
            fault
        };

        match fault {
            None => self.inner.write_at(offset, data),
            Some(WriteFault::Short { keep }) => {
                let keep = keep.min(data.len());
                if keep == 0 {
                    return Ok(0);
                }
                self.inner.write_at(offset, &data[..keep])
            }
            Some(WriteFault::Redirect { offset: wrong }) => self.inner.write_at(wrong, data),
            Some(WriteFault::Drop) => Ok(data.len()),
            Some(WriteFault::Corrupt { flips }) => {
                let mut corrupted = data.to_vec();
                for (index, mask) in flips {
                    if index < corrupted.len() {
                        corrupted[index] ^= mask;
                    }
                }
                self.inner.write_at(offset, &corrupted)
            }
            Some(WriteFault::Fail) => Err(StorageError::Faulted(format!(
                "injected write failure at offset {offset}"
            ))),
        }
    }

    fn sync(&mut self) -> StorageResult<()> {
        {
            let mut state = self.state.lock();
            if state.halted {
                return Err(halted_error());
            }
            let nth = state.syncs_seen;
            state.syncs_seen += 1;
            if state.sync_failures.remove(&nth) {
                state.fired();
                return Err(StorageError::Faulted(format!(
                    "injected sync failure (barrier {nth})"
                )));
            }
        }
        self.inner.sync()
    }

    fn size(&self) -> StorageResult<u64> {
        if self.state.lock().halted {
            return Err(halted_error());
        }
        self.inner.size()
    }
}
