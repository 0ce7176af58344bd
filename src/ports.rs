//! Local forward-port allocation.
//!
//! Each session that auto-manages its device connection needs a unique
//! local port for the `adb forward` relay. The [`PortAllocator`] is the
//! single process-wide registry of ports currently in use; sessions hold a
//! [`PortLease`] that returns the port to the registry exactly once,
//! whether the session is disconnected explicitly or simply dropped.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use android_automator::ports::PortAllocator;
//!
//! let allocator = Arc::new(PortAllocator::new());
//! let lease = allocator.lease();
//! assert!(!allocator.is_available(lease.port()));
//! drop(lease); // port returned to the registry
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// Lowest local port handed out by the allocator.
///
/// Matches the automation server's own listening port so the first session
/// forwards `9008 -> 9008`.
pub const BASE_LOCAL_PORT: u16 = 9008;

// ============================================================================
// PortAllocator
// ============================================================================

/// Process-wide registry of allocated local ports.
///
/// Construct one allocator at process start and share it (via `Arc`) with
/// every session that needs an auto-assigned port. Allocation scans upward
/// from [`BASE_LOCAL_PORT`] for the smallest free port; the scan is O(n) in
/// the number of concurrently live sessions.
///
/// # Thread Safety
///
/// All operations take a single internal mutex for the duration of a set
/// insert/remove. No network or process calls happen while it is held.
#[derive(Debug)]
pub struct PortAllocator {
    /// Ports currently held by live sessions.
    allocated: Mutex<FxHashSet<u16>>,
    /// Lowest port the scan starts from.
    base: u16,
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl PortAllocator {
    /// Creates an allocator scanning upward from [`BASE_LOCAL_PORT`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_base(BASE_LOCAL_PORT)
    }

    /// Creates an allocator scanning upward from a custom base port.
    #[inline]
    #[must_use]
    pub fn with_base(base: u16) -> Self {
        Self {
            allocated: Mutex::new(FxHashSet::default()),
            base,
        }
    }

    /// Allocates the smallest free port at or above the base.
    ///
    /// The returned port is recorded as held and is never handed to another
    /// caller until [`release`](Self::release) is called for it.
    #[must_use]
    pub fn allocate(&self) -> u16 {
        let mut allocated = self.allocated.lock();
        let mut port = self.base;
        while allocated.contains(&port) {
            port += 1;
        }
        allocated.insert(port);
        debug!(port, held = allocated.len(), "Allocated local port");
        port
    }

    /// Releases a previously allocated port.
    ///
    /// Releasing a port that is not held is a no-op, not an error.
    pub fn release(&self, port: u16) {
        let removed = self.allocated.lock().remove(&port);
        if removed {
            debug!(port, "Released local port");
        }
    }

    /// Returns `true` if the port is not currently held.
    ///
    /// Advisory only: the answer can be stale by the time the caller acts
    /// on it if another session allocates concurrently.
    #[inline]
    #[must_use]
    pub fn is_available(&self, port: u16) -> bool {
        !self.allocated.lock().contains(&port)
    }

    /// Returns the number of ports currently held.
    #[inline]
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.allocated.lock().len()
    }

    /// Allocates a port wrapped in an RAII lease.
    ///
    /// The lease releases the port back to this allocator exactly once:
    /// on explicit [`PortLease::release`] or on drop, whichever comes first.
    #[must_use]
    pub fn lease(self: &Arc<Self>) -> PortLease {
        let port = self.allocate();
        PortLease {
            allocator: Arc::clone(self),
            port,
            released: AtomicBool::new(false),
        }
    }
}

// ============================================================================
// PortLease
// ============================================================================

/// RAII guard over one allocated port.
///
/// Holding the lease keeps the port out of the registry; dropping it (or
/// calling [`release`](Self::release)) returns the port. Release happens
/// exactly once regardless of how many times `release` is called.
#[derive(Debug)]
pub struct PortLease {
    /// Allocator the port was taken from.
    allocator: Arc<PortAllocator>,
    /// The leased port.
    port: u16,
    /// Set once the port has been returned.
    released: AtomicBool,
}

impl PortLease {
    /// Returns the leased port.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the port to the allocator.
    ///
    /// Idempotent: only the first call releases; later calls and the
    /// eventual drop are no-ops.
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.allocator.release(self.port);
        }
    }
}

impl Drop for PortLease {
    fn drop(&mut self) {
        self.release();
    }
}

// ============================================================================
// Tests
// ============================================================================
