//! Builder for session configuration.
//!
//! Provides a fluent API for configuring and creating [`Session`] instances.
//!
//! # Port selection
//!
//! | Configuration | Effective port | Released on teardown? |
//! |---------------|----------------|-----------------------|
//! | `.port(p)` | `p`, verbatim | never (caller owns it) |
//! | `.serial(s)` + `.allocator(a)` | leased from the allocator | exactly once |
//! | neither | [`DEFAULT_LOCAL_PORT`] | never (not tracked) |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;

use crate::bridge::{Adb, Bridge};
use crate::error::{Error, Result};
use crate::ports::PortAllocator;
use crate::transport::RpcClient;

use super::core::{Session, SessionInner, SessionState};
use super::lifecycle::BootstrapConfig;

// ============================================================================
// Constants
// ============================================================================

/// Default host the automation server is reached on.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Local port used when neither a port nor a device serial is supplied.
pub const DEFAULT_LOCAL_PORT: u16 = 9008;

// ============================================================================
// SessionBuilder
// ============================================================================

/// Builder for configuring a [`Session`] instance.
///
/// Use [`Session::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct SessionBuilder {
    /// Target host override.
    host: Option<String>,
    /// Caller-supplied local port.
    port: Option<u16>,
    /// Target device serial.
    serial: Option<String>,
    /// Shared port allocator for auto-assigned ports.
    allocator: Option<Arc<PortAllocator>>,
    /// Device bridge override.
    bridge: Option<Arc<dyn Bridge>>,
}

impl SessionBuilder {
    /// Creates a new session builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host the server is reached on (default `127.0.0.1`).
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets an explicit local port.
    ///
    /// A caller-supplied port is used verbatim and never auto-released.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Scopes the session to one device serial.
    ///
    /// Combined with [`allocator`](Self::allocator), a local port is leased
    /// automatically and released when the session ends.
    #[inline]
    #[must_use]
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    /// Sets the shared port allocator used for auto-assigned ports.
    #[inline]
    #[must_use]
    pub fn allocator(mut self, allocator: Arc<PortAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    /// Overrides the device bridge (defaults to [`Adb`]).
    #[inline]
    #[must_use]
    pub fn bridge(mut self, bridge: Arc<dyn Bridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Builds the session with validation.
    ///
    /// No network activity happens here; the session starts disconnected.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a serial is given without a port or allocator
    /// - [`Error::Config`] if the transport cannot be constructed
    pub fn build(self) -> Result<Session> {
        let host = self.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

        let (port, lease) = match (self.port, &self.serial, &self.allocator) {
            // Caller-supplied port wins and is never tracked.
            (Some(port), _, _) => (port, None),
            (None, Some(_), Some(allocator)) => {
                let lease = allocator.lease();
                (lease.port(), Some(lease))
            }
            (None, Some(_), None) => {
                return Err(Error::config(
                    "a session scoped to a device serial needs either an explicit \
                     .port() or a shared .allocator() to lease one from",
                ));
            }
            (None, None, _) => (DEFAULT_LOCAL_PORT, None),
        };

        let bridge: Arc<dyn Bridge> = match self.bridge {
            Some(bridge) => bridge,
            None => match &self.serial {
                Some(serial) => Arc::new(Adb::for_device(serial.clone())),
                None => Arc::new(Adb::new()),
            },
        };

        let client = RpcClient::new(&host, port)?;

        Ok(Session {
            inner: Arc::new(SessionInner {
                host,
                port,
                serial: self.serial,
                client,
                bridge,
                lease,
                state: Mutex::new(SessionState::Disconnected),
                bootstrap: BootstrapConfig::default(),
            }),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
