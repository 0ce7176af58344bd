//! Session façade.
//!
//! A [`Session`] is one logical connection between this client and one
//! device's automation server. It composes the port allocator, transport,
//! device bridge, and lifecycle manager behind a single entry point.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use android_automator::{PortAllocator, Session};
//!
//! # async fn example() -> android_automator::Result<()> {
//! let allocator = Arc::new(PortAllocator::new());
//!
//! let session = Session::builder()
//!     .serial("emulator-5554")
//!     .allocator(Arc::clone(&allocator))
//!     .build()?;
//!
//! session.connect(true).await?;
//! session.tap(540, 960).await?;
//! session.disconnect().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::bridge::Bridge;
use crate::error::{Error, Result};
use crate::ports::PortLease;
use crate::protocol::{Param, RpcValue};
use crate::transport::RpcClient;

use super::builder::SessionBuilder;
use super::lifecycle::{BootstrapConfig, Lifecycle};

// ============================================================================
// SessionState
// ============================================================================

/// Connection state of a session.
///
/// A session is either disconnected or connected; all gesture and key
/// operations require [`SessionState::Connected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No verified connection to the server.
    Disconnected,
    /// Liveness-verified connection established.
    Connected,
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a session.
pub(crate) struct SessionInner {
    /// Target host.
    pub host: String,

    /// Effective local port of the server target.
    pub port: u16,

    /// Device serial, if the session is scoped to one.
    pub serial: Option<String>,

    /// Transport to the automation server.
    pub client: RpcClient,

    /// Device bridge for bootstrap and teardown shell-outs.
    pub bridge: Arc<dyn Bridge>,

    /// Self-allocated port lease, if the port was not caller-supplied.
    /// Dropped with the session, releasing the port exactly once.
    pub lease: Option<PortLease>,

    /// Current connection state.
    pub state: Mutex<SessionState>,

    /// Bootstrap parameters.
    pub bootstrap: BootstrapConfig,
}

// ============================================================================
// Session
// ============================================================================

/// One logical connection to one device's automation server.
///
/// Cheap to clone; all clones share the same connection state and port
/// lease. Dropping the last clone releases a self-allocated port even if
/// [`disconnect`](Self::disconnect) was never called.
#[derive(Clone)]
pub struct Session {
    /// Shared inner state.
    pub(crate) inner: Arc<SessionInner>,
}

// ============================================================================
// Session - Display
// ============================================================================

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.inner.host)
            .field("port", &self.inner.port)
            .field("serial", &self.inner.serial)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Session - Public API
// ============================================================================

impl Session {
    /// Creates a configuration builder for a session.
    #[inline]
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.inner.state.lock()
    }

    /// Returns `true` if the session is connected.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// Returns the effective local port of the server target.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.inner.port
    }

    /// Returns the device serial the session is scoped to, if any.
    #[inline]
    #[must_use]
    pub fn serial(&self) -> Option<&str> {
        self.inner.serial.as_deref()
    }

    /// Returns the device screen dimensions.
    ///
    /// Always `None` until the capability query lands; callers should treat
    /// absence as "unknown", not an error.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        None
    }

    /// Establishes the connection, bootstrapping the server if allowed.
    ///
    /// Probes for an already-running server first; with `auto_bootstrap`
    /// the full deploy/launch/verify sequence runs when probing fails.
    /// A no-op when the session is already connected.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionFailed`] if probing fails and bootstrap is off
    /// - [`Error::DeviceNotConnected`] if no usable device is attached
    /// - [`Error::JarDeploymentFailed`] if artifact deployment fails
    /// - [`Error::ServerStartFailed`] if a required shell-out fails
    /// - [`Error::ServerNotReady`] if readiness polling is exhausted
    pub async fn connect(&self, auto_bootstrap: bool) -> Result<()> {
        if self.is_connected() {
            debug!(port = self.inner.port, "Session already connected");
            return Ok(());
        }

        self.lifecycle().connect(auto_bootstrap).await?;

        *self.inner.state.lock() = SessionState::Connected;
        info!(
            host = %self.inner.host,
            port = self.inner.port,
            serial = ?self.inner.serial,
            "Session connected"
        );
        Ok(())
    }

    /// Tears the session down.
    ///
    /// Best-effort and unconditional: the remote process kill and forward
    /// removal run regardless of connection state, since a failed bootstrap
    /// may have left a forward or a server process behind. Failures are
    /// swallowed, and a self-allocated port is released (once). Safe to
    /// call on an already-disconnected session.
    pub async fn disconnect(&self) {
        let was_connected = {
            let mut state = self.inner.state.lock();
            std::mem::replace(&mut *state, SessionState::Disconnected)
                == SessionState::Connected
        };

        self.lifecycle().teardown().await;

        if let Some(lease) = &self.inner.lease {
            lease.release();
        }

        debug!(port = self.inner.port, was_connected, "Session disconnected");
    }

    /// Checks whether the server is alive and serving.
    ///
    /// Probes the health endpoint and issues one `dumpWindowHierarchy`
    /// call; any failure of either converts to `false`. Never errors.
    pub async fn check_status(&self) -> bool {
        if !self.inner.client.probe().await {
            return false;
        }
        self.inner
            .client
            .call("dumpWindowHierarchy", vec![false.into()])
            .await
            .is_ok()
    }
}

// ============================================================================
// Session - Internal API
// ============================================================================

impl Session {
    /// Builds the lifecycle driver over this session's collaborators.
    fn lifecycle(&self) -> Lifecycle<'_> {
        Lifecycle::new(
            &self.inner.client,
            self.inner.bridge.as_ref(),
            self.inner.serial.as_deref(),
            self.inner.port,
            &self.inner.bootstrap,
        )
    }

    /// Fails with [`Error::NotConnected`] unless the session is connected.
    pub(crate) fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Issues a procedure call on behalf of a gesture or key operation.
    ///
    /// Remote procedure errors are re-signalled as [`Error::Server`]
    /// carrying the `code: message` concatenation; transport and network
    /// errors propagate unchanged.
    pub(crate) async fn rpc(&self, method: &str, params: Vec<Param>) -> Result<RpcValue> {
        match self.inner.client.call(method, params).await {
            Ok(value) => Ok(value),
            Err(err @ Error::Rpc { .. }) => Err(Error::server(err.to_string())),
            Err(err) => Err(err),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ports::PortAllocator;
    use crate::testing::{CannedResponse, NullBridge, TestServer};

    /// Fixture where the server is alive and answers every call.
    async fn live_fixture() -> TestServer {
        TestServer::spawn(|request| {
            if request.path == "/ping" {
                return CannedResponse::ok("pong");
            }
            CannedResponse::ok(r#"{"jsonrpc":"2.0","id":1,"result":null,"error":null}"#)
        })
        .await
    }

    /// Bridge recording teardown traffic.
    #[derive(Default)]
    struct RecordingBridge {
        shell_log: Mutex<Vec<String>>,
        removed_log: Mutex<Vec<u16>>,
    }

    #[async_trait::async_trait]
    impl Bridge for RecordingBridge {
        async fn devices(&self) -> crate::Result<Vec<crate::bridge::DeviceEntry>> {
            Ok(Vec::new())
        }

        async fn push(&self, _local: &std::path::Path, _remote: &str) -> crate::Result<String> {
            Ok(String::new())
        }

        async fn shell(&self, command: &str) -> crate::Result<String> {
            self.shell_log.lock().push(command.to_string());
            Ok(String::new())
        }

        async fn forward(&self, _local: u16, _remote: u16) -> crate::Result<()> {
            Ok(())
        }

        async fn remove_forward(&self, local: u16) -> crate::Result<()> {
            self.removed_log.lock().push(local);
            Ok(())
        }
    }

    fn session_for(server: &TestServer) -> Session {
        Session::builder()
            .host(server.host())
            .port(server.port())
            .bridge(Arc::new(NullBridge))
            .build()
            .expect("build session")
    }

    #[test]
    fn test_session_is_clone_and_debug() {
        fn assert_clone<T: Clone>() {}
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_clone::<Session>();
        assert_debug::<Session>();
    }

    #[test]
    fn test_new_session_is_disconnected() {
        let session = Session::builder()
            .port(9008)
            .build()
            .expect("build session");
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_connected());
    }

    #[test]
    fn test_dimensions_is_absent() {
        let session = Session::builder().port(9008).build().unwrap();
        assert_eq!(session.dimensions(), None);
    }

    #[tokio::test]
    async fn test_connect_against_live_server() {
        let server = live_fixture().await;
        let session = session_for(&server);

        session.connect(false).await.expect("connect");
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_connect_unreachable_fails_within_probe() {
        let server = live_fixture().await;
        let port = server.port();
        drop(server);

        let session = Session::builder()
            .host("127.0.0.1")
            .port(port)
            .bridge(Arc::new(NullBridge))
            .build()
            .unwrap();

        let err = session.connect(false).await.expect_err("should fail");
        assert!(matches!(err, Error::ConnectionFailed { .. }));
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_auto_allocated_port_released_after_failed_connect() {
        let allocator = Arc::new(PortAllocator::with_base(39008));
        let session = Session::builder()
            .serial("emulator-5554")
            .allocator(Arc::clone(&allocator))
            .bridge(Arc::new(NullBridge))
            .build()
            .unwrap();

        let port = session.port();
        assert!(!allocator.is_available(port));

        let err = session.connect(false).await.expect_err("nothing listens there");
        assert!(matches!(err, Error::ConnectionFailed { .. }));

        // Still held until the caller disconnects or drops the session.
        assert!(!allocator.is_available(port));
        session.disconnect().await;
        assert!(allocator.is_available(port));
    }

    #[tokio::test]
    async fn test_disconnect_after_failed_connect_still_tears_down() {
        let allocator = Arc::new(PortAllocator::with_base(39008));
        let bridge = Arc::new(RecordingBridge::default());
        let session = Session::builder()
            .serial("emulator-5554")
            .allocator(Arc::clone(&allocator))
            .bridge(bridge.clone())
            .build()
            .unwrap();
        let port = session.port();

        // Nothing listens on the leased port, so the connect fails and the
        // session never reaches Connected.
        let err = session.connect(false).await.expect_err("should fail");
        assert!(matches!(err, Error::ConnectionFailed { .. }));
        assert!(!session.is_connected());

        session.disconnect().await;

        // The forward removal and remote kill still run: a failed attempt
        // may have left a forward or a server process behind.
        assert_eq!(*bridge.removed_log.lock(), vec![port]);
        assert_eq!(
            *bridge.shell_log.lock(),
            vec![BootstrapConfig::default().kill_command]
        );
        assert!(allocator.is_available(port));
    }

    #[tokio::test]
    async fn test_double_disconnect_releases_port_once() {
        let server = live_fixture().await;
        let allocator = Arc::new(PortAllocator::with_base(39008));

        let session = Session::builder()
            .host(server.host())
            .serial("emulator-5554")
            .allocator(Arc::clone(&allocator))
            .bridge(Arc::new(NullBridge))
            .build()
            .unwrap();
        let port = session.port();

        session.disconnect().await;
        session.disconnect().await;

        assert!(allocator.is_available(port));
        assert_eq!(allocator.held_count(), 0);

        // Port taken by someone else must survive further disconnects.
        let reused = allocator.allocate();
        assert_eq!(reused, port);
        session.disconnect().await;
        assert!(!allocator.is_available(port));
    }

    #[tokio::test]
    async fn test_abandoned_session_releases_port_on_drop() {
        let allocator = Arc::new(PortAllocator::with_base(39008));
        let port = {
            let session = Session::builder()
                .serial("emulator-5554")
                .allocator(Arc::clone(&allocator))
                .bridge(Arc::new(NullBridge))
                .build()
                .unwrap();
            session.port()
        };
        assert!(allocator.is_available(port));
    }

    #[tokio::test]
    async fn test_check_status_true_when_serving() {
        let server = live_fixture().await;
        let session = session_for(&server);
        assert!(session.check_status().await);
    }

    #[tokio::test]
    async fn test_check_status_false_when_unreachable() {
        let server = live_fixture().await;
        let port = server.port();
        drop(server);

        let session = Session::builder()
            .host("127.0.0.1")
            .port(port)
            .bridge(Arc::new(NullBridge))
            .build()
            .unwrap();
        assert!(!session.check_status().await);
    }

    #[tokio::test]
    async fn test_check_status_false_on_rpc_error() {
        let server = TestServer::spawn(|request| {
            if request.path == "/ping" {
                return CannedResponse::ok("pong");
            }
            CannedResponse::ok(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-1,"message":"hierarchy dump failed"}}"#,
            )
        })
        .await;
        let session = session_for(&server);
        assert!(!session.check_status().await);
    }

    #[tokio::test]
    async fn test_rpc_resignals_remote_error_as_server_error() {
        let server = TestServer::spawn(|request| {
            if request.path == "/ping" {
                return CannedResponse::ok("pong");
            }
            CannedResponse::ok(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32001,"message":"java exception"}}"#,
            )
        })
        .await;
        let session = session_for(&server);

        let err = session.rpc("deviceInfo", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::Server { .. }));
        assert_eq!(err.to_string(), "Server error: -32001: java exception");
    }
}
