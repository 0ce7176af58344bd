//! Android Automator - Remote-control client for Android devices.
//!
//! This library drives the on-device automation server over its JSON-RPC
//! HTTP protocol: it finds or bootstraps the server, then issues discrete
//! input commands (touch gestures, key presses) and polls for liveness.
//!
//! # Architecture
//!
//! The client follows a session-per-device model:
//!
//! - **Local End (Rust)**: probes, bootstraps, and sends procedure calls
//! - **Remote End (Device)**: automation server answering `/ping` and
//!   `/jsonrpc/0` behind an `adb forward` relay
//!
//! Key design principles:
//!
//! - Each [`Session`] owns: transport + device bridge + connection state +
//!   (optionally) a leased local port
//! - Gestures execute eagerly and chain fluently; nothing is batched
//! - Bootstrap is content-addressed: the server jar is pushed only when
//!   the on-device digest differs
//! - Many sessions run concurrently; the port allocator is the only shared
//!   state between them
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use android_automator::{PortAllocator, Result, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let allocator = Arc::new(PortAllocator::new());
//!
//!     // One session per device; the local port is leased automatically.
//!     let session = Session::builder()
//!         .serial("emulator-5554")
//!         .allocator(allocator)
//!         .build()?;
//!
//!     // Detects a running server or deploys and starts one.
//!     session.connect(true).await?;
//!
//!     // Gestures chain fluently and execute in order.
//!     session.tap(540, 960).await?;
//!     session.swipe(100, 1600, 100, 400).await?;
//!     session.press_key("back").await?;
//!
//!     session.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Device bridge: [`Bridge`] trait and the [`Adb`] CLI impl |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`ports`] | Local port allocation: [`PortAllocator`], [`PortLease`] |
//! | [`protocol`] | JSON-RPC wire types (internal) |
//! | [`session`] | Session façade, lifecycle, gestures, keys |
//! | [`transport`] | HTTP transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Device bridge abstraction and `adb` implementation.
///
/// The narrow command surface the lifecycle manager needs from the device.
pub mod bridge;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Local forward-port allocation.
///
/// Process-wide registry with RAII leases for exactly-once release.
pub mod ports;

/// JSON-RPC wire protocol types.
///
/// Internal module defining request/response structures and value unions.
pub mod protocol;

/// Session layer: lifecycle, gestures, and the façade.
pub mod session;

/// HTTP transport layer.
///
/// Internal module handling the liveness probe and procedure calls.
pub mod transport;

/// In-crate HTTP fixture for tests.
#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{Adb, Bridge, DeviceEntry, DeviceState};

// Error types
pub use error::{Error, Result};

// Port types
pub use ports::{PortAllocator, PortLease};

// Protocol types
pub use protocol::{Param, RpcValue};

// Session types
pub use session::{Session, SessionBuilder, SessionState};

// Transport types
pub use transport::RpcClient;
