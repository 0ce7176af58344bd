//! Error types for the Android automation client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use android_automator::{Result, Session};
//!
//! async fn example(session: &Session) -> Result<()> {
//!     session.connect(true).await?;
//!     session.tap(540, 960).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::ConnectionFailed`], [`Error::NotConnected`] |
//! | Remote | [`Error::Server`], [`Error::Rpc`] |
//! | Bootstrap | [`Error::DeviceNotConnected`], [`Error::JarDeploymentFailed`], [`Error::ServerStartFailed`], [`Error::ServerNotReady`] |
//! | Transport | [`Error::Transport`], [`Error::Network`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when session configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection could not be established.
    ///
    /// Returned when probing (and bootstrapping, if attempted) failed to
    /// reach a live server. The message names the stage that failed.
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Description of the stage that failed.
        message: String,
    },

    /// Operation attempted on a session that is not connected.
    ///
    /// Returned before any network call is issued.
    #[error("Session is not connected")]
    NotConnected,

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// The automation server reported an application-level error.
    ///
    /// Returned from gesture and key operations when the remote procedure
    /// call fails on the device.
    #[error("Server error: {message}")]
    Server {
        /// Error message from the automation server.
        message: String,
    },

    /// A remote procedure call returned an error object.
    ///
    /// Raw transport-layer form of [`Error::Server`]; the session façade
    /// re-signals it with the `code: message` concatenation.
    #[error("{code}: {message}")]
    Rpc {
        /// Remote-supplied error code.
        code: i64,
        /// Remote-supplied error message.
        message: String,
    },

    // ========================================================================
    // Bootstrap Errors
    // ========================================================================
    /// No usable target device reported by the device bridge.
    ///
    /// Returned when the device is absent, offline, or unauthorized.
    #[error("Device not connected{}", serial.as_deref().map(|s| format!(": {s}")).unwrap_or_default())]
    DeviceNotConnected {
        /// Serial of the missing device, if one was requested.
        serial: Option<String>,
    },

    /// Server artifact fetch or transfer did not succeed.
    #[error("Jar deployment failed: {message}")]
    JarDeploymentFailed {
        /// Description of the deployment failure.
        message: String,
    },

    /// An external process invocation exited non-zero.
    ///
    /// Returned from device-bridge commands where failure is not tolerated.
    #[error("Server start failed: {output}")]
    ServerStartFailed {
        /// Combined stdout+stderr of the failed command.
        output: String,
    },

    /// Readiness polling exhausted without a successful probe.
    #[error("Server not ready after {attempts} attempts")]
    ServerNotReady {
        /// Number of probe attempts made.
        attempts: u32,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// HTTP status outside the success range.
    #[error("Transport error: HTTP status {status}")]
    Transport {
        /// The HTTP status code received.
        status: u16,
    },

    /// Connection-level network failure (DNS, refused, timeout).
    #[error("Network error: {message}")]
    Network {
        /// Description of the network failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection failed error.
    #[inline]
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Creates a server error.
    #[inline]
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Creates a remote procedure error.
    #[inline]
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Creates a device not connected error.
    #[inline]
    pub fn device_not_connected(serial: Option<&str>) -> Self {
        Self::DeviceNotConnected {
            serial: serial.map(str::to_string),
        }
    }

    /// Creates a jar deployment error.
    #[inline]
    pub fn jar_deployment(message: impl Into<String>) -> Self {
        Self::JarDeploymentFailed {
            message: message.into(),
        }
    }

    /// Creates a server start failed error.
    #[inline]
    pub fn server_start_failed(output: impl Into<String>) -> Self {
        Self::ServerStartFailed {
            output: output.into(),
        }
    }

    /// Creates a server not ready error.
    #[inline]
    pub fn server_not_ready(attempts: u32) -> Self {
        Self::ServerNotReady { attempts }
    }

    /// Creates a transport error from an HTTP status code.
    #[inline]
    pub fn transport(status: u16) -> Self {
        Self::Transport { status }
    }

    /// Creates a network error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::NotConnected
                | Self::Transport { .. }
                | Self::Network { .. }
        )
    }

    /// Returns `true` if the error was reported by the remote server.
    #[inline]
    #[must_use]
    pub fn is_remote_error(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Rpc { .. })
    }

    /// Returns `true` if the error arose during bootstrap.
    #[inline]
    #[must_use]
    pub fn is_bootstrap_error(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotConnected { .. }
                | Self::JarDeploymentFailed { .. }
                | Self::ServerStartFailed { .. }
                | Self::ServerNotReady { .. }
        )
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Transport {
                status: status.as_u16(),
            },
            None => Self::Network {
                message: err.to_string(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
