//! Device bridge abstraction.
//!
//! The session lifecycle manager talks to the device through a narrow
//! command surface: list devices, push a file, run a shell command, and
//! manage port forwards. [`Bridge`] captures exactly that surface so the
//! lifecycle manager can be exercised against a recording fake in tests;
//! [`Adb`] is the production implementation shelling out to the `adb` CLI.

// ============================================================================
// Submodules
// ============================================================================

/// `adb` CLI implementation.
pub mod adb;

// ============================================================================
// Re-exports
// ============================================================================

pub use adb::Adb;

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// DeviceState
// ============================================================================

/// Connection state of a device as reported by the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    /// Attached and usable.
    Device,
    /// Attached but offline.
    Offline,
    /// Attached but not authorized for debugging.
    Unauthorized,
    /// Any other state string the bridge reports.
    Other(String),
}

impl DeviceState {
    /// Parses a state token from the device listing.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token {
            "device" => Self::Device,
            "offline" => Self::Offline,
            "unauthorized" => Self::Unauthorized,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns `true` if the device can accept commands.
    #[inline]
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Device)
    }
}

// ============================================================================
// DeviceEntry
// ============================================================================

/// One row of the device listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    /// Device serial.
    pub serial: String,
    /// Reported state.
    pub state: DeviceState,
}

// ============================================================================
// Bridge Trait
// ============================================================================

/// Command surface the lifecycle manager needs from the device bridge.
///
/// All operations are synchronous external-process calls from the caller's
/// point of view: the returned string is the command's combined
/// stdout+stderr. A nonzero exit status surfaces as
/// [`Error::ServerStartFailed`](crate::Error::ServerStartFailed) unless the
/// call site explicitly tolerates failure.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Lists attached devices.
    async fn devices(&self) -> Result<Vec<DeviceEntry>>;

    /// Pushes a local file to a path on the device.
    ///
    /// Returns the transfer report; success is indicated by the `pushed`
    /// substring in the output.
    async fn push(&self, local: &Path, remote: &str) -> Result<String>;

    /// Runs a shell command on the device.
    async fn shell(&self, command: &str) -> Result<String>;

    /// Forwards a local TCP port to a port on the device.
    async fn forward(&self, local: u16, remote: u16) -> Result<()>;

    /// Removes a local port forward.
    async fn remove_forward(&self, local: u16) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================
