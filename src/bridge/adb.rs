//! `adb` CLI device bridge.
//!
//! Shells out to the `adb` executable on the path (or a configured
//! location), capturing combined stdout+stderr for every invocation. When
//! the bridge is scoped to a serial, every command carries `-s <serial>` so
//! multi-device hosts address the right target.

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::{Bridge, DeviceEntry, DeviceState};

// ============================================================================
// Adb
// ============================================================================

/// Device bridge backed by the `adb` command-line tool.
///
/// # Example
///
/// ```no_run
/// use android_automator::bridge::{Adb, Bridge};
///
/// # async fn example() -> android_automator::Result<()> {
/// let adb = Adb::for_device("emulator-5554");
/// let devices = adb.devices().await?;
/// println!("{} device(s) attached", devices.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Adb {
    /// Path to the adb executable.
    executable: PathBuf,
    /// Target device serial, if scoped.
    serial: Option<String>,
}

impl Default for Adb {
    fn default() -> Self {
        Self::new()
    }
}

impl Adb {
    /// Creates a bridge using `adb` from the execution path, unscoped.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from("adb"),
            serial: None,
        }
    }

    /// Creates a bridge scoped to one device serial.
    #[inline]
    #[must_use]
    pub fn for_device(serial: impl Into<String>) -> Self {
        Self {
            executable: PathBuf::from("adb"),
            serial: Some(serial.into()),
        }
    }

    /// Overrides the adb executable location.
    #[inline]
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = path.into();
        self
    }

    /// Returns the serial this bridge is scoped to, if any.
    #[inline]
    #[must_use]
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Runs one adb invocation and captures its combined output.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the executable cannot be spawned
    /// - [`Error::ServerStartFailed`] if the command exits non-zero
    async fn run(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.executable);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.args(args);
        cmd.stdin(Stdio::null());

        trace!(?args, "Running bridge command");
        let output = cmd.output().await?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            debug!(?args, status = ?output.status, "Bridge command failed");
            return Err(Error::server_start_failed(combined.trim().to_string()));
        }

        Ok(combined)
    }
}

// ============================================================================
// Bridge Implementation
// ============================================================================

#[async_trait]
impl Bridge for Adb {
    async fn devices(&self) -> Result<Vec<DeviceEntry>> {
        let report = self.run(&["devices"]).await?;
        Ok(parse_devices(&report))
    }

    async fn push(&self, local: &Path, remote: &str) -> Result<String> {
        let local = local.to_string_lossy();
        let report = self.run(&["push", &local, remote]).await?;
        debug!(%local, remote, "Pushed file to device");
        Ok(report)
    }

    async fn shell(&self, command: &str) -> Result<String> {
        self.run(&["shell", command]).await
    }

    async fn forward(&self, local: u16, remote: u16) -> Result<()> {
        let local_spec = format!("tcp:{local}");
        let remote_spec = format!("tcp:{remote}");
        self.run(&["forward", &local_spec, &remote_spec]).await?;
        debug!(local, remote, "Port forward established");
        Ok(())
    }

    async fn remove_forward(&self, local: u16) -> Result<()> {
        let local_spec = format!("tcp:{local}");
        self.run(&["forward", "--remove", &local_spec]).await?;
        debug!(local, "Port forward removed");
        Ok(())
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses the `adb devices` report into entries.
///
/// The report starts with a `List of devices attached` header followed by
/// one `serial<TAB>state` row per device.
fn parse_devices(report: &str) -> Vec<DeviceEntry> {
    report
        .lines()
        .skip_while(|line| !line.starts_with("List of devices"))
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            Some(DeviceEntry {
                serial: serial.to_string(),
                state: DeviceState::parse(state),
            })
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
