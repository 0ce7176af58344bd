//! Session lifecycle management.
//!
//! One [`Lifecycle`] drives a session's connection state machine:
//!
//! ```text
//! Idle ──► Probing ──► Connected
//!             │
//!             ▼
//!        Bootstrapping ──► Verifying ──► Connected
//!             │                 │
//!             ▼                 ▼
//!           Failed            Failed
//! ```
//!
//! Probing asks the configured target whether a functional server is
//! already reachable. Bootstrapping deploys the server artifact to the
//! device (hash-compared, pushed only on mismatch), restarts the server
//! process, and establishes the local port forward. Verifying polls the
//! health endpoint until the freshly launched server answers.
//!
//! Teardown is strictly best-effort and never fails loudly.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::bridge::Bridge;
use crate::error::{Error, Result};
use crate::transport::RpcClient;

use super::deploy;

// ============================================================================
// Constants
// ============================================================================

/// Port the automation server listens on, on the device side.
pub const REMOTE_SERVER_PORT: u16 = 9008;

/// Release URL of the automation-server jar.
const ARTIFACT_URL: &str =
    "https://github.com/openatx/android-uiautomator-server/releases/download/v2.3.3/automator-server.jar";

/// On-device path the jar is deployed to.
const REMOTE_JAR_PATH: &str = "/data/local/tmp/automator-server.jar";

/// Detached launch command for the server process.
const LAUNCH_COMMAND: &str = "nohup uiautomator runtest automator-server.jar \
     -c com.github.uiautomatorstub.Stub >/dev/null 2>&1 &";

/// Best-effort kill of any pre-existing server process.
const KILL_COMMAND: &str = "pkill -f uiautomator";

/// Remote hash command for the deployed jar.
const HASH_COMMAND: &str = "sha256sum /data/local/tmp/automator-server.jar";

/// Delay after launching the server before the forward/verify steps (3s).
const SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Readiness poll schedule: 10 attempts, 1s apart.
const READY_ATTEMPTS: u32 = 10;
const READY_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// BootstrapConfig
// ============================================================================

/// Fixed bootstrap parameters.
///
/// Defaults carry the production constants; tests substitute a local
/// artifact URL and compressed timings.
#[derive(Debug, Clone)]
pub(crate) struct BootstrapConfig {
    /// Where to fetch the server artifact from.
    pub artifact_url: String,
    /// On-device deployment path.
    pub remote_jar_path: String,
    /// Shell command that launches the server detached.
    pub launch_command: String,
    /// Shell command that kills a pre-existing server (best-effort).
    pub kill_command: String,
    /// Shell command producing the on-device artifact digest.
    pub hash_command: String,
    /// Remote port the server listens on.
    pub remote_port: u16,
    /// Settle delay after launch.
    pub settle_delay: Duration,
    /// Number of readiness probe attempts.
    pub ready_attempts: u32,
    /// Interval between readiness probes.
    pub ready_interval: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            artifact_url: ARTIFACT_URL.to_string(),
            remote_jar_path: REMOTE_JAR_PATH.to_string(),
            launch_command: LAUNCH_COMMAND.to_string(),
            kill_command: KILL_COMMAND.to_string(),
            hash_command: HASH_COMMAND.to_string(),
            remote_port: REMOTE_SERVER_PORT,
            settle_delay: SETTLE_DELAY,
            ready_attempts: READY_ATTEMPTS,
            ready_interval: READY_INTERVAL,
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Connection state machine for one session.
///
/// Borrows the session's transport, bridge, and configuration; holds no
/// state of its own. The owning session records the resulting connection
/// state.
pub(crate) struct Lifecycle<'a> {
    /// Transport to the (possibly not yet running) server.
    client: &'a RpcClient,
    /// Device bridge for shell-outs.
    bridge: &'a dyn Bridge,
    /// Target device serial, if the session is scoped to one.
    serial: Option<&'a str>,
    /// Local end of the port forward.
    local_port: u16,
    /// Bootstrap parameters.
    config: &'a BootstrapConfig,
}

impl<'a> Lifecycle<'a> {
    /// Creates a lifecycle driver over the session's collaborators.
    pub fn new(
        client: &'a RpcClient,
        bridge: &'a dyn Bridge,
        serial: Option<&'a str>,
        local_port: u16,
        config: &'a BootstrapConfig,
    ) -> Self {
        Self {
            client,
            bridge,
            serial,
            local_port,
            config,
        }
    }

    /// Drives the state machine until the server is reachable.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionFailed`] if probing fails and bootstrap is off
    /// - [`Error::DeviceNotConnected`] if no usable device is attached
    /// - [`Error::JarDeploymentFailed`] if the artifact cannot be deployed
    /// - [`Error::ServerStartFailed`] if a required shell-out exits non-zero
    /// - [`Error::ServerNotReady`] if readiness polling is exhausted
    pub async fn connect(&self, auto_bootstrap: bool) -> Result<()> {
        debug!(target = %self.client.target(), "Probing for running server");

        if self.probe_functional().await {
            info!(target = %self.client.target(), "Server already running");
            return Ok(());
        }

        if !auto_bootstrap {
            return Err(Error::connection_failed(format!(
                "probe failed for {}",
                self.client.target()
            )));
        }

        self.bootstrap().await?;

        self.bridge
            .forward(self.local_port, self.config.remote_port)
            .await?;
        debug!(
            local = self.local_port,
            remote = self.config.remote_port,
            "Port forward established"
        );

        self.verify().await
    }

    /// Best-effort teardown of the remote server and port forward.
    ///
    /// Never fails: individual failures are logged and swallowed.
    pub async fn teardown(&self) {
        if let Err(e) = self.bridge.shell(&self.config.kill_command).await {
            debug!(error = %e, "Server kill failed during teardown (ignored)");
        }
        if let Err(e) = self.bridge.remove_forward(self.local_port).await {
            debug!(error = %e, "Forward removal failed during teardown (ignored)");
        }
        info!(local = self.local_port, "Session torn down");
    }

    /// Probes liveness and confirms the server is functional.
    ///
    /// The probe alone only proves something answers `/ping`; the follow-up
    /// `deviceInfo` call confirms it speaks the procedure protocol.
    async fn probe_functional(&self) -> bool {
        if !self.client.probe().await {
            return false;
        }
        match self.client.call("deviceInfo", Vec::new()).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Server answered ping but not deviceInfo");
                false
            }
        }
    }

    /// Deploys and launches the server on the device.
    async fn bootstrap(&self) -> Result<()> {
        info!(serial = ?self.serial, "Bootstrapping automation server");

        self.ensure_device().await?;
        self.ensure_artifact().await?;

        // Clear out any stale server before launching a fresh one.
        if let Err(e) = self.bridge.shell(&self.config.kill_command).await {
            debug!(error = %e, "Pre-launch kill failed (ignored)");
        }

        self.bridge.shell(&self.config.launch_command).await?;
        info!("Server process launched, settling");
        sleep(self.config.settle_delay).await;

        Ok(())
    }

    /// Verifies the target device is attached and usable.
    async fn ensure_device(&self) -> Result<()> {
        let devices = self.bridge.devices().await?;

        let usable = match self.serial {
            Some(serial) => devices
                .iter()
                .any(|d| d.serial == serial && d.state.is_usable()),
            None => devices.iter().any(|d| d.state.is_usable()),
        };

        if !usable {
            return Err(Error::device_not_connected(self.serial));
        }
        Ok(())
    }

    /// Ensures the server artifact is present and current on the device.
    ///
    /// Fetches a fresh copy, hashes it, and compares against the on-device
    /// digest. A missing or unparseable remote digest counts as a mismatch
    /// and forces a redeploy.
    async fn ensure_artifact(&self) -> Result<()> {
        let artifact = deploy::fetch_artifact(&self.config.artifact_url).await?;
        let local_digest = deploy::sha256_file(artifact.path()).await?;

        let remote_report = self
            .bridge
            .shell(&self.config.hash_command)
            .await
            .unwrap_or_default();
        let remote_digest = deploy::extract_digest(&remote_report);

        if remote_digest.as_deref() == Some(local_digest.as_str()) {
            debug!(digest = %local_digest, "On-device artifact is current, skipping push");
            return Ok(());
        }

        debug!(
            local = %local_digest,
            remote = ?remote_digest,
            "Artifact digest mismatch, deploying"
        );

        let report = self
            .bridge
            .push(artifact.path(), &self.config.remote_jar_path)
            .await
            .map_err(|e| Error::jar_deployment(e.to_string()))?;

        if !report.contains("pushed") {
            return Err(Error::jar_deployment(report.trim().to_string()));
        }

        info!(path = %self.config.remote_jar_path, "Artifact deployed");
        Ok(())
    }

    /// Polls the health endpoint until the server answers.
    async fn verify(&self) -> Result<()> {
        for attempt in 1..=self.config.ready_attempts {
            if self.client.probe().await {
                info!(attempt, "Server ready");
                return Ok(());
            }
            debug!(
                attempt,
                max = self.config.ready_attempts,
                "Server not ready yet"
            );
            if attempt < self.config.ready_attempts {
                sleep(self.config.ready_interval).await;
            }
        }

        Err(Error::server_not_ready(self.config.ready_attempts))
    }
}

// ============================================================================
// Tests
// ============================================================================
