//! Server artifact deployment helpers.
//!
//! The automation server ships as a jar that must be present on the device
//! before it can be launched. Deployment is content-addressed: the freshly
//! fetched artifact is hashed locally and compared against the on-device
//! copy's digest, and the transfer only happens on mismatch.

// ============================================================================
// Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use futures_util::StreamExt;
use regex::Regex;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Matches a SHA-256 hex digest in remote hash-command output.
static DIGEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9a-f]{64}").expect("digest regex"));

// ============================================================================
// Public Functions
// ============================================================================

/// Downloads the server artifact to a local temporary file.
///
/// The file is removed automatically when the returned handle is dropped,
/// so nothing persists past the transfer.
///
/// # Errors
///
/// Returns [`Error::JarDeploymentFailed`] if the download fails or answers
/// with a non-success status, and [`Error::Io`] if the temporary file
/// cannot be written.
pub(crate) async fn fetch_artifact(url: &str) -> Result<NamedTempFile> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| Error::jar_deployment(format!("fetch {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::jar_deployment(format!(
            "fetch {url}: HTTP status {}",
            response.status()
        )));
    }

    let mut file = NamedTempFile::new()?;
    let mut stream = response.bytes_stream();
    let mut total = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::jar_deployment(format!("fetch {url}: {e}")))?;
        file.write_all(&chunk)?;
        total += chunk.len();
    }
    file.flush()?;

    debug!(url, bytes = total, "Fetched server artifact");
    Ok(file)
}

/// Computes the SHA-256 digest of a local file as lowercase hex.
pub(crate) async fn sha256_file(path: &Path) -> Result<String> {
    let contents = tokio::fs::read(path).await?;
    let digest = Sha256::digest(&contents);

    let mut hex = String::with_capacity(64);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    Ok(hex)
}

/// Extracts a SHA-256 digest from remote hash-command output.
///
/// Returns `None` when the output carries no digest, which callers treat
/// as a hash mismatch (safe default: redeploy).
pub(crate) fn extract_digest(report: &str) -> Option<String> {
    DIGEST_RE
        .find(&report.to_ascii_lowercase())
        .map(|m| m.as_str().to_string())
}

// ============================================================================
// Tests
// ============================================================================
