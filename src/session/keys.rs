//! Key-event operations.
//!
//! Parallel to the touch path but not part of a gesture chain: each key
//! press is a single procedure call. Keys are addressed either by server
//! name (`"home"`, `"back"`) or by Android key code with an optional meta
//! modifier mask.

// ============================================================================
// Imports
// ============================================================================

use tracing::trace;

use crate::error::Result;
use crate::protocol::Param;

use super::core::Session;

// ============================================================================
// Session - Key Events
// ============================================================================

impl Session {
    /// Presses a key by server-defined name.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`](crate::Error::NotConnected) if the session
    /// is not connected, [`Error::Server`](crate::Error::Server) if the
    /// device rejects the key.
    pub async fn press_key(&self, name: &str) -> Result<()> {
        self.ensure_connected()?;
        trace!(name, "Pressing key by name");
        self.rpc("pressKey", vec![name.into()]).await?;
        Ok(())
    }

    /// Presses a key by Android key code.
    ///
    /// The modifier mask is appended as a second parameter only when
    /// supplied.
    pub async fn press_key_code(&self, code: i32, meta: Option<i32>) -> Result<()> {
        self.ensure_connected()?;
        trace!(code, ?meta, "Pressing key by code");

        let mut params: Vec<Param> = vec![code.into()];
        if let Some(meta) = meta {
            params.push(meta.into());
        }
        self.rpc("pressKeyCode", params).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
