//! HTTP transport layer.
//!
//! The automation server exposes two endpoints once reachable through the
//! `adb forward` relay:
//!
//! - `GET /ping` — liveness check, answers `pong`
//! - `POST /jsonrpc/0` — procedure calls ([`crate::protocol`])
//!
//! [`RpcClient`] wraps both behind a fixed 5s request timeout. The session
//! lifecycle manager uses the probe for readiness polling; everything else
//! goes through [`RpcClient::call`].

// ============================================================================
// Submodules
// ============================================================================

/// JSON-RPC over HTTP client.
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::RpcClient;
