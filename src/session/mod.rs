//! Session layer: lifecycle, gestures, and the façade.
//!
//! One [`Session`] per device. The lifecycle manager owns the path from
//! "nothing running" to a verified connection (probe, artifact deployment,
//! process launch, port forward, readiness polling); the touch and key
//! modules turn high-level intents into ordered procedure calls.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | Session configuration and port selection |
//! | `core` | The [`Session`] façade |
//! | `deploy` | Artifact fetch and hash comparison |
//! | `keys` | Key-event operations |
//! | `lifecycle` | Connect/bootstrap/verify/teardown state machine |
//! | `touch` | Touch primitives and composite gestures |

// ============================================================================
// Submodules
// ============================================================================

/// Session configuration builder.
pub mod builder;

/// Session façade.
pub mod core;

/// Server artifact deployment helpers.
mod deploy;

/// Key-event operations.
pub mod keys;

/// Session lifecycle state machine.
pub mod lifecycle;

/// Touch gesture sequencing.
pub mod touch;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{DEFAULT_HOST, DEFAULT_LOCAL_PORT, SessionBuilder};
pub use lifecycle::REMOTE_SERVER_PORT;
pub use self::core::{Session, SessionState};
