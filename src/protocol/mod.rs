//! JSON-RPC wire protocol types.
//!
//! This module defines the message format spoken with the on-device
//! automation server.
//!
//! # Wire Contract
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Session (Rust) │   POST /jsonrpc/0            │  Automation     │
//! │                 │─────────────────────────────►│  Server         │
//! │  RpcRequest     │      localhost:PORT          │  (on device,    │
//! │  → RpcResponse  │◄─────────────────────────────│   via forward)  │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! Parameters are restricted to flat primitives ([`Param`]); results decode
//! into a closed tagged union ([`RpcValue`]). One request per exchange, no
//! pipelining; the id is still monotonic per transport instance.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `request` | Request/response/error message types |
//! | `value` | Primitive parameter and result unions |

// ============================================================================
// Submodules
// ============================================================================

/// Request and response message types.
pub mod request;

/// Primitive value unions.
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use request::{JSONRPC_VERSION, RpcError, RpcRequest, RpcResponse};
pub use value::{Param, RpcValue};
