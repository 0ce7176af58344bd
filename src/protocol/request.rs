//! JSON-RPC 2.0 request and response message types.
//!
//! Defines the message format exchanged with the on-device automation
//! server over `POST /jsonrpc/0`.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

use super::{Param, RpcValue};

// ============================================================================
// Constants
// ============================================================================

/// Protocol version tag carried by every request and response.
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// RpcRequest
// ============================================================================

/// A procedure call request.
///
/// # Format
///
/// ```json
/// {
///   "jsonrpc": "2.0",
///   "id": 1,
///   "method": "injectInputEvent",
///   "params": [0, 540, 960, 0]
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Protocol version tag, always `"2.0"`.
    pub jsonrpc: &'static str,

    /// Per-transport monotonically increasing request id, starting at 1.
    pub id: u64,

    /// Remote method name.
    pub method: String,

    /// Positional primitive parameters.
    pub params: Vec<Param>,
}

impl RpcRequest {
    /// Creates a request with the given id, method, and parameters.
    #[inline]
    #[must_use]
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

// ============================================================================
// RpcResponse
// ============================================================================

/// A procedure call response.
///
/// # Format
///
/// ```json
/// {
///   "jsonrpc": "2.0",
///   "id": 1,
///   "result": null,
///   "error": {"code": -32001, "message": "java exception", "data": null}
/// }
/// ```
///
/// Exactly one of `result` and `error` is meaningful; a non-null `error`
/// always wins.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    /// Protocol version tag echoed by the server.
    #[serde(default)]
    pub jsonrpc: String,

    /// Matches the request `id`.
    pub id: u64,

    /// Result value (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error object (if failure).
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Returns `true` if the response carries an error object.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the decoded result, or the remote error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rpc`] carrying the remote-supplied code and message
    /// when the response contains an error object.
    pub fn into_result(self) -> Result<RpcValue> {
        match self.error {
            Some(err) => Err(Error::rpc(err.code, err.message)),
            None => Ok(RpcValue::decode(self.result.as_ref())),
        }
    }
}

// ============================================================================
// RpcError
// ============================================================================

/// Remote error object embedded in a response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    /// Remote-supplied error code.
    pub code: i64,

    /// Remote-supplied error message.
    pub message: String,

    /// Optional additional detail (stack trace on the device side).
    #[serde(default)]
    pub data: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
