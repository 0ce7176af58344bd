//! HTTP JSON-RPC client for the on-device automation server.
//!
//! Two operations make up the whole surface: a bounded liveness probe
//! against `GET /ping` and a procedure call against `POST /jsonrpc/0`.
//! Request ids are per-client-instance, monotonic from 1, and never reused
//! within the instance's lifetime. There is a single in-flight call per
//! invocation; the server is not required to correlate by id.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{Param, RpcRequest, RpcResponse, RpcValue};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for the liveness probe and every procedure call (5s).
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Health-check path on the automation server.
const PING_PATH: &str = "ping";

/// Procedure call path on the automation server.
const JSONRPC_PATH: &str = "jsonrpc/0";

/// Expected probe response body (after trimming whitespace).
const PONG: &str = "pong";

/// Client identifier sent with every request.
const CLIENT_IDENT: &str = concat!("android-automator/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// RpcClient
// ============================================================================

/// JSON-RPC client bound to one `host:port` target.
///
/// # Example
///
/// ```no_run
/// use android_automator::transport::RpcClient;
///
/// # async fn example() -> android_automator::Result<()> {
/// let client = RpcClient::new("127.0.0.1", 9008)?;
/// if client.probe().await {
///     let info = client.call("deviceInfo", Vec::new()).await?;
///     println!("{info:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RpcClient {
    /// Base URL of the server (`http://host:port/`).
    base: Url,
    /// Underlying HTTP client with the fixed request timeout.
    http: Client,
    /// Next request id to hand out.
    next_id: AtomicU64,
}

impl RpcClient {
    /// Creates a client targeting `http://{host}:{port}/`.
    ///
    /// No network activity happens here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the host does not form a valid URL or
    /// the HTTP client cannot be constructed.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let base = Url::parse(&format!("http://{host}:{port}/"))
            .map_err(|e| Error::config(format!("invalid server address {host}:{port}: {e}")))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(CLIENT_IDENT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base,
            http,
            next_id: AtomicU64::new(1),
        })
    }

    /// Returns the target the client was built against.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Url {
        &self.base
    }

    /// Issues a bounded liveness probe.
    ///
    /// Returns `true` only if `GET /ping` answers with a success status and
    /// a body equal to `"pong"` after trimming surrounding whitespace. Any
    /// network error, timeout, non-success status, or mismatched body
    /// yields `false`; this operation never errors.
    pub async fn probe(&self) -> bool {
        let url = match self.base.join(PING_PATH) {
            Ok(url) => url,
            Err(_) => return false,
        };

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                trace!(error = %e, "Probe request failed");
                return false;
            }
        };

        if !response.status().is_success() {
            trace!(status = %response.status(), "Probe returned non-success status");
            return false;
        }

        match response.text().await {
            Ok(body) => body.trim() == PONG,
            Err(_) => false,
        }
    }

    /// Invokes a remote procedure and decodes its result.
    ///
    /// # Errors
    ///
    /// - [`Error::Rpc`] when the response contains an error object
    /// - [`Error::Transport`] for HTTP status codes outside the success range
    /// - [`Error::Network`] for connection-level failures (DNS, refused,
    ///   timeout)
    pub async fn call(&self, method: &str, params: Vec<Param>) -> Result<RpcValue> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);

        let url = self
            .base
            .join(JSONRPC_PATH)
            .map_err(|e| Error::config(format!("invalid rpc path: {e}")))?;

        trace!(id, method, "Sending procedure call");

        // Send failures carry no HTTP status, so the conversion lands on
        // `Error::Network`.
        let response = self.http.post(url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(id, method, status = %status, "Procedure call rejected");
            return Err(Error::transport(status.as_u16()));
        }

        let decoded: RpcResponse = response
            .json()
            .await
            .map_err(|e| Error::network(format!("failed to decode response: {e}")))?;

        decoded.into_result()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CannedResponse, TestServer};

    fn client_for(server: &TestServer) -> RpcClient {
        RpcClient::new(&server.host(), server.port()).expect("build client")
    }

    #[test]
    fn test_new_rejects_invalid_host() {
        let result = RpcClient::new("not a host", 9008);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_probe_accepts_pong_with_trailing_newline() {
        let server = TestServer::spawn(|_| CannedResponse::ok("pong\n")).await;
        let client = client_for(&server);
        assert!(client.probe().await);
    }

    #[tokio::test]
    async fn test_probe_rejects_wrong_body() {
        let server = TestServer::spawn(|_| CannedResponse::ok("PONG")).await;
        let client = client_for(&server);
        assert!(!client.probe().await);
    }

    #[tokio::test]
    async fn test_probe_rejects_error_status() {
        let server = TestServer::spawn(|_| CannedResponse::with_status(500, "pong")).await;
        let client = client_for(&server);
        assert!(!client.probe().await);
    }

    #[tokio::test]
    async fn test_probe_false_on_unreachable_address() {
        // Bind-then-drop to get a port nothing is listening on.
        let server = TestServer::spawn(|_| CannedResponse::ok("pong")).await;
        let port = server.port();
        drop(server);

        let client = RpcClient::new("127.0.0.1", port).expect("build client");
        assert!(!client.probe().await);
    }

    #[tokio::test]
    async fn test_call_decodes_result() {
        let server = TestServer::spawn(|_| {
            CannedResponse::ok(r#"{"jsonrpc":"2.0","id":1,"result":"shell","error":null}"#)
        })
        .await;
        let client = client_for(&server);

        let value = client.call("currentPackageName", Vec::new()).await.unwrap();
        assert_eq!(value.as_str(), Some("shell"));
    }

    #[tokio::test]
    async fn test_call_ids_are_monotonic_from_one() {
        let mut server = TestServer::spawn(|request| {
            let parsed: serde_json::Value = serde_json::from_str(&request.body).unwrap();
            let id = parsed["id"].as_u64().unwrap();
            CannedResponse::ok(format!(
                r#"{{"jsonrpc":"2.0","id":{id},"result":null,"error":null}}"#
            ))
        })
        .await;
        let client = client_for(&server);

        client.call("deviceInfo", Vec::new()).await.unwrap();
        client.call("deviceInfo", Vec::new()).await.unwrap();
        client.call("deviceInfo", Vec::new()).await.unwrap();

        let ids: Vec<u64> = server
            .drain_requests()
            .iter()
            .map(|r| serde_json::from_str::<serde_json::Value>(&r.body).unwrap()["id"]
                .as_u64()
                .unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_call_posts_versioned_envelope() {
        let mut server = TestServer::spawn(|_| {
            CannedResponse::ok(r#"{"jsonrpc":"2.0","id":1,"result":null,"error":null}"#)
        })
        .await;
        let client = client_for(&server);

        client
            .call("pressKey", vec!["home".into()])
            .await
            .unwrap();

        let requests = server.drain_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/jsonrpc/0");

        let parsed: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(parsed["jsonrpc"], "2.0");
        assert_eq!(parsed["method"], "pressKey");
        assert_eq!(parsed["params"][0], "home");
    }

    #[tokio::test]
    async fn test_call_surfaces_remote_error() {
        let server = TestServer::spawn(|_| {
            CannedResponse::ok(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32001,"message":"java exception","data":null}}"#,
            )
        })
        .await;
        let client = client_for(&server);

        let err = client.call("deviceInfo", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::Rpc { code: -32001, .. }));
        assert_eq!(err.to_string(), "-32001: java exception");
    }

    #[tokio::test]
    async fn test_call_maps_http_failure_to_transport_error() {
        let server = TestServer::spawn(|_| CannedResponse::with_status(500, "oops")).await;
        let client = client_for(&server);

        let err = client.call("deviceInfo", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::Transport { status: 500 }));
    }

    #[tokio::test]
    async fn test_call_maps_refused_connection_to_network_error() {
        let server = TestServer::spawn(|_| CannedResponse::ok("")).await;
        let port = server.port();
        drop(server);

        let client = RpcClient::new("127.0.0.1", port).expect("build client");
        let err = client.call("deviceInfo", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::Network { .. }));
    }
}
