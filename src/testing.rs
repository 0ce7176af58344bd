//! In-crate HTTP fixture for transport and lifecycle tests.
//!
//! Binds a real `TcpListener` on a random localhost port, answers each
//! HTTP/1.1 request with a canned response chosen by the test, and records
//! every request (method, path, body) on a channel so tests can assert on
//! call ordering and payloads.

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ============================================================================
// Types
// ============================================================================

/// One request as seen by the fixture.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    /// HTTP method (`GET`, `POST`).
    pub method: String,
    /// Request path (`/ping`, `/jsonrpc/0`).
    pub path: String,
    /// Raw request body.
    pub body: String,
}

/// The response a test chooses to send back.
#[derive(Debug, Clone)]
pub(crate) struct CannedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl CannedResponse {
    /// 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Response with an explicit status code.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Responder callback: inspects a request, returns the canned response.
type Responder = Arc<dyn Fn(&RecordedRequest) -> CannedResponse + Send + Sync>;

// ============================================================================
// TestServer
// ============================================================================

/// A localhost HTTP server driven entirely by the test.
pub(crate) struct TestServer {
    /// Bound address of the listener.
    pub addr: SocketAddr,
    /// Requests in arrival order.
    pub requests: mpsc::UnboundedReceiver<RecordedRequest>,
    /// Accept-loop task, aborted on drop.
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Binds to a random port and starts serving with the given responder.
    pub async fn spawn<F>(respond: F) -> Self
    where
        F: Fn(&RecordedRequest) -> CannedResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture listener");
        let addr = listener.local_addr().expect("fixture local addr");

        let (record_tx, requests) = mpsc::unbounded_channel();
        let respond: Responder = Arc::new(respond);

        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let respond = Arc::clone(&respond);
                let record_tx = record_tx.clone();
                tokio::spawn(serve_connection(stream, respond, record_tx));
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    /// Host string for building a client against this fixture.
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Port the fixture listens on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Drains all requests recorded so far without waiting.
    pub fn drain_requests(&mut self) -> Vec<RecordedRequest> {
        let mut drained = Vec::new();
        while let Ok(request) = self.requests.try_recv() {
            drained.push(request);
        }
        drained
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================================================
// Connection Handling
// ============================================================================

/// Serves HTTP/1.1 requests on one connection until it closes.
async fn serve_connection(
    mut stream: TcpStream,
    respond: Responder,
    record_tx: mpsc::UnboundedSender<RecordedRequest>,
) {
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        let Some(request) = read_request(&mut stream, &mut buffer).await else {
            break;
        };

        let response = respond(&request);
        let _ = record_tx.send(request);

        let reason = match response.status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Status",
        };
        let raw = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: keep-alive\r\n\r\n{}",
            response.status,
            reason,
            response.body.len(),
            response.body
        );

        if stream.write_all(raw.as_bytes()).await.is_err() {
            break;
        }
    }
}

/// Reads one request (headers + body) from the stream.
///
/// Returns `None` when the peer closes the connection.
async fn read_request(stream: &mut TcpStream, buffer: &mut Vec<u8>) -> Option<RecordedRequest> {
    // Fill until the header terminator is present.
    let header_end = loop {
        if let Some(pos) = find_subsequence(buffer, b"\r\n\r\n") {
            break pos;
        }
        let mut chunk = [0u8; 4096];
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        }
    };

    let header_text = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = header_text.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let content_length = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .next()
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buffer.len() < body_start + content_length {
        let mut chunk = [0u8; 4096];
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        }
    }

    let body = String::from_utf8_lossy(&buffer[body_start..body_start + content_length]).to_string();
    buffer.drain(..body_start + content_length);

    Some(RecordedRequest { method, path, body })
}

/// Finds the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

// ============================================================================
// NullBridge
// ============================================================================

/// Device bridge that accepts everything and does nothing.
///
/// Used by session-level tests that never reach the bootstrap path but
/// still tear down through the bridge.
pub(crate) struct NullBridge;

#[async_trait::async_trait]
impl crate::bridge::Bridge for NullBridge {
    async fn devices(&self) -> crate::Result<Vec<crate::bridge::DeviceEntry>> {
        Ok(Vec::new())
    }

    async fn push(&self, _local: &std::path::Path, _remote: &str) -> crate::Result<String> {
        Ok(String::new())
    }

    async fn shell(&self, _command: &str) -> crate::Result<String> {
        Ok(String::new())
    }

    async fn forward(&self, _local: u16, _remote: u16) -> crate::Result<()> {
        Ok(())
    }

    async fn remove_forward(&self, _local: u16) -> crate::Result<()> {
        Ok(())
    }
}
