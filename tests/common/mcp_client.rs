#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use roslyn_mcp::bridge::{FakeBridge, SolutionBridge};
use roslyn_mcp::config::Config;
use roslyn_mcp::server::{Core, McpServer};

/// In-process MCP test client backed by `tokio::io::duplex`, one JSON value
/// per line instead of LSP's Content-Length framing.
///
/// The server runs in a background task on the same tokio runtime, same
/// structure as the LSP test client this crate's tests are modeled on.
pub struct TestClient {
    write: tokio::io::DuplexStream,
    read: BufReader<tokio::io::DuplexStream>,
    _server: tokio::task::JoinHandle<()>,
    next_id: AtomicI64,
}

impl TestClient {
    /// Start a server backed by `bridge`, with no solution loaded yet.
    pub fn new(bridge: FakeBridge) -> Self {
        let bridge: Arc<dyn SolutionBridge> = Arc::new(bridge);
        let config = Config::from_env_vars(|_| None).unwrap();
        let core = Arc::new(Core::new(bridge, config));
        Self::with_core(core)
    }

    pub fn with_core(core: Arc<Core>) -> Self {
        let (client_write, server_read) = tokio::io::duplex(1 << 20);
        let (server_write, client_read) = tokio::io::duplex(1 << 20);

        let server = McpServer::new(core);
        let server_handle = tokio::spawn(async move {
            let service = server
                .serve((server_read, server_write))
                .await
                .expect("server failed to start");
            let _ = service.waiting().await;
        });

        Self {
            write: client_write,
            read: BufReader::new(client_read),
            _server: server_handle,
            next_id: AtomicI64::new(1),
        }
    }

    /// Send a raw JSON-RPC message, newline-delimited.
    pub async fn send(&mut self, msg: serde_json::Value) {
        let mut line = serde_json::to_string(&msg).unwrap();
        line.push('\n');
        self.write.write_all(line.as_bytes()).await.unwrap();
        self.write.flush().await.unwrap();
    }

    /// Receive the next newline-delimited JSON-RPC message.
    pub async fn recv(&mut self) -> serde_json::Value {
        let mut line = String::new();
        let n = self.read.read_line(&mut line).await.unwrap();
        assert!(n > 0, "server closed the connection without responding");
        serde_json::from_str(line.trim_end()).unwrap_or_else(|e| {
            panic!("invalid JSON-RPC line: {e}\nline: {line}");
        })
    }

    async fn recv_response_for(&mut self, id: i64) -> serde_json::Value {
        loop {
            let msg = self.recv().await;
            if msg.get("id") == Some(&serde_json::json!(id)) && msg.get("method").is_none() {
                return msg;
            }
        }
    }

    /// Send `initialize` and `notifications/initialized`; return the
    /// `InitializeResult` from the response.
    pub async fn initialize(&mut self) -> serde_json::Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "0.0.0" }
            }
        }))
        .await;

        let response = self.recv_response_for(id).await;

        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
            "params": {}
        }))
        .await;

        response["result"].clone()
    }

    /// Call a tool by name, returning the full JSON-RPC response.
    pub async fn call_tool_raw(&mut self, name: &str, arguments: serde_json::Value) -> serde_json::Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.send(serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }))
        .await;
        self.recv_response_for(id).await
    }

    /// Call a tool and parse its first text content block as JSON. Panics if
    /// the call itself errored at the protocol level (wrong params shape,
    /// unknown tool) since every in-band precondition failure is a structured
    /// success payload, not a protocol error.
    pub async fn call_tool(&mut self, name: &str, arguments: serde_json::Value) -> serde_json::Value {
        let response = self.call_tool_raw(name, arguments).await;
        if let Some(error) = response.get("error") {
            panic!("tool '{name}' returned a protocol error: {error}");
        }
        let text = response["result"]["content"][0]["text"]
            .as_str()
            .unwrap_or_else(|| panic!("tool '{name}' response has no text content: {response}"));
        serde_json::from_str(text).unwrap_or_else(|e| panic!("tool '{name}' did not return JSON: {e}\n{text}"))
    }
}
