mod common;

use common::TestClient;
use roslyn_mcp::bridge::FakeBridge;

/// Verifies the initialize / initialized handshake and that health_check
/// reports "Not Ready" before any solution is loaded.
#[tokio::test]
async fn initialize_then_health_check_reports_not_ready() {
    let mut client = TestClient::new(FakeBridge::new());
    let result = client.initialize().await;

    assert!(result["serverInfo"]["name"].as_str().is_some_and(|n| !n.is_empty()));
    assert!(result["capabilities"]["tools"].is_object());

    let health = client.call_tool("health_check", serde_json::json!({})).await;
    assert_eq!(health["status"], "Not Ready");
    assert_eq!(health["project_count"], 0);
}
