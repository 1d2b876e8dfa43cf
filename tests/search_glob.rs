mod common;

use common::{class_symbol, source_location, TestClient};
use roslyn_mcp::bridge::FakeBridge;

/// `*Handler` matches names ending in Handler but not ones merely containing
/// it as a prefix, and the match is case-insensitive.
#[tokio::test]
async fn glob_search_matches_suffix_pattern_case_insensitively() {
    let symbols = vec![
        class_symbol("sym#1", "OrderHandler", source_location("A.cs".as_ref(), 0, 0, 0, 1)),
        class_symbol("sym#2", "orderhandler", source_location("B.cs".as_ref(), 0, 0, 0, 1)),
        class_symbol("sym#3", "HandlerFactory", source_location("C.cs".as_ref(), 0, 0, 0, 1)),
    ];

    let bridge = FakeBridge::new().with_symbols(symbols);
    let mut client = TestClient::new(bridge);
    client.initialize().await;

    let result = client
        .call_tool("search_symbols", serde_json::json!({ "query": "*Handler" }))
        .await;

    assert_eq!(result["total_count"], 2);
    let names: Vec<String> = result["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert!(names.contains(&"OrderHandler".to_string()));
    assert!(names.contains(&"orderhandler".to_string()));
    assert!(!names.contains(&"HandlerFactory".to_string()));
}

/// Symbols with no source location (metadata-only) are never returned by
/// search, regardless of name match.
#[tokio::test]
async fn search_excludes_symbols_without_source_location() {
    let mut implicit = class_symbol("sym#1", "CompilerGenerated", source_location("A.cs".as_ref(), 0, 0, 0, 1));
    implicit.locations = vec![];

    let bridge = FakeBridge::new().with_symbols(vec![implicit]);
    let mut client = TestClient::new(bridge);
    client.initialize().await;

    let result = client
        .call_tool("search_symbols", serde_json::json!({ "query": "Compiler" }))
        .await;

    assert_eq!(result["total_count"], 0);
}
