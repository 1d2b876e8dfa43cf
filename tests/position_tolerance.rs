mod common;

use common::{class_symbol, document, project, solution, source_location, write_fixture, TestClient};
use roslyn_mcp::bridge::{FakeBridge, SyntaxNodeInfo};

/// `get_symbol_info` at the exact requested offset misses (no node chain
/// seeded there), but the node chain one byte later resolves — the
/// offset+1 tolerance strategy from the position resolver should recover it
/// without the caller ever seeing a "not found" payload.
#[tokio::test]
async fn offset_plus_one_tolerance_recovers_a_missed_position() {
    let dir = tempfile::tempdir().unwrap();
    let text = "class Foo {}";
    let file = write_fixture(dir.path(), "Foo.cs", text);

    let sln = dir.path().join("test.sln");
    let symbol = class_symbol("sym#Foo", "Foo", source_location(&file, 0, 6, 0, 9));
    let doc = document("doc1", "Foo.cs", &file, text);
    let proj = project("proj1", "Proj1", &dir.path().join("proj1.csproj"), vec![doc], vec![]);
    let sol = solution(&sln, vec![proj]);

    let node = SyntaxNodeInfo {
        node_kind: "ClassDeclaration".to_string(),
        token_text: "Foo".to_string(),
        token_kind: "IdentifierToken".to_string(),
        declared_symbol: Some(symbol.clone()),
        referenced_symbol: None,
    };

    // Requested offset is 6 ("class "), but the chain is only seeded at 7.
    let bridge = FakeBridge::new().with_solution(sol).with_node_chain("doc1", 7, vec![node]);
    let mut client = TestClient::new(bridge);
    client.initialize().await;

    client
        .call_tool("load_solution", serde_json::json!({ "solution_path": sln.to_string_lossy() }))
        .await;

    let result = client
        .call_tool(
            "get_symbol_info",
            serde_json::json!({ "file_path": file.to_string_lossy(), "line": 0, "column": 6 }),
        )
        .await;

    assert_eq!(result["name"], "Foo");
    assert_eq!(result["kind"], "Class");
}

/// When no node chain is seeded anywhere near the offset, the response is a
/// structured "not found" payload, never a protocol error.
#[tokio::test]
async fn unresolvable_position_is_a_structured_payload_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let text = "class Foo {}";
    let file = write_fixture(dir.path(), "Foo.cs", text);
    let sln = dir.path().join("test.sln");
    let doc = document("doc1", "Foo.cs", &file, text);
    let proj = project("proj1", "Proj1", &dir.path().join("proj1.csproj"), vec![doc], vec![]);
    let sol = solution(&sln, vec![proj]);

    let bridge = FakeBridge::new().with_solution(sol);
    let mut client = TestClient::new(bridge);
    client.initialize().await;
    client
        .call_tool("load_solution", serde_json::json!({ "solution_path": sln.to_string_lossy() }))
        .await;

    let result = client
        .call_tool(
            "get_symbol_info",
            serde_json::json!({ "file_path": file.to_string_lossy(), "line": 0, "column": 6 }),
        )
        .await;

    assert!(result["strategies_attempted"].is_array());
    assert!(result["hint"].is_string());
}
