mod common;

use common::{class_symbol, document, project, solution, source_location, write_fixture, TestClient};
use roslyn_mcp::bridge::{FakeBridge, RenameResult, SyntaxNodeInfo};

/// Renaming with `preview: false` writes the bridge's renamed text to every
/// changed file on disk, and the apply report accounts for both files.
#[tokio::test]
async fn rename_with_preview_false_writes_every_changed_file() {
    let dir = tempfile::tempdir().unwrap();
    let file_a = write_fixture(dir.path(), "A.cs", "class Foo { public void Bar() {} }");
    let file_b = write_fixture(dir.path(), "B.cs", "new Foo().Bar();");
    let sln = dir.path().join("test.sln");

    let symbol = class_symbol("sym#Foo", "Foo", source_location(&file_a, 0, 6, 0, 9));
    let doc_a = document("doc_a", "A.cs", &file_a, "class Foo { public void Bar() {} }");
    let doc_b = document("doc_b", "B.cs", &file_b, "new Foo().Bar();");
    let proj = project("proj1", "Proj1", &dir.path().join("proj1.csproj"), vec![doc_a, doc_b], vec![]);
    let sol = solution(&sln, vec![proj]);

    let node = SyntaxNodeInfo {
        node_kind: "ClassDeclaration".to_string(),
        token_text: "Foo".to_string(),
        token_kind: "IdentifierToken".to_string(),
        declared_symbol: Some(symbol),
        referenced_symbol: None,
    };

    let new_text_a = "class Baz { public void Bar() {} }".to_string();
    let new_text_b = "new Baz().Bar();".to_string();

    let bridge = FakeBridge::new()
        .with_solution(sol)
        .with_node_chain("doc_a", 6, vec![node])
        .with_rename_result(
            "sym#Foo",
            RenameResult {
                changed_documents: vec![
                    ("doc_a".to_string(), file_a.clone(), new_text_a.clone()),
                    ("doc_b".to_string(), file_b.clone(), new_text_b.clone()),
                ],
            },
        );

    let mut client = TestClient::new(bridge);
    client.initialize().await;
    client
        .call_tool("load_solution", serde_json::json!({ "solution_path": sln.to_string_lossy() }))
        .await;

    let result = client
        .call_tool(
            "rename_symbol",
            serde_json::json!({
                "file_path": file_a.to_string_lossy(),
                "line": 0,
                "column": 6,
                "new_name": "Baz",
                "preview": false
            }),
        )
        .await;

    assert_eq!(result["plan"]["edits"].as_array().unwrap().len(), 2);
    assert_eq!(result["apply"]["written"], 2);
    assert!(result["apply"]["first_failure"].is_null());

    assert_eq!(std::fs::read_to_string(&file_a).unwrap(), new_text_a);
    assert_eq!(std::fs::read_to_string(&file_b).unwrap(), new_text_b);
}

/// `preview: true` (the default) computes the same plan but never touches
/// the filesystem.
#[tokio::test]
async fn rename_preview_does_not_write_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let file_a = write_fixture(dir.path(), "A.cs", "class Foo {}");
    let sln = dir.path().join("test.sln");

    let symbol = class_symbol("sym#Foo", "Foo", source_location(&file_a, 0, 6, 0, 9));
    let doc_a = document("doc_a", "A.cs", &file_a, "class Foo {}");
    let proj = project("proj1", "Proj1", &dir.path().join("proj1.csproj"), vec![doc_a], vec![]);
    let sol = solution(&sln, vec![proj]);

    let node = SyntaxNodeInfo {
        node_kind: "ClassDeclaration".to_string(),
        token_text: "Foo".to_string(),
        token_kind: "IdentifierToken".to_string(),
        declared_symbol: Some(symbol),
        referenced_symbol: None,
    };

    let bridge = FakeBridge::new()
        .with_solution(sol)
        .with_node_chain("doc_a", 6, vec![node])
        .with_rename_result(
            "sym#Foo",
            RenameResult {
                changed_documents: vec![("doc_a".to_string(), file_a.clone(), "class Baz {}".to_string())],
            },
        );

    let mut client = TestClient::new(bridge);
    client.initialize().await;
    client
        .call_tool("load_solution", serde_json::json!({ "solution_path": sln.to_string_lossy() }))
        .await;

    let result = client
        .call_tool(
            "rename_symbol",
            serde_json::json!({
                "file_path": file_a.to_string_lossy(),
                "line": 0,
                "column": 6,
                "new_name": "Baz"
            }),
        )
        .await;

    assert_eq!(result["apply"]["written"], 0);
    assert_eq!(std::fs::read_to_string(&file_a).unwrap(), "class Foo {}");
}
