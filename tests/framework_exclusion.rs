mod common;

use common::{class_symbol, source_location, TestClient};
use roslyn_mcp::bridge::FakeBridge;
use roslyn_mcp::model::Attribute;

/// A controller class with a single reference (itself, via DI) is not
/// flagged dead because its `ApiController` attribute marks it as
/// framework-activated; a plain, equally under-referenced class is flagged.
#[tokio::test]
async fn framework_attribute_marker_excludes_controller_but_not_plain_class() {
    let mut controller = class_symbol("sym#Controller", "OrdersController", source_location("Orders.cs".as_ref(), 0, 0, 0, 1));
    controller.attributes.push(Attribute {
        short_name: "ApiController".to_string(),
        qualified_name: "Microsoft.AspNetCore.Mvc.ApiControllerAttribute".to_string(),
    });

    let plain = class_symbol("sym#Widget", "Widget", source_location("Widget.cs".as_ref(), 0, 0, 0, 1));

    let bridge = FakeBridge::new().with_symbols(vec![controller, plain]);
    let mut client = TestClient::new(bridge);
    client.initialize().await;

    let result = client.call_tool("find_unused_code", serde_json::json!({})).await;

    let flagged_names: Vec<String> = result["flagged"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();

    assert!(!flagged_names.contains(&"OrdersController".to_string()));
    assert!(flagged_names.contains(&"Widget".to_string()));
}

/// A type deriving from `IDisposable` (a framework base marker) is excluded
/// even with zero references.
#[tokio::test]
async fn framework_base_type_marker_excludes_disposable_implementation() {
    let resource = class_symbol("sym#Resource", "ResourceHolder", source_location("R.cs".as_ref(), 0, 0, 0, 1));
    let disposable_base = class_symbol("sym#IDisposable", "IDisposable", source_location("stub.cs".as_ref(), 0, 0, 0, 1));

    let bridge = FakeBridge::new()
        .with_symbols(vec![resource.clone()])
        .with_base_types("sym#Resource", vec![disposable_base]);

    let mut client = TestClient::new(bridge);
    client.initialize().await;

    let result = client.call_tool("find_unused_code", serde_json::json!({})).await;
    let flagged_names: Vec<String> = result["flagged"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();

    assert!(!flagged_names.contains(&"ResourceHolder".to_string()));
}
