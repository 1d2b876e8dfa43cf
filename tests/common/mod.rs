#![allow(dead_code)]

pub mod mcp_client;

pub use mcp_client::TestClient;

use std::path::{Path, PathBuf};

use roslyn_mcp::model::{Accessibility, Document, Location, Project, Solution, Symbol, SymbolKind};

/// Write `contents` to `dir/name` and return the absolute path, so tests
/// exercising rename/organize/format writes have a real file to check.
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn source_location(path: &Path, start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Location {
    Location::Source {
        file: path.to_path_buf(),
        start_line,
        start_column,
        end_line,
        end_column,
    }
}

pub fn document(id: &str, name: &str, path: &Path, text: &str) -> Document {
    Document {
        id: id.to_string(),
        name: name.to_string(),
        folders: vec![],
        path: Some(path.to_path_buf()),
        text: text.to_string(),
    }
}

pub fn project(id: &str, name: &str, path: &Path, documents: Vec<Document>, project_references: Vec<&str>) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        path: path.to_path_buf(),
        language: "C#".to_string(),
        documents,
        project_references: project_references.into_iter().map(String::from).collect(),
        external_references: vec![],
    }
}

pub fn solution(sln_path: &Path, projects: Vec<Project>) -> Solution {
    Solution {
        path: sln_path.to_path_buf(),
        loaded_at: jiff::Timestamp::constant(0, 0),
        projects,
    }
}

/// A minimal named-type symbol with one declaration location, the shape most
/// tests need as a starting point before overriding specific fields.
pub fn class_symbol(bridge_id: &str, name: &str, location: Location) -> Symbol {
    Symbol {
        bridge_id: bridge_id.to_string(),
        kind: SymbolKind::Class,
        name: name.to_string(),
        display_name: name.to_string(),
        accessibility: Accessibility::Public,
        locations: vec![location],
        containing_type: None,
        namespace: None,
        attributes: vec![],
        method: None,
        is_static: false,
        is_implicitly_declared: false,
    }
}

pub fn method_symbol(bridge_id: &str, name: &str, containing_type: &str, location: Location) -> Symbol {
    Symbol {
        bridge_id: bridge_id.to_string(),
        kind: SymbolKind::Method,
        name: name.to_string(),
        display_name: format!("{containing_type}.{name}"),
        accessibility: Accessibility::Public,
        locations: vec![location],
        containing_type: Some(containing_type.to_string()),
        namespace: None,
        attributes: vec![],
        method: Some(roslyn_mcp::model::MethodAttributes::default()),
        is_static: false,
        is_implicitly_declared: false,
    }
}
