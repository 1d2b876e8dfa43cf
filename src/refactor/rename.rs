//! Rename (C6.1, spec.md §4.6.1): delegate to the bridge's semantic
//! renamer, diff the result against the pre-rename documents, and emit an
//! `EditPlan` whose verbosity knob controls how much of each entry is
//! retained.

use super::diff_documents;
use super::RefactorError;
use crate::bridge::SolutionBridge;
use crate::model::{ChangeKind, Document, DocumentEdit, EditPlan, Symbol};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Summary,
    Compact,
    Full,
}

impl Verbosity {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Verbosity::Compact,
            "full" => Verbosity::Full,
            _ => Verbosity::Summary,
        }
    }
}

const MAX_FULL_HUNKS_PER_FILE: usize = 20;

/// Compute the `EditPlan` for a rename without writing anything. Callers
/// apply via `refactor::apply_edit_plan` when `preview` is false.
pub async fn plan_rename(
    bridge: &dyn SolutionBridge,
    symbol: &Symbol,
    new_name: &str,
    old_documents: &[Document],
    max_files: Option<usize>,
    verbosity: Verbosity,
) -> Result<EditPlan, RefactorError> {
    if new_name.trim().is_empty() {
        return Err(RefactorError::EmptyName);
    }
    if !symbol.has_source_location() {
        return Err(RefactorError::SymbolHasNoSourceLocation);
    }

    let rename_result = bridge.rename(&symbol.bridge_id, new_name).await?;

    let mut edits = Vec::new();
    for (document_id, path, new_text) in rename_result.changed_documents {
        let old_text = old_documents
            .iter()
            .find(|d| d.id == document_id)
            .map(|d| d.text.as_str())
            .unwrap_or("");

        edits.push(build_edit(path, old_text, &new_text, verbosity));
    }

    if let Some(max) = max_files {
        edits.truncate(max);
    }

    Ok(EditPlan { edits })
}

fn build_edit(path: PathBuf, old_text: &str, new_text: &str, verbosity: Verbosity) -> DocumentEdit {
    let (change_count, hunks) = diff_documents(old_text, new_text);

    let hunks = match verbosity {
        Verbosity::Summary => None,
        Verbosity::Compact => Some(
            hunks
                .into_iter()
                .map(|h| crate::model::Hunk {
                    old_text: String::new(),
                    new_text: String::new(),
                    ..h
                })
                .collect(),
        ),
        Verbosity::Full => Some(hunks.into_iter().take(MAX_FULL_HUNKS_PER_FILE).collect()),
    };

    DocumentEdit {
        path,
        change_kind: ChangeKind::Modified,
        change_count,
        new_text: Some(new_text.to_string()),
        hunks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{FakeBridge, RenameResult};
    use crate::model::{Accessibility, Location, SymbolKind};

    fn symbol_with_location(id: &str) -> Symbol {
        Symbol {
            bridge_id: id.to_string(),
            kind: SymbolKind::Class,
            name: "Foo".to_string(),
            display_name: "Foo".to_string(),
            accessibility: Accessibility::Public,
            locations: vec![Location::Source {
                file: "A.cs".into(),
                start_line: 0,
                start_column: 6,
                end_line: 0,
                end_column: 9,
            }],
            containing_type: None,
            namespace: None,
            attributes: vec![],
            method: None,
            is_static: false,
            is_implicitly_declared: false,
        }
    }

    #[tokio::test]
    async fn rename_round_trip_produces_edit_plan() {
        let bridge = FakeBridge::new().with_rename_result(
            "sym#Foo",
            RenameResult {
                changed_documents: vec![
                    ("doc_a".to_string(), "A.cs".into(), "class Baz { public void Bar() {} }".to_string()),
                    ("doc_b".to_string(), "B.cs".into(), "new Baz().Bar();".to_string()),
                ],
            },
        );

        let old_docs = vec![
            Document {
                id: "doc_a".to_string(),
                name: "A.cs".to_string(),
                folders: vec![],
                path: Some("A.cs".into()),
                text: "class Foo { public void Bar() {} }".to_string(),
            },
            Document {
                id: "doc_b".to_string(),
                name: "B.cs".to_string(),
                folders: vec![],
                path: Some("B.cs".into()),
                text: "new Foo().Bar();".to_string(),
            },
        ];

        let plan = plan_rename(
            &bridge,
            &symbol_with_location("sym#Foo"),
            "Baz",
            &old_docs,
            None,
            Verbosity::Summary,
        )
        .await
        .unwrap();

        assert_eq!(plan.total_files(), 2);
        assert!(plan.total_changes() >= 2);
    }

    #[tokio::test]
    async fn empty_new_name_is_rejected() {
        let bridge = FakeBridge::new();
        let err = plan_rename(&bridge, &symbol_with_location("sym#Foo"), "  ", &[], None, Verbosity::Summary)
            .await
            .unwrap_err();
        assert!(matches!(err, RefactorError::EmptyName));
    }

    #[tokio::test]
    async fn metadata_only_symbol_is_rejected() {
        let bridge = FakeBridge::new();
        let mut symbol = symbol_with_location("sym#Foo");
        symbol.locations = vec![Location::Metadata { assembly: "mscorlib".to_string() }];
        let err = plan_rename(&bridge, &symbol, "Baz", &[], None, Verbosity::Summary)
            .await
            .unwrap_err();
        assert!(matches!(err, RefactorError::SymbolHasNoSourceLocation));
    }
}
