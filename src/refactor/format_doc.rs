//! Format Document, batch (C6.3, spec.md §4.6.3): whitespace normalization
//! across a filtered set of documents.

use super::diff_documents;
use super::RefactorError;
use crate::bridge::SolutionBridge;
use crate::model::{ChangeKind, Document, DocumentEdit, EditPlan, Project};

pub struct FormatBatchArgs<'a> {
    pub project_name: Option<&'a str>,
    pub include_tests: bool,
}

fn is_test_project(name: &str) -> bool {
    name.to_ascii_lowercase().contains("test")
}

/// Batch whitespace-normalize (spec.md §4.6.3). `includeTests = false`
/// excludes any project whose name contains "Test" (case-insensitive).
pub async fn format_batch(
    bridge: &dyn SolutionBridge,
    projects: &[Project],
    args: FormatBatchArgs<'_>,
) -> Result<EditPlan, RefactorError> {
    let mut edits = Vec::new();

    for project in projects {
        if let Some(name) = args.project_name {
            if project.name != name {
                continue;
            }
        }
        if !args.include_tests && is_test_project(&project.name) {
            continue;
        }
        for document in &project.documents {
            if let Some(edit) = format_one(bridge, document).await? {
                edits.push(edit);
            }
        }
    }

    Ok(EditPlan { edits })
}

async fn format_one(
    bridge: &dyn SolutionBridge,
    document: &Document,
) -> Result<Option<DocumentEdit>, RefactorError> {
    let Some(path) = document.path.clone() else {
        return Ok(None);
    };
    let new_text = bridge.format_document(&document.id).await?;
    if new_text == document.text {
        return Ok(None);
    }
    let (change_count, hunks) = diff_documents(&document.text, &new_text);
    Ok(Some(DocumentEdit {
        path,
        change_kind: ChangeKind::Modified,
        change_count,
        new_text: Some(new_text),
        hunks: Some(hunks),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_name_detection_is_case_insensitive() {
        assert!(is_test_project("MyApp.Tests"));
        assert!(is_test_project("myapp.UNITTESTING"));
        assert!(!is_test_project("MyApp.Core"));
    }
}
