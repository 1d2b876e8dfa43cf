//! Organize Usings (C6.2, spec.md §4.6.2): single-file sort and solution-wide
//! batch variants.

use super::diff_documents;
use super::RefactorError;
use crate::bridge::{SolutionBridge, UsingDirective};
use crate::model::{ChangeKind, Document, DocumentEdit, EditPlan, Project};
use crate::search::glob_to_regex;

/// Sort order: directives rooted at `System` first, then alphabetic by
/// qualified name (spec.md §4.6.2).
pub fn sort_key(directive: &UsingDirective) -> (bool, String) {
    let not_system_rooted = !directive.qualified_name.starts_with("System");
    (not_system_rooted, directive.qualified_name.to_ascii_lowercase())
}

pub fn sorted(mut directives: Vec<UsingDirective>) -> Vec<UsingDirective> {
    directives.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    directives
}

/// Single-file organize: ask the bridge for the fully reformatted text
/// (spec.md §4.6.2 "produce a sorted list ... emit the full new text").
pub async fn organize_single(
    bridge: &dyn SolutionBridge,
    document_id: &str,
) -> Result<String, RefactorError> {
    Ok(bridge.organize_usings(document_id).await?)
}

pub struct BatchArgs<'a> {
    pub project_name: Option<&'a str>,
    pub file_pattern: Option<&'a str>,
}

/// Batch organize across a solution's projects/documents (spec.md §4.6.2).
/// Only documents whose organized text differs from their current text are
/// included in the plan.
pub async fn organize_batch(
    bridge: &dyn SolutionBridge,
    projects: &[Project],
    args: BatchArgs<'_>,
) -> Result<EditPlan, RefactorError> {
    let file_regex = args.file_pattern.map(glob_to_regex);

    let mut edits = Vec::new();
    for project in projects {
        if let Some(name) = args.project_name {
            if project.name != name {
                continue;
            }
        }
        for document in &project.documents {
            if let Some(regex) = &file_regex {
                if !regex.is_match(&document.name) {
                    continue;
                }
            }
            if let Some(edit) = organize_one(bridge, document).await? {
                edits.push(edit);
            }
        }
    }

    Ok(EditPlan { edits })
}

async fn organize_one(
    bridge: &dyn SolutionBridge,
    document: &Document,
) -> Result<Option<DocumentEdit>, RefactorError> {
    let Some(path) = document.path.clone() else {
        return Ok(None);
    };
    let new_text = bridge.organize_usings(&document.id).await?;
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

    fn directive(name: &str) -> UsingDirective {
        UsingDirective {
            qualified_name: name.to_string(),
            is_static: false,
            alias: None,
        }
    }

    #[test]
    fn system_directives_sort_first_then_alphabetic() {
        let input = vec![
            directive("MyApp.Services"),
            directive("System.Collections.Generic"),
            directive("Another.Namespace"),
            directive("System"),
        ];
        let sorted = sorted(input);
        let names: Vec<&str> = sorted.iter().map(|d| d.qualified_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["System", "System.Collections.Generic", "Another.Namespace", "MyApp.Services"]
        );
    }

    #[test]
    fn sorting_is_idempotent() {
        let input = vec![directive("System.Linq"), directive("System"), directive("Zeta")];
        let once = sorted(input);
        let twice = sorted(once.clone());
        let once_names: Vec<&str> = once.iter().map(|d| d.qualified_name.as_str()).collect();
        let twice_names: Vec<&str> = twice.iter().map(|d| d.qualified_name.as_str()).collect();
        assert_eq!(once_names, twice_names);
    }
}
