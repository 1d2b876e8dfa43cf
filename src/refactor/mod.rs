//! Refactoring Engine (C6, spec.md §4.6): rename, organize-usings, format,
//! code-fix application, and interface extraction, all sharing the same
//! preview/apply discipline.

pub mod code_fix;
pub mod extract_interface;
pub mod format_doc;
pub mod organize_usings;
pub mod rename;

use crate::bridge::BridgeError;
use crate::model::{ChangeKind, DocumentEdit, EditPlan, Hunk};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefactorError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("new name must not be empty")]
    EmptyName,
    #[error("symbol has no source location and cannot be renamed")]
    SymbolHasNoSourceLocation,
}

/// One document's write outcome when an `EditPlan` is applied.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

/// Result of applying an `EditPlan`: per-file status, with the first
/// failing file prominent (spec.md §4.6.1, §7 "I/O errors during apply").
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApplyReport {
    pub total_files: usize,
    pub written: usize,
    pub first_failure: Option<WriteOutcome>,
    pub outcomes: Vec<WriteOutcome>,
}

/// Shared preview/apply helper (SPEC_FULL.md §4 C6 note): centralizes the
/// preview-vs-write decision the way `jvl`'s `run_check` centralizes
/// `--no-cache`/write decisions for its own single write path.
///
/// Writes are best-effort: a failure on one file does not stop attempts on
/// the rest, and the first failure is reported by name without rolling back
/// files already written (spec.md §4.6.1).
pub fn apply_edit_plan(plan: &EditPlan, preview: bool) -> ApplyReport {
    if preview {
        return ApplyReport {
            total_files: plan.total_files(),
            written: 0,
            first_failure: None,
            outcomes: Vec::new(),
        };
    }

    let mut outcomes = Vec::new();
    let mut first_failure = None;
    let mut written = 0;

    for edit in &plan.edits {
        let outcome = write_one(edit);
        if outcome.success {
            written += 1;
        } else if first_failure.is_none() {
            first_failure = Some(outcome.clone());
        }
        outcomes.push(outcome);
    }

    ApplyReport {
        total_files: plan.total_files(),
        written,
        first_failure,
        outcomes,
    }
}

/// Diff two full document texts into a single changed-region hunk (old/new
/// common prefix and suffix lines trimmed away), plus a change count. Used
/// by every refactor that emits a whole-document replacement (rename,
/// organize-usings, format, code-fix) to build `EditPlan` hunks.
pub(crate) fn diff_documents(old_text: &str, new_text: &str) -> (usize, Vec<Hunk>) {
    let old_lines: Vec<&str> = old_text.lines().collect();
    let new_lines: Vec<&str> = new_text.lines().collect();

    if old_lines == new_lines {
        return (0, Vec::new());
    }

    let mut prefix = 0;
    while prefix < old_lines.len()
        && prefix < new_lines.len()
        && old_lines[prefix] == new_lines[prefix]
    {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < old_lines.len() - prefix
        && suffix < new_lines.len() - prefix
        && old_lines[old_lines.len() - 1 - suffix] == new_lines[new_lines.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let old_changed = &old_lines[prefix..old_lines.len() - suffix];
    let new_changed = &new_lines[prefix..new_lines.len() - suffix];
    let change_count = old_changed.len().max(new_changed.len()).max(1);

    let hunk = Hunk {
        old_start_line: prefix as u32,
        old_end_line: (old_lines.len() - suffix) as u32,
        old_text: old_changed.join("\n"),
        new_text: new_changed.join("\n"),
    };

    (change_count, vec![hunk])
}

fn write_one(edit: &DocumentEdit) -> WriteOutcome {
    let result = match edit.change_kind {
        ChangeKind::Modified | ChangeKind::Added => match &edit.new_text {
            Some(text) => std::fs::write(&edit.path, text),
            None => Err(std::io::Error::other("missing new_text for modified/added document")),
        },
        ChangeKind::Removed => std::fs::remove_file(&edit.path),
    };

    match result {
        Ok(()) => WriteOutcome {
            path: edit.path.clone(),
            success: true,
            error: None,
        },
        Err(e) => WriteOutcome {
            path: edit.path.clone(),
            success: false,
            error: Some(e.to_string()),
        },
    }
}
