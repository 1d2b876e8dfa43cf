//! Code-fix discovery and application (C6.4–C6.5, spec.md §4.6.4–§4.6.5).
//!
//! Provider enumeration itself is the bridge's responsibility (spec.md §9:
//! "enumerate a fixed set of providers at build time" is a statement about
//! the compiler-library side of this boundary); this module owns the
//! diagnostic-matching strategy and the preview/apply EditPlan assembly.

use super::diff_documents;
use super::RefactorError;
use crate::bridge::{CodeFixAction, SolutionBridge};
use crate::model::{ChangeKind, Diagnostic, Document, DocumentEdit, EditPlan};

const NEAREST_COUNT: usize = 10;
const MAX_DISTANCE: u32 = 50;

pub enum MatchOutcome<'a> {
    Found(&'a Diagnostic),
    Nearest(Vec<&'a Diagnostic>),
}

fn distance(diagnostic: &Diagnostic, offset: u32) -> u32 {
    match diagnostic.span {
        Some((start, end)) if offset >= start && offset <= end => 0,
        Some((start, _)) if offset < start => start - offset,
        Some((_, end)) => offset.saturating_sub(end),
        None => u32::MAX,
    }
}

/// Locate the diagnostic a `get_code_fixes`/`apply_code_fix` call is asking
/// about, using the three ordered strategies from spec.md §4.6.5.
pub fn match_diagnostic<'a>(
    diagnostics: &'a [Diagnostic],
    diagnostic_id: &str,
    offset: u32,
) -> MatchOutcome<'a> {
    let candidates: Vec<&Diagnostic> = diagnostics.iter().filter(|d| d.id == diagnostic_id).collect();

    if let Some(exact) = candidates.iter().find(|d| matches!(d.span, Some((start, end)) if offset >= start && offset <= end)) {
        return MatchOutcome::Found(exact);
    }

    if let Some(close) = candidates.iter().find(|d| distance(d, offset) <= MAX_DISTANCE) {
        return MatchOutcome::Found(close);
    }

    if let Some(anywhere) = candidates.first() {
        return MatchOutcome::Found(anywhere);
    }

    let mut nearest: Vec<&Diagnostic> = diagnostics.iter().collect();
    nearest.sort_by_key(|d| distance(d, offset));
    nearest.truncate(NEAREST_COUNT);
    MatchOutcome::Nearest(nearest)
}

pub async fn discover_code_fixes(
    bridge: &dyn SolutionBridge,
    document_id: &str,
    diagnostic: &Diagnostic,
    offset: usize,
) -> Result<Vec<CodeFixAction>, RefactorError> {
    Ok(bridge.discover_code_fixes(document_id, &diagnostic.id, offset).await?)
}

/// Apply the `fix_index`-th discovered action. Computes the full `EditPlan`
/// against the pre-change documents and never swaps the active Solution
/// itself — callers own that swap once, after every file write (spec.md §9
/// open question resolution; SPEC_FULL.md §4 C6 note).
pub async fn plan_code_fix(
    bridge: &dyn SolutionBridge,
    document_id: &str,
    diagnostic: &Diagnostic,
    offset: usize,
    fix_index: usize,
    old_documents: &[Document],
) -> Result<EditPlan, RefactorError> {
    let result = bridge
        .apply_code_fix(document_id, &diagnostic.id, offset, fix_index)
        .await?;

    let mut edits = Vec::new();
    for (doc_id, path, change_kind, new_text) in result.changes {
        let old_text = old_documents
            .iter()
            .find(|d| d.id == doc_id)
            .map(|d| d.text.as_str())
            .unwrap_or("");

        let edit = match change_kind {
            ChangeKind::Removed => DocumentEdit {
                path,
                change_kind,
                change_count: 1,
                new_text: None,
                hunks: None,
            },
            ChangeKind::Added | ChangeKind::Modified => {
                let text = new_text.unwrap_or_default();
                let (change_count, hunks) = diff_documents(old_text, &text);
                DocumentEdit {
                    path,
                    change_kind,
                    change_count: change_count.max(1),
                    new_text: Some(text),
                    hunks: Some(hunks),
                }
            }
        };
        edits.push(edit);
    }

    Ok(EditPlan { edits })
}
