//! Diagnostics Engine (C5, spec.md §4.5): scope dispatch, severity
//! filtering, and post-truncation summary counts.

use crate::bridge::{BridgeError, SolutionBridge};
use crate::model::{Diagnostic, Severity};
use serde::Serialize;

/// Scope selector for `get_diagnostics` (spec.md §4.5). Each variant carries
/// exactly the id(s) its lookup needs, so there is no state where a scope is
/// chosen without the id its own arm requires.
pub enum DiagnosticsScope<'a> {
    File(&'a str),
    Project(&'a str),
    Solution(&'a [String]),
}

#[derive(Debug, thiserror::Error)]
pub enum DiagnosticsError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsSummary {
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsResult {
    pub total: usize,
    pub shown: usize,
    pub truncated: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Computed from the post-truncation list, not the pre-truncation total
    /// (spec.md §4.5: "this is observable — tests should rely on this").
    pub summary: DiagnosticsSummary,
}

pub struct DiagnosticsArgs<'a> {
    pub scope: DiagnosticsScope<'a>,
    pub severity_filter: Option<&'a str>,
    pub include_hidden: bool,
    pub max_diagnostics: usize,
}

pub async fn get_diagnostics(
    bridge: &dyn SolutionBridge,
    args: DiagnosticsArgs<'_>,
) -> Result<DiagnosticsResult, DiagnosticsError> {
    let mut collected = match args.scope {
        DiagnosticsScope::File(document_id) => bridge.document_diagnostics(document_id).await?,
        DiagnosticsScope::Project(project_id) => bridge.project_diagnostics(project_id).await?,
        DiagnosticsScope::Solution(project_ids) => {
            let mut all = Vec::new();
            for project_id in project_ids {
                all.extend(bridge.project_diagnostics(project_id).await?);
            }
            all
        }
    };

    if !args.include_hidden {
        collected.retain(|d| d.severity != Severity::Hidden);
    }

    if let Some(filter) = args.severity_filter {
        if let Some(wanted) = Severity::from_str_ci(filter) {
            collected.retain(|d| d.severity == wanted);
        }
    }

    let total = collected.len();
    collected.truncate(args.max_diagnostics);
    let shown = collected.len();

    let summary = DiagnosticsSummary {
        errors: collected.iter().filter(|d| d.severity == Severity::Error).count(),
        warnings: collected.iter().filter(|d| d.severity == Severity::Warning).count(),
    };

    Ok(DiagnosticsResult {
        total,
        shown,
        truncated: total > shown,
        diagnostics: collected,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::FakeBridge;
    use crate::model::Location;

    fn diag(severity: Severity) -> Diagnostic {
        Diagnostic {
            id: "CS0000".to_string(),
            severity,
            message: "test".to_string(),
            location: Location::Source {
                file: "A.cs".into(),
                start_line: 0,
                start_column: 0,
                end_line: 0,
                end_column: 1,
            },
            span: Some((0, 1)),
        }
    }

    #[tokio::test]
    async fn summary_reflects_post_truncation_list() {
        let diagnostics = vec![diag(Severity::Error); 5];
        let bridge = FakeBridge::new().with_project_diagnostics("proj1", diagnostics);
        let result = get_diagnostics(
            &bridge,
            DiagnosticsArgs {
                scope: DiagnosticsScope::Project("proj1"),
                severity_filter: None,
                include_hidden: false,
                max_diagnostics: 3,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.total, 5);
        assert_eq!(result.shown, 3);
        assert!(result.truncated);
        assert_eq!(result.summary.errors, 3);
    }

    #[tokio::test]
    async fn hidden_excluded_by_default() {
        let diagnostics = vec![diag(Severity::Hidden), diag(Severity::Error)];
        let bridge = FakeBridge::new().with_document_diagnostics("doc1", diagnostics);
        let result = get_diagnostics(
            &bridge,
            DiagnosticsArgs {
                scope: DiagnosticsScope::File("doc1"),
                severity_filter: None,
                include_hidden: false,
                max_diagnostics: 100,
            },
        )
        .await
        .unwrap();
        assert_eq!(result.total, 1);
    }
}
