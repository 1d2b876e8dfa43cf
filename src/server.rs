//! Protocol Dispatcher (C9, spec.md §4.9): the MCP tool surface.
//!
//! `McpServer` wraps a single shared [`Core`] (spec.md §9's "ambient global
//! state" fix) and exposes the 23-tool catalog of spec.md §6.2 as
//! `#[tool]` methods via `rmcp`, the same `#[tool_router]`/`#[tool_handler]`
//! shape the retrieval pack's own MCP servers use. Every precondition path
//! (wrong symbol kind, symbol not found, file not in solution) returns a
//! structured JSON success payload, never an `McpError` — only protocol,
//! bridge, and I/O faults become `McpError` (spec.md §7).

use crate::bridge::SolutionBridge;
use crate::config::Config;
use crate::diagnostics_engine::DiagnosticsScope;
use crate::model::Symbol;
use crate::workspace::{Workspace, WorkspaceError};
use crate::{deadcode, depgraph, diagnostics_engine, position, refactor, search, symbols};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The single shared value owning the active Workspace, the compiler
/// bridge, and resolved configuration (spec.md §9, SPEC_FULL.md §3).
/// Passed by reference/Arc to every tool handler — no module-level state.
pub struct Core {
    pub workspace: RwLock<Workspace>,
    pub bridge: Arc<dyn SolutionBridge>,
    pub config: Config,
}

impl Core {
    pub fn new(bridge: Arc<dyn SolutionBridge>, config: Config) -> Self {
        let cache_enabled = config.enable_semantic_cache;
        Self {
            workspace: RwLock::new(Workspace::new(cache_enabled)),
            bridge,
            config,
        }
    }

}

fn text_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let body = serde_json::to_string(value)
        .map_err(|e| McpError::internal_error(format!("serialization failed: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(body)]))
}

fn to_internal_error(e: impl std::fmt::Display) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

enum Resolved {
    Ok { symbol: Symbol, document_id: String },
    Payload(serde_json::Value),
}

/// Resolve (filePath, line, column) to a symbol with position tolerance
/// (C1). Returns a ready-to-serialize payload on every non-success path so
/// callers never branch on errors for expected "not found" conditions.
async fn resolve_at(core: &Core, file_path: &str, line: u32, column: u32) -> Result<Resolved, McpError> {
    let path = std::path::Path::new(file_path);

    let (document_id, text) = {
        let mut workspace = core.workspace.write().await;
        match workspace.document(path) {
            Ok((_project, document)) => (document.id.clone(), document.text.clone()),
            Err(WorkspaceError::NoSolutionLoaded) => {
                return Ok(Resolved::Payload(json!({ "error": "no_solution_loaded" })));
            }
            Err(WorkspaceError::FileNotInSolution(p)) => {
                return Ok(Resolved::Payload(json!({
                    "error": "file_not_in_solution",
                    "filePath": p,
                })));
            }
            Err(WorkspaceError::Bridge(e)) => return Err(to_internal_error(e)),
        }
    };

    let outcome = position::resolve(core.bridge.as_ref(), &document_id, &text, line, column)
        .await
        .map_err(|e| match e {
            position::PositionError::InvalidPosition => McpError::invalid_params("line/column out of range", None),
            position::PositionError::Bridge(be) => to_internal_error(be),
        })?;

    match outcome {
        position::Outcome::NotFound(nf) => Ok(Resolved::Payload(serde_json::to_value(nf).unwrap())),
        position::Outcome::Resolved(r) => match r.symbol {
            Some(symbol) => Ok(Resolved::Ok { symbol, document_id }),
            None => Ok(Resolved::Payload(json!({
                "error": "symbol_not_found",
                "nodeKind": r.node_kind,
                "tokenText": r.token_text,
                "foundVia": r.found_via,
            }))),
        },
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoadSolutionParams {
    pub solution_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PositionParams {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PositionWithMaxParams {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TypeHierarchyParams {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub max_derived_types: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchSymbolsParams {
    pub query: String,
    pub kind: Option<String>,
    pub namespace_filter: Option<String>,
    pub max_results: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SemanticQueryParams {
    pub kinds: Option<Vec<String>>,
    pub is_async: Option<bool>,
    pub namespace_filter: Option<String>,
    pub accessibility: Option<String>,
    pub is_static: Option<bool>,
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
    pub return_type: Option<String>,
    pub attributes: Option<Vec<String>>,
    pub parameter_includes: Option<Vec<String>>,
    pub parameter_excludes: Option<Vec<String>>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct DiagnosticsParams {
    pub file_path: Option<String>,
    pub project_path: Option<String>,
    pub severity: Option<String>,
    pub include_hidden: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CodeFixesParams {
    pub file_path: String,
    pub diagnostic_id: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ApplyCodeFixParams {
    pub file_path: String,
    pub diagnostic_id: String,
    pub line: u32,
    pub column: u32,
    pub fix_index: Option<usize>,
    pub preview: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ProjectStructureParams {
    pub include_references: Option<bool>,
    pub include_documents: Option<bool>,
    pub project_name_pattern: Option<String>,
    pub max_projects: Option<usize>,
    pub summary_only: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OrganizeUsingsParams {
    pub file_path: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct OrganizeUsingsBatchParams {
    pub project_name: Option<String>,
    pub file_pattern: Option<String>,
    pub preview: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct FormatDocumentBatchParams {
    pub project_name: Option<String>,
    pub include_tests: Option<bool>,
    pub preview: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct FindUnusedCodeParams {
    pub project_name: Option<String>,
    pub include_private: Option<bool>,
    pub include_internal: Option<bool>,
    pub symbol_kind_filter: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenameSymbolParams {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub new_name: String,
    pub preview: Option<bool>,
    pub max_files: Option<usize>,
    pub verbosity: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractInterfaceParams {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub interface_name: String,
    pub include_member_names: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct DependencyGraphParams {
    pub format: Option<String>,
}

#[derive(Clone)]
pub struct McpServer {
    core: Arc<Core>,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(core: Arc<Core>) -> Self {
        Self {
            core,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "Health snapshot: solution status, capabilities, configuration.")]
    pub async fn health_check(&self) -> Result<CallToolResult, McpError> {
        let health = self.core.workspace.read().await.health();
        text_result(&health)
    }

    #[tool(description = "Load a .sln or a directory containing exactly one solution file.")]
    pub async fn load_solution(
        &self,
        Parameters(params): Parameters<LoadSolutionParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = std::path::PathBuf::from(&params.solution_path);
        let mut workspace = self.core.workspace.write().await;
        match workspace.load(self.core.bridge.as_ref(), &path).await {
            Ok((project_count, document_count)) => text_result(&json!({
                "success": true,
                "projectCount": project_count,
                "documentCount": document_count,
            })),
            Err(e) => text_result(&json!({ "success": false, "error": e.to_string() })),
        }
    }

    #[tool(description = "Symbol detail at a file position, with position tolerance.")]
    pub async fn get_symbol_info(
        &self,
        Parameters(params): Parameters<PositionParams>,
    ) -> Result<CallToolResult, McpError> {
        match resolve_at(&self.core, &params.file_path, params.line, params.column).await? {
            Resolved::Ok { symbol, .. } => text_result(&symbol),
            Resolved::Payload(p) => text_result(&p),
        }
    }

    #[tool(description = "One source location, or a structured external-metadata payload.")]
    pub async fn go_to_definition(
        &self,
        Parameters(params): Parameters<PositionParams>,
    ) -> Result<CallToolResult, McpError> {
        match resolve_at(&self.core, &params.file_path, params.line, params.column).await? {
            Resolved::Payload(p) => text_result(&p),
            Resolved::Ok { symbol, .. } => {
                let outcome = symbols::go_to_definition(self.core.bridge.as_ref(), &symbol)
                    .await
                    .map_err(to_internal_error)?;
                match outcome {
                    Some(location) => text_result(&location),
                    None => text_result(&json!({ "error": "location_not_available" })),
                }
            }
        }
    }

    #[tool(description = "All references to the symbol at a position, truncated list envelope.")]
    pub async fn find_references(
        &self,
        Parameters(params): Parameters<PositionWithMaxParams>,
    ) -> Result<CallToolResult, McpError> {
        match resolve_at(&self.core, &params.file_path, params.line, params.column).await? {
            Resolved::Payload(p) => text_result(&p),
            Resolved::Ok { symbol, .. } => {
                let max = params.max_results.unwrap_or(50);
                let result = symbols::find_references(self.core.bridge.as_ref(), &symbol, max)
                    .await
                    .map_err(to_internal_error)?;
                text_result(&json!({
                    "symbolName": symbol.name,
                    "symbolKind": symbol.kind.as_str(),
                    "totalReferences": result.total,
                    "referencesShown": result.shown,
                    "truncated": result.truncated,
                    "references": result.items,
                    "hint": result.hint,
                }))
            }
        }
    }

    #[tool(description = "Implementations of the named type at a position. Requires an interface/class/struct/enum/delegate symbol.")]
    pub async fn find_implementations(
        &self,
        Parameters(params): Parameters<PositionWithMaxParams>,
    ) -> Result<CallToolResult, McpError> {
        match resolve_at(&self.core, &params.file_path, params.line, params.column).await? {
            Resolved::Payload(p) => text_result(&p),
            Resolved::Ok { symbol, .. } => {
                let max = params.max_results.unwrap_or(50);
                match symbols::find_implementations(self.core.bridge.as_ref(), &symbol, max)
                    .await
                    .map_err(to_internal_error)?
                {
                    symbols::ImplementationsOutcome::Ok(result) => text_result(&result),
                    symbols::ImplementationsOutcome::WrongKind(wrong) => text_result(&wrong),
                }
            }
        }
    }

    #[tool(description = "Callers of the method/property at a position.")]
    pub async fn find_callers(
        &self,
        Parameters(params): Parameters<PositionWithMaxParams>,
    ) -> Result<CallToolResult, McpError> {
        match resolve_at(&self.core, &params.file_path, params.line, params.column).await? {
            Resolved::Payload(p) => text_result(&p),
            Resolved::Ok { symbol, .. } => {
                let max = params.max_results.unwrap_or(50);
                match symbols::find_callers(self.core.bridge.as_ref(), &symbol, max)
                    .await
                    .map_err(to_internal_error)?
                {
                    symbols::CallersOutcome::Ok(result) => text_result(&result),
                    symbols::CallersOutcome::WrongKind(wrong) => text_result(&wrong),
                }
            }
        }
    }

    #[tool(description = "Base types, interfaces, and direct derived types for the named type at a position.")]
    pub async fn get_type_hierarchy(
        &self,
        Parameters(params): Parameters<TypeHierarchyParams>,
    ) -> Result<CallToolResult, McpError> {
        match resolve_at(&self.core, &params.file_path, params.line, params.column).await? {
            Resolved::Payload(p) => text_result(&p),
            Resolved::Ok { symbol, .. } => {
                let max_derived = params.max_derived_types.unwrap_or(50);
                let hierarchy = symbols::type_hierarchy(self.core.bridge.as_ref(), &symbol, max_derived)
                    .await
                    .map_err(to_internal_error)?;
                text_result(&hierarchy)
            }
        }
    }

    #[tool(description = "Glob or substring search over solution symbols, with pagination.")]
    pub async fn search_symbols(
        &self,
        Parameters(params): Parameters<SearchSymbolsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = search::search_symbols(
            self.core.bridge.as_ref(),
            search::SearchSymbolsArgs {
                query: &params.query,
                kind: params.kind.as_deref(),
                namespace_filter: params.namespace_filter.as_deref(),
                max_results: params.max_results.unwrap_or(50),
                offset: params.offset.unwrap_or(0),
            },
        )
        .await
        .map_err(to_internal_error)?;
        text_result(&result)
    }

    #[tool(description = "Rich filtered symbol query: kinds, accessibility, attributes, parameter shape.")]
    pub async fn semantic_query(
        &self,
        Parameters(params): Parameters<SemanticQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let accessibility = params.accessibility.as_deref().and_then(|a| match a.to_ascii_lowercase().as_str() {
            "public" => Some(crate::model::Accessibility::Public),
            "private" => Some(crate::model::Accessibility::Private),
            "internal" => Some(crate::model::Accessibility::Internal),
            "protected" => Some(crate::model::Accessibility::Protected),
            "protectedinternal" => Some(crate::model::Accessibility::ProtectedInternal),
            "privateprotected" => Some(crate::model::Accessibility::PrivateProtected),
            _ => None,
        });

        let filters = search::SemanticFilters {
            kinds: params.kinds.iter().flatten().map(|s| s.as_str()).collect(),
            is_async: params.is_async,
            namespace_filter: params.namespace_filter.as_deref(),
            accessibility,
            is_static: params.is_static,
            type_contains: params.type_filter.as_deref(),
            return_type_contains: params.return_type.as_deref(),
            attributes: params.attributes.iter().flatten().map(|s| s.as_str()).collect(),
            parameter_includes: params.parameter_includes.iter().flatten().map(|s| s.as_str()).collect(),
            parameter_excludes: params.parameter_excludes.iter().flatten().map(|s| s.as_str()).collect(),
        };

        let result = search::semantic_query(self.core.bridge.as_ref(), filters, params.max_results.unwrap_or(50))
            .await
            .map_err(to_internal_error)?;
        text_result(&result)
    }

    #[tool(description = "Compiler diagnostics at file/project/solution scope, with a post-truncation summary.")]
    pub async fn get_diagnostics(
        &self,
        Parameters(params): Parameters<DiagnosticsParams>,
    ) -> Result<CallToolResult, McpError> {
        enum ResolvedScope {
            File(String),
            Project(String),
            Solution(Vec<String>),
        }

        let resolved = {
            let mut workspace = self.core.workspace.write().await;
            if let Some(file_path) = &params.file_path {
                match workspace.document(std::path::Path::new(file_path)) {
                    Ok((_, doc)) => ResolvedScope::File(doc.id.clone()),
                    Err(WorkspaceError::FileNotInSolution(p)) => {
                        return text_result(&json!({ "error": "file_not_in_solution", "filePath": p }));
                    }
                    Err(WorkspaceError::NoSolutionLoaded) => {
                        return text_result(&json!({ "error": "no_solution_loaded" }));
                    }
                    Err(WorkspaceError::Bridge(e)) => return Err(to_internal_error(e)),
                }
            } else if let Some(project_path) = &params.project_path {
                let solution = match workspace.solution() {
                    Ok(s) => s,
                    Err(_) => return text_result(&json!({ "error": "no_solution_loaded" })),
                };
                match solution.projects.iter().find(|p| p.path.to_string_lossy() == *project_path) {
                    Some(project) => ResolvedScope::Project(project.id.clone()),
                    None => return text_result(&json!({ "error": "project_not_in_solution", "projectPath": project_path })),
                }
            } else {
                let ids = match workspace.solution() {
                    Ok(solution) => solution.projects.iter().map(|p| p.id.clone()).collect(),
                    Err(_) => return text_result(&json!({ "error": "no_solution_loaded" })),
                };
                ResolvedScope::Solution(ids)
            }
        };

        let scope = match &resolved {
            ResolvedScope::File(id) => DiagnosticsScope::File(id),
            ResolvedScope::Project(id) => DiagnosticsScope::Project(id),
            ResolvedScope::Solution(ids) => DiagnosticsScope::Solution(ids),
        };

        let result = diagnostics_engine::get_diagnostics(
            self.core.bridge.as_ref(),
            diagnostics_engine::DiagnosticsArgs {
                scope,
                severity_filter: params.severity.as_deref(),
                include_hidden: params.include_hidden.unwrap_or(false),
                max_diagnostics: self.core.config.max_diagnostics,
            },
        )
        .await
        .map_err(to_internal_error)?;
        text_result(&result)
    }

    #[tool(description = "Discover code-fix actions for a diagnostic at a position.")]
    pub async fn get_code_fixes(
        &self,
        Parameters(params): Parameters<CodeFixesParams>,
    ) -> Result<CallToolResult, McpError> {
        let (document_id, text) = match self.document_lookup(&params.file_path).await? {
            Ok(v) => v,
            Err(payload) => return text_result(&payload),
        };
        let offset = match position::line_col_to_offset(&text, params.line, params.column) {
            Some(o) => o,
            None => return Err(McpError::invalid_params("line/column out of range", None)),
        };

        let diagnostics = self
            .core
            .bridge
            .document_diagnostics(&document_id)
            .await
            .map_err(to_internal_error)?;

        match refactor::code_fix::match_diagnostic(&diagnostics, &params.diagnostic_id, offset as u32) {
            refactor::code_fix::MatchOutcome::Nearest(nearest) => {
                text_result(&json!({ "matched": false, "nearestDiagnostics": nearest }))
            }
            refactor::code_fix::MatchOutcome::Found(diag) => {
                let fixes = refactor::code_fix::discover_code_fixes(self.core.bridge.as_ref(), &document_id, diag, offset)
                    .await
                    .map_err(to_internal_error)?;
                text_result(&json!({ "matched": true, "diagnosticId": diag.id, "fixes": fixes }))
            }
        }
    }

    #[tool(description = "Apply the fixIndex-th discovered code fix. Preview by default.")]
    pub async fn apply_code_fix(
        &self,
        Parameters(params): Parameters<ApplyCodeFixParams>,
    ) -> Result<CallToolResult, McpError> {
        let preview = params.preview.unwrap_or(true);
        let fix_index = params.fix_index.unwrap_or(0);

        let (document_id, text) = match self.document_lookup(&params.file_path).await? {
            Ok(v) => v,
            Err(payload) => return text_result(&payload),
        };
        let offset = match position::line_col_to_offset(&text, params.line, params.column) {
            Some(o) => o,
            None => return Err(McpError::invalid_params("line/column out of range", None)),
        };

        let diagnostics = self
            .core
            .bridge
            .document_diagnostics(&document_id)
            .await
            .map_err(to_internal_error)?;

        let diag = match refactor::code_fix::match_diagnostic(&diagnostics, &params.diagnostic_id, offset as u32) {
            refactor::code_fix::MatchOutcome::Nearest(nearest) => {
                return text_result(&json!({ "matched": false, "nearestDiagnostics": nearest }));
            }
            refactor::code_fix::MatchOutcome::Found(d) => d.clone(),
        };

        let old_documents = self.all_documents().await?;
        let plan = refactor::code_fix::plan_code_fix(self.core.bridge.as_ref(), &document_id, &diag, offset, fix_index, &old_documents)
            .await
            .map_err(to_internal_error)?;

        let report = refactor::apply_edit_plan(&plan, preview);
        self.reload_after_write(preview, &report).await;
        text_result(&json!({ "plan": plan, "apply": report }))
    }

    #[tool(description = "Project/document structure of the loaded solution.")]
    pub async fn get_project_structure(
        &self,
        Parameters(params): Parameters<ProjectStructureParams>,
    ) -> Result<CallToolResult, McpError> {
        let workspace = self.core.workspace.read().await;
        let solution = match workspace.solution() {
            Ok(s) => s,
            Err(_) => return text_result(&json!({ "projects": [] })),
        };

        let name_regex = params.project_name_pattern.as_deref().map(search::glob_to_regex);
        let include_refs = params.include_references.unwrap_or(true);
        let include_docs = params.include_documents.unwrap_or(false);
        let summary_only = params.summary_only.unwrap_or(false);

        let mut projects: Vec<serde_json::Value> = Vec::new();
        for project in &solution.projects {
            if let Some(regex) = &name_regex {
                if !regex.is_match(&project.name) {
                    continue;
                }
            }
            if summary_only {
                projects.push(json!({ "name": project.name, "documentCount": project.documents.len() }));
                continue;
            }
            let mut entry = json!({
                "id": project.id,
                "name": project.name,
                "language": project.language,
                "documentCount": project.documents.len(),
            });
            if include_refs {
                entry["projectReferences"] = json!(project.project_references);
                entry["externalReferences"] = json!(project.external_references);
            }
            if include_docs {
                entry["documents"] = json!(project.documents.iter().map(|d| &d.name).collect::<Vec<_>>());
            }
            projects.push(entry);
        }

        if let Some(max) = params.max_projects {
            projects.truncate(max);
        }

        text_result(&json!({ "projects": projects }))
    }

    #[tool(description = "Organize usings in a single file; returns the full new text.")]
    pub async fn organize_usings(
        &self,
        Parameters(params): Parameters<OrganizeUsingsParams>,
    ) -> Result<CallToolResult, McpError> {
        let (document_id, _) = match self.document_lookup(&params.file_path).await? {
            Ok(v) => v,
            Err(payload) => return text_result(&payload),
        };
        let text = refactor::organize_usings::organize_single(self.core.bridge.as_ref(), &document_id)
            .await
            .map_err(to_internal_error)?;
        text_result(&json!({ "text": text }))
    }

    #[tool(description = "Organize usings across filtered projects/files. Preview by default.")]
    pub async fn organize_usings_batch(
        &self,
        Parameters(params): Parameters<OrganizeUsingsBatchParams>,
    ) -> Result<CallToolResult, McpError> {
        let preview = params.preview.unwrap_or(true);
        let projects = self.projects_snapshot().await?;
        let plan = refactor::organize_usings::organize_batch(
            self.core.bridge.as_ref(),
            &projects,
            refactor::organize_usings::BatchArgs {
                project_name: params.project_name.as_deref(),
                file_pattern: params.file_pattern.as_deref(),
            },
        )
        .await
        .map_err(to_internal_error)?;
        let report = refactor::apply_edit_plan(&plan, preview);
        self.reload_after_write(preview, &report).await;
        text_result(&json!({ "plan": plan, "apply": report }))
    }

    #[tool(description = "Whitespace-normalize documents across filtered projects. Preview by default.")]
    pub async fn format_document_batch(
        &self,
        Parameters(params): Parameters<FormatDocumentBatchParams>,
    ) -> Result<CallToolResult, McpError> {
        let preview = params.preview.unwrap_or(true);
        let projects = self.projects_snapshot().await?;
        let plan = refactor::format_doc::format_batch(
            self.core.bridge.as_ref(),
            &projects,
            refactor::format_doc::FormatBatchArgs {
                project_name: params.project_name.as_deref(),
                include_tests: params.include_tests.unwrap_or(false),
            },
        )
        .await
        .map_err(to_internal_error)?;
        let report = refactor::apply_edit_plan(&plan, preview);
        self.reload_after_write(preview, &report).await;
        text_result(&json!({ "plan": plan, "apply": report }))
    }

    #[tool(description = "Same-named ordinary methods declared on the symbol's containing type.")]
    pub async fn get_method_overloads(
        &self,
        Parameters(params): Parameters<PositionParams>,
    ) -> Result<CallToolResult, McpError> {
        match resolve_at(&self.core, &params.file_path, params.line, params.column).await? {
            Resolved::Payload(p) => text_result(&p),
            Resolved::Ok { symbol, .. } => {
                let overloads = symbols::method_overloads(self.core.bridge.as_ref(), &symbol)
                    .await
                    .map_err(to_internal_error)?;
                text_result(&overloads)
            }
        }
    }

    #[tool(description = "First enclosing member declaration at a position.")]
    pub async fn get_containing_member(
        &self,
        Parameters(params): Parameters<PositionParams>,
    ) -> Result<CallToolResult, McpError> {
        let (document_id, text) = match self.document_lookup(&params.file_path).await? {
            Ok(v) => v,
            Err(payload) => return text_result(&payload),
        };
        let offset = match position::line_col_to_offset(&text, params.line, params.column) {
            Some(o) => o,
            None => return Err(McpError::invalid_params("line/column out of range", None)),
        };
        let found = symbols::containing_member(self.core.bridge.as_ref(), &document_id, offset)
            .await
            .map_err(to_internal_error)?;
        match found {
            Some((symbol, location)) => text_result(&json!({ "symbol": symbol, "location": location })),
            None => text_result(&json!({ "error": "no_enclosing_member" })),
        }
    }

    #[tool(description = "Declarations with no non-self references, excluding framework-marked types.")]
    pub async fn find_unused_code(
        &self,
        Parameters(params): Parameters<FindUnusedCodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = deadcode::find_unused_code(
            self.core.bridge.as_ref(),
            deadcode::DeadCodeArgs {
                project_name: params.project_name.as_deref(),
                include_private: params.include_private.unwrap_or(false),
                include_internal: params.include_internal.unwrap_or(true),
                symbol_kind_filter: params.symbol_kind_filter.as_deref(),
                max_results: params.max_results.unwrap_or(50),
            },
        )
        .await
        .map_err(to_internal_error)?;
        text_result(&result)
    }

    #[tool(description = "Rename the symbol at a position across the solution. Preview by default.")]
    pub async fn rename_symbol(
        &self,
        Parameters(params): Parameters<RenameSymbolParams>,
    ) -> Result<CallToolResult, McpError> {
        let preview = params.preview.unwrap_or(true);
        let verbosity = refactor::rename::Verbosity::parse(params.verbosity.as_deref().unwrap_or("summary"));

        let resolved = match resolve_at(&self.core, &params.file_path, params.line, params.column).await? {
            Resolved::Payload(p) => return text_result(&p),
            Resolved::Ok { symbol, .. } => symbol,
        };

        let old_documents = self.all_documents().await?;
        let plan = match refactor::rename::plan_rename(
            self.core.bridge.as_ref(),
            &resolved,
            &params.new_name,
            &old_documents,
            params.max_files,
            verbosity,
        )
        .await
        {
            Ok(plan) => plan,
            Err(e) => return text_result(&json!({ "error": e.to_string() })),
        };

        let report = refactor::apply_edit_plan(&plan, preview);
        self.reload_after_write(preview, &report).await;
        text_result(&json!({ "plan": plan, "apply": report }))
    }

    #[tool(description = "Synthesize interface text from a type's public instance members. Does not write to disk.")]
    pub async fn extract_interface(
        &self,
        Parameters(params): Parameters<ExtractInterfaceParams>,
    ) -> Result<CallToolResult, McpError> {
        let resolved = match resolve_at(&self.core, &params.file_path, params.line, params.column).await? {
            Resolved::Payload(p) => return text_result(&p),
            Resolved::Ok { symbol, .. } => symbol,
        };

        let all_symbols = self.core.bridge.all_symbols().await.map_err(to_internal_error)?;
        let members: Vec<Symbol> = all_symbols
            .into_iter()
            .filter(|s| s.containing_type.as_deref() == Some(resolved.name.as_str()))
            .collect();

        let result = refactor::extract_interface::extract_interface(
            &resolved,
            &members,
            refactor::extract_interface::ExtractInterfaceArgs {
                interface_name: &params.interface_name,
                include_member_names: params.include_member_names.as_deref(),
            },
        )
        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        text_result(&result)
    }

    #[tool(description = "Project dependency graph, cycle detection, json or mermaid diagram text.")]
    pub async fn dependency_graph(
        &self,
        Parameters(params): Parameters<DependencyGraphParams>,
    ) -> Result<CallToolResult, McpError> {
        let projects = self.projects_snapshot().await?;
        let graph = depgraph::build_graph(&projects);

        match params.format.as_deref() {
            Some(f) if f.eq_ignore_ascii_case("mermaid") => {
                text_result(&json!({ "format": "mermaid", "diagram": depgraph::render_diagram(&graph) }))
            }
            _ => text_result(&graph),
        }
    }
}

impl McpServer {
    /// Reload the active solution after a non-preview write so the workspace
    /// cache and document text reflect what's now on disk. Skipped on
    /// preview (nothing written) and when the apply already reported a
    /// failure, since the solution state on disk is then only partially
    /// changed and a reload wouldn't be more correct than the cache it has.
    async fn reload_after_write(&self, preview: bool, report: &refactor::ApplyReport) {
        if preview || report.first_failure.is_some() {
            return;
        }
        let solution_path = {
            let workspace = self.core.workspace.read().await;
            workspace.solution().ok().map(|s| s.path.clone())
        };
        if let Some(path) = solution_path {
            let mut workspace = self.core.workspace.write().await;
            let _ = workspace.load(self.core.bridge.as_ref(), &path).await;
        }
    }

    async fn document_lookup(&self, file_path: &str) -> Result<Result<(String, String), serde_json::Value>, McpError> {
        let mut workspace = self.core.workspace.write().await;
        match workspace.document(std::path::Path::new(file_path)) {
            Ok((_, doc)) => Ok(Ok((doc.id.clone(), doc.text.clone()))),
            Err(WorkspaceError::NoSolutionLoaded) => Ok(Err(json!({ "error": "no_solution_loaded" }))),
            Err(WorkspaceError::FileNotInSolution(p)) => {
                Ok(Err(json!({ "error": "file_not_in_solution", "filePath": p })))
            }
            Err(WorkspaceError::Bridge(e)) => Err(to_internal_error(e)),
        }
    }

    async fn projects_snapshot(&self) -> Result<Vec<crate::model::Project>, McpError> {
        let workspace = self.core.workspace.read().await;
        Ok(workspace.solution().map(|s| s.projects.clone()).unwrap_or_default())
    }

    async fn all_documents(&self) -> Result<Vec<crate::model::Document>, McpError> {
        let workspace = self.core.workspace.read().await;
        Ok(workspace
            .solution()
            .map(|s| s.projects.iter().flat_map(|p| p.documents.clone()).collect())
            .unwrap_or_default())
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Code-intelligence service over a loaded .NET/C# solution. Load a solution with \
                 load_solution before calling position-based tools. All list-returning tools accept \
                 a maxResults-style argument and report truncation explicitly."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
