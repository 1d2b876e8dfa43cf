//! The compiler-library contract (spec.md §6.1, SPEC_FULL.md §1.1).
//!
//! No native Rust equivalent of Roslyn exists, so every semantic operation —
//! parsing, binding, symbol finding, semantic rename, code-fix discovery,
//! syntax mutation — is delegated through this trait to an external process.
//! Everything *above* this boundary (position tolerance, truncation,
//! pagination, framework-marker heuristics, cycle detection, EditPlan
//! diffing) is this crate's own responsibility and lives in the sibling
//! modules.

pub mod fake;
pub mod process;

use crate::model::{Diagnostic, Solution, Symbol};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use fake::FakeBridge;
pub use process::ProcessBridge;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to launch Roslyn bridge process '{cmd}': {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Roslyn bridge process exited unexpectedly")]
    ProcessExited,
    #[error("Roslyn bridge I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response from Roslyn bridge: {0}")]
    Protocol(String),
    #[error("solution file not found at '{0}'")]
    SolutionNotFound(PathBuf),
    #[error("bridge call timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("Roslyn bridge reported an error: {0}")]
    Remote(String),
}

/// A single using-directive, as understood by the organize-usings transform
/// (spec.md §4.6.2).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UsingDirective {
    pub qualified_name: String,
    pub is_static: bool,
    pub alias: Option<String>,
}

/// One chain entry produced when resolving the syntax node at a text offset
/// (spec.md §4.1). The leaf token's immediate parent is index 0; each
/// subsequent entry is one ancestor further up the tree. The bridge
/// pre-resolves declared/referenced symbols per entry because that
/// resolution is exactly what the compiler's semantic model provides;
/// `position.rs` owns only the tolerance *strategy* (which entries/offsets
/// to try, and in what order).
#[derive(Debug, Clone)]
pub struct SyntaxNodeInfo {
    pub node_kind: String,
    pub token_text: String,
    pub token_kind: String,
    pub declared_symbol: Option<Symbol>,
    pub referenced_symbol: Option<Symbol>,
}

/// The result of a semantic rename: every document whose text changed,
/// with its resulting full text.
#[derive(Debug, Clone)]
pub struct RenameResult {
    pub changed_documents: Vec<(String, PathBuf, String)>,
}

/// A single action offered by a code-fix provider (spec.md §4.6.5).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CodeFixAction {
    pub title: String,
    pub provider_name: String,
}

/// The result of applying one code-fix action: the resulting per-document
/// changes, expressed the same way as a rename (spec.md §4.6.4).
#[derive(Debug, Clone)]
pub struct CodeFixResult {
    pub changes: Vec<(String, PathBuf, crate::model::ChangeKind, Option<String>)>,
}

/// A caller edge: a symbol that calls/uses another symbol, with the call
/// site locations (spec.md §4.3 `findCallers`).
#[derive(Debug, Clone)]
pub struct CallerEdge {
    pub caller: Symbol,
    pub call_sites: Vec<crate::model::Location>,
}

/// A single textual reference to a symbol (spec.md §4.3 `findReferences`).
#[derive(Debug, Clone)]
pub struct ReferenceHit {
    pub location: crate::model::Location,
    pub excerpt: String,
}

/// The compiler-library contract. Implementations: [`ProcessBridge`] (shells
/// out to an external Roslyn-hosted tool) and [`FakeBridge`] (in-memory, for
/// tests — see SPEC_FULL.md §1.1).
#[async_trait]
pub trait SolutionBridge: Send + Sync {
    /// Open a solution file, tearing down any state associated with a
    /// previously loaded solution.
    async fn open_solution(&self, path: &std::path::Path) -> Result<Solution, BridgeError>;

    /// Full compilation diagnostics for one project.
    async fn project_diagnostics(&self, project_id: &str) -> Result<Vec<Diagnostic>, BridgeError>;

    /// Semantic diagnostics scoped to a single document.
    async fn document_diagnostics(
        &self,
        document_id: &str,
    ) -> Result<Vec<Diagnostic>, BridgeError>;

    /// Every symbol declared anywhere in the solution (spec.md §4.4). Includes
    /// members and namespaces; implicit declarations are included and
    /// filtered out by the caller per spec.md §4.4's "skip implicitly
    /// declared symbols" rule.
    async fn all_symbols(&self) -> Result<Vec<Symbol>, BridgeError>;

    /// Resolve the syntax-node ancestor chain at a byte offset in a
    /// document, leaf-parent-first. Returns `None` when the offset is out
    /// of the document's text range.
    async fn node_chain_at_offset(
        &self,
        document_id: &str,
        offset: usize,
        max_ancestors: usize,
    ) -> Result<Option<Vec<SyntaxNodeInfo>>, BridgeError>;

    /// Find the first enclosing member declaration (spec.md §4.3
    /// `containingMember`) at an offset, with its full span.
    async fn containing_member(
        &self,
        document_id: &str,
        offset: usize,
    ) -> Result<Option<(Symbol, crate::model::Location)>, BridgeError>;

    async fn find_references(
        &self,
        symbol_bridge_id: &str,
    ) -> Result<Vec<ReferenceHit>, BridgeError>;

    /// Requires `symbol` to be a named type; callers enforce the
    /// precondition and surface the structured "wrong symbol kind" payload.
    async fn find_implementations(
        &self,
        symbol_bridge_id: &str,
    ) -> Result<Vec<Symbol>, BridgeError>;

    async fn find_callers(&self, symbol_bridge_id: &str) -> Result<Vec<CallerEdge>, BridgeError>;

    /// The base-type chain, exclusive of the root object type, nearest first.
    async fn base_types(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError>;

    /// The transitive set of implemented interfaces.
    async fn interfaces(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError>;

    /// Direct (non-transitive) derived types.
    async fn derived_types(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError>;

    async fn go_to_definition(
        &self,
        symbol_bridge_id: &str,
    ) -> Result<Option<crate::model::Location>, BridgeError>;

    /// Same-named ordinary methods declared on the containing type.
    async fn method_overloads(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError>;

    /// Delegate to the compiler library's semantic renamer.
    async fn rename(
        &self,
        symbol_bridge_id: &str,
        new_name: &str,
    ) -> Result<RenameResult, BridgeError>;

    /// Parse a document's using directives.
    async fn using_directives(
        &self,
        document_id: &str,
    ) -> Result<Vec<UsingDirective>, BridgeError>;

    /// Emit the full new text for a document with using directives sorted
    /// per spec.md §4.6.2 (System-rooted first, then alphabetic).
    async fn organize_usings(&self, document_id: &str) -> Result<String, BridgeError>;

    /// Emit the full new text for a document after whitespace normalization.
    async fn format_document(&self, document_id: &str) -> Result<String, BridgeError>;

    /// Ask every registered fix provider whose fixable-ids set contains
    /// `diagnostic_id` to register its actions for the diagnostic at
    /// `document_id`. Provider crashes are swallowed by the implementation
    /// (spec.md §4.6.5).
    async fn discover_code_fixes(
        &self,
        document_id: &str,
        diagnostic_id: &str,
        offset: usize,
    ) -> Result<Vec<CodeFixAction>, BridgeError>;

    /// Apply the `fix_index`-th action from [`discover_code_fixes`] and
    /// return the resulting per-document changes.
    async fn apply_code_fix(
        &self,
        document_id: &str,
        diagnostic_id: &str,
        offset: usize,
        fix_index: usize,
    ) -> Result<CodeFixResult, BridgeError>;
}
