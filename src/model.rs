//! Core data model shared by every component (spec.md §3).
//!
//! These types are the Rust-native, tagged-variant replacement for the
//! string-typed kinds the original source passes around (spec.md §9):
//! `SymbolKind`, `Accessibility`, `Severity`, and `ChangeKind` are enums
//! internally and only become strings at the MCP boundary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stable identifier for a `Project` within a `Solution`.
pub type ProjectId = String;

/// Stable identifier for a `Document` within a `Project`.
pub type DocumentId = String;

/// The root handle to a loaded set of projects (spec.md §3 "Solution").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub path: PathBuf,
    pub loaded_at: jiff::Timestamp,
    pub projects: Vec<Project>,
}

impl Solution {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn document(&self, id: &str) -> Option<(&Project, &Document)> {
        self.projects
            .iter()
            .find_map(|p| p.documents.iter().find(|d| d.id == id).map(|d| (p, d)))
    }

    pub fn document_count(&self) -> usize {
        self.projects.iter().map(|p| p.documents.len()).sum()
    }
}

/// A compilation unit with a source language and a reference set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub path: PathBuf,
    pub language: String,
    pub documents: Vec<Document>,
    /// Ids of referenced projects. An id with no matching `Project` in the
    /// solution is reported as the literal `"Unknown"` at the protocol
    /// boundary (spec.md §3 invariant).
    pub project_references: Vec<ProjectId>,
    pub external_references: Vec<String>,
}

/// A single source file belonging to a Project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub folders: Vec<String>,
    /// Absent for in-memory documents, which path lookups ignore.
    pub path: Option<PathBuf>,
    pub text: String,
}

/// The closed set of symbol kinds from spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SymbolKind {
    Namespace,
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    Method,
    Property,
    Field,
    Event,
    Parameter,
    Local,
}

impl SymbolKind {
    /// True for the kinds that can own a type hierarchy / implementations
    /// (spec.md §4.3 `findImplementations` precondition).
    pub fn is_named_type(self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Interface
                | SymbolKind::Struct
                | SymbolKind::Enum
                | SymbolKind::Delegate
        )
    }

    pub fn is_method_like(self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::Property)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Namespace => "Namespace",
            SymbolKind::Class => "Class",
            SymbolKind::Interface => "Interface",
            SymbolKind::Struct => "Struct",
            SymbolKind::Enum => "Enum",
            SymbolKind::Delegate => "Delegate",
            SymbolKind::Method => "Method",
            SymbolKind::Property => "Property",
            SymbolKind::Field => "Field",
            SymbolKind::Event => "Event",
            SymbolKind::Parameter => "Parameter",
            SymbolKind::Local => "Local",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Accessibility {
    Public,
    Private,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
}

impl Accessibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Accessibility::Public => "Public",
            Accessibility::Private => "Private",
            Accessibility::Internal => "Internal",
            Accessibility::Protected => "Protected",
            Accessibility::ProtectedInternal => "ProtectedInternal",
            Accessibility::PrivateProtected => "PrivateProtected",
        }
    }
}

/// Kind-specific attributes, populated only for the matching `SymbolKind`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodAttributes {
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub is_async: bool,
    pub is_static: bool,
    pub is_extension: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_display: String,
}

/// An opaque handle produced by the compiler library for a name-bearing
/// program element (spec.md §3 "Symbol"). `bridge_id` is how this crate
/// round-trips the symbol back through the `SolutionBridge` without owning
/// the compiler's own object model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub bridge_id: String,
    pub kind: SymbolKind,
    pub name: String,
    pub display_name: String,
    pub accessibility: Accessibility,
    pub locations: Vec<Location>,
    /// Simple name of the directly-enclosing type, for member symbols. Not
    /// the enclosing namespace — see `namespace`.
    pub containing_type: Option<String>,
    /// The symbol's namespace: the type's own namespace for a top-level type
    /// symbol, or the namespace of the directly-enclosing type for a member.
    /// Populated independently of `containing_type` so a `namespaceFilter`
    /// never matches against a class name.
    pub namespace: Option<String>,
    pub attributes: Vec<Attribute>,
    pub method: Option<MethodAttributes>,
    pub is_static: bool,
    pub is_implicitly_declared: bool,
}

impl Symbol {
    pub fn has_source_location(&self) -> bool {
        self.locations.iter().any(|l| l.is_source())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub short_name: String,
    pub qualified_name: String,
}

/// A source location, or an opaque metadata indicator for symbols defined
/// outside source (spec.md §3 "Location").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Source {
        file: PathBuf,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    },
    Metadata {
        assembly: String,
    },
}

impl Location {
    pub fn is_source(&self) -> bool {
        matches!(self, Location::Source { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hidden,
}

impl Severity {
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            "hidden" => Some(Severity::Hidden),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    /// Byte offset span in the owning document's text, when known. Used by
    /// code-fix discovery's distance-based matching strategy (spec.md
    /// §4.6.5); `None` for diagnostics without a source location.
    pub span: Option<(u32, u32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ChangeKind {
    Modified,
    Added,
    Removed,
}

/// A single within-file change, used by `verbosity = "full"` rename previews
/// and by the using-directive/format diffs (spec.md §3 "EditPlan").
#[derive(Debug, Clone, Serialize)]
pub struct Hunk {
    pub old_start_line: u32,
    pub old_end_line: u32,
    pub old_text: String,
    pub new_text: String,
}

/// One document's worth of change within an `EditPlan`.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentEdit {
    pub path: PathBuf,
    pub change_kind: ChangeKind,
    pub change_count: usize,
    /// Present for Modified/Added; `None` for Removed.
    pub new_text: Option<String>,
    pub hunks: Option<Vec<Hunk>>,
}

/// An ordered, previewable description of a set of document edits across
/// the solution (spec.md §3 "EditPlan").
#[derive(Debug, Clone, Serialize, Default)]
pub struct EditPlan {
    pub edits: Vec<DocumentEdit>,
}

impl EditPlan {
    pub fn total_files(&self) -> usize {
        self.edits.len()
    }

    pub fn total_changes(&self) -> usize {
        self.edits.iter().map(|e| e.change_count).sum()
    }
}

