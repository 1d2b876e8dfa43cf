//! Symbol Navigator (C3, spec.md §4.3): cross-solution reference,
//! implementation, caller, and hierarchy walks over a resolved symbol.

use crate::bridge::{BridgeError, CallerEdge, ReferenceHit, SolutionBridge};
use crate::model::{Location, Symbol, SymbolKind};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SymbolNavError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Shared truncation envelope for every listing operation in this module
/// (SPEC_FULL.md §4 C3 note): `total`, `shown`, `truncated`, and a `hint`
/// naming the parameter to raise, present only when truncated.
#[derive(Debug, Clone, Serialize)]
pub struct Truncated<T: Serialize> {
    pub total: usize,
    pub shown: usize,
    pub truncated: bool,
    pub hint: Option<String>,
    pub items: Vec<T>,
}

impl<T: Serialize> Truncated<T> {
    pub fn new(mut items: Vec<T>, total: usize, max: usize, hint_param: &str) -> Self {
        items.truncate(max);
        let shown = items.len();
        let truncated = total > shown;
        Self {
            total,
            shown,
            truncated,
            hint: truncated.then(|| format!("increase {hint_param} to see more")),
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceEntry {
    pub file: Option<std::path::PathBuf>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub excerpt: String,
    /// Always `"read"` — write-vs-read detection is an explicit open question
    /// in spec.md §9 and is left as the documented placeholder.
    pub kind: &'static str,
}

impl From<ReferenceHit> for ReferenceEntry {
    fn from(hit: ReferenceHit) -> Self {
        let (file, line, column) = match hit.location {
            Location::Source {
                file,
                start_line,
                start_column,
                ..
            } => (Some(file), Some(start_line), Some(start_column)),
            Location::Metadata { .. } => (None, None, None),
        };
        Self {
            file,
            line,
            column,
            excerpt: hit.excerpt,
            kind: "read",
        }
    }
}

pub async fn find_references(
    bridge: &dyn SolutionBridge,
    symbol: &Symbol,
    max_results: usize,
) -> Result<Truncated<ReferenceEntry>, SymbolNavError> {
    let hits = bridge.find_references(&symbol.bridge_id).await?;
    let total = hits.len();
    let entries: Vec<ReferenceEntry> = hits.into_iter().map(ReferenceEntry::from).collect();
    Ok(Truncated::new(entries, total, max_results, "maxResults"))
}

/// Structured "wrong symbol kind" payload (spec.md §4.3, §7): returned
/// instead of an error so AI clients can recover without special-casing a
/// protocol fault.
#[derive(Debug, Clone, Serialize)]
pub struct WrongKind {
    pub error: &'static str,
    pub symbol_kind: &'static str,
    pub hint: String,
}

pub enum ImplementationsOutcome {
    Ok(Truncated<Symbol>),
    WrongKind(WrongKind),
}

pub async fn find_implementations(
    bridge: &dyn SolutionBridge,
    symbol: &Symbol,
    max_results: usize,
) -> Result<ImplementationsOutcome, SymbolNavError> {
    if !symbol.kind.is_named_type() {
        return Ok(ImplementationsOutcome::WrongKind(WrongKind {
            error: "wrong_symbol_kind",
            symbol_kind: symbol.kind.as_str(),
            hint: "findImplementations requires a named type (interface, class, struct, enum, or delegate)".to_string(),
        }));
    }
    let symbols = bridge.find_implementations(&symbol.bridge_id).await?;
    let total = symbols.len();
    Ok(ImplementationsOutcome::Ok(Truncated::new(symbols, total, max_results, "maxResults")))
}

pub enum CallersOutcome {
    Ok(Truncated<CallerEdge>),
    WrongKind(WrongKind),
}

pub async fn find_callers(
    bridge: &dyn SolutionBridge,
    symbol: &Symbol,
    max_results: usize,
) -> Result<CallersOutcome, SymbolNavError> {
    if !symbol.kind.is_method_like() {
        return Ok(CallersOutcome::WrongKind(WrongKind {
            error: "wrong_symbol_kind",
            symbol_kind: symbol.kind.as_str(),
            hint: "findCallers requires a method or property symbol".to_string(),
        }));
    }
    let edges = bridge.find_callers(&symbol.bridge_id).await?;
    let total = edges.len();
    Ok(CallersOutcome::Ok(Truncated::new(edges, total, max_results, "maxResults")))
}

impl Serialize for CallerEdge {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("CallerEdge", 2)?;
        state.serialize_field("caller", &self.caller)?;
        state.serialize_field("callSites", &self.call_sites)?;
        state.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeHierarchy {
    pub type_name: String,
    pub base_types: Vec<Symbol>,
    pub interfaces: Vec<Symbol>,
    pub total_derived_types: usize,
    pub derived_types: Vec<Symbol>,
    pub truncated: bool,
}

pub async fn type_hierarchy(
    bridge: &dyn SolutionBridge,
    symbol: &Symbol,
    max_derived: usize,
) -> Result<TypeHierarchy, SymbolNavError> {
    let base_types = bridge.base_types(&symbol.bridge_id).await?;
    let interfaces = bridge.interfaces(&symbol.bridge_id).await?;
    let mut derived = bridge.derived_types(&symbol.bridge_id).await?;
    let total_derived_types = derived.len();
    let truncated = derived.len() > max_derived;
    derived.truncate(max_derived);

    Ok(TypeHierarchy {
        type_name: symbol.display_name.clone(),
        base_types,
        interfaces,
        total_derived_types,
        derived_types: derived,
        truncated,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DefinitionOutcome {
    Location(Location),
    ExternalMetadata { error: &'static str, assembly: String },
}

pub async fn go_to_definition(
    bridge: &dyn SolutionBridge,
    symbol: &Symbol,
) -> Result<Option<DefinitionOutcome>, SymbolNavError> {
    let location = bridge.go_to_definition(&symbol.bridge_id).await?;
    Ok(location.map(|loc| match loc {
        Location::Source { .. } => DefinitionOutcome::Location(loc),
        Location::Metadata { assembly } => DefinitionOutcome::ExternalMetadata {
            error: "symbol_in_external_metadata",
            assembly,
        },
    }))
}

pub async fn method_overloads(
    bridge: &dyn SolutionBridge,
    symbol: &Symbol,
) -> Result<Vec<Symbol>, SymbolNavError> {
    if symbol.kind != SymbolKind::Method {
        return Ok(Vec::new());
    }
    Ok(bridge.method_overloads(&symbol.bridge_id).await?)
}

pub async fn containing_member(
    bridge: &dyn SolutionBridge,
    document_id: &str,
    offset: usize,
) -> Result<Option<(Symbol, Location)>, SymbolNavError> {
    Ok(bridge.containing_member(document_id, offset).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::FakeBridge;
    use crate::model::Accessibility;

    fn symbol(id: &str, kind: SymbolKind) -> Symbol {
        Symbol {
            bridge_id: id.to_string(),
            kind,
            name: id.to_string(),
            display_name: id.to_string(),
            accessibility: Accessibility::Public,
            locations: vec![],
            containing_type: None,
            namespace: None,
            attributes: vec![],
            method: None,
            is_static: false,
            is_implicitly_declared: false,
        }
    }

    #[tokio::test]
    async fn find_references_truncates_and_reports_hint() {
        let hits: Vec<ReferenceHit> = (0..150)
            .map(|i| ReferenceHit {
                location: Location::Source {
                    file: "A.cs".into(),
                    start_line: i,
                    start_column: 0,
                    end_line: i,
                    end_column: 1,
                },
                excerpt: format!("use {i}"),
            })
            .collect();
        let bridge = FakeBridge::new().with_references("sym#T", hits);
        let result = find_references(&bridge, &symbol("sym#T", SymbolKind::Class), 50)
            .await
            .unwrap();
        assert_eq!(result.total, 150);
        assert_eq!(result.shown, 50);
        assert!(result.truncated);
        assert!(result.hint.unwrap().contains("maxResults"));
    }

    #[tokio::test]
    async fn find_implementations_rejects_non_named_type() {
        let bridge = FakeBridge::new();
        let outcome = find_implementations(&bridge, &symbol("sym#m", SymbolKind::Method), 50)
            .await
            .unwrap();
        assert!(matches!(outcome, ImplementationsOutcome::WrongKind(_)));
    }

    #[tokio::test]
    async fn method_overloads_empty_for_non_method_symbol() {
        let bridge = FakeBridge::new();
        let overloads = method_overloads(&bridge, &symbol("sym#c", SymbolKind::Class))
            .await
            .unwrap();
        assert!(overloads.is_empty());
    }
}
