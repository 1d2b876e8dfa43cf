//! In-memory `SolutionBridge` used by every integration test (SPEC_FULL.md
//! §1.1, §8). Tests seed it with plain Rust values instead of driving a real
//! .NET toolchain; every orchestration layer (position tolerance,
//! truncation, dead-code heuristics, cycle detection, EditPlan diffing)
//! exercises exactly the same code path it would against [`super::ProcessBridge`].

use super::{
    BridgeError, CallerEdge, CodeFixAction, CodeFixResult, RenameResult, SolutionBridge,
    SyntaxNodeInfo, UsingDirective,
};
use crate::model::{ChangeKind, Diagnostic, Location, Solution, Symbol};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Default)]
struct FakeState {
    solution: Option<Solution>,
    project_diagnostics: HashMap<String, Vec<Diagnostic>>,
    document_diagnostics: HashMap<String, Vec<Diagnostic>>,
    symbols: Vec<Symbol>,
    node_chains: HashMap<(String, usize), Vec<SyntaxNodeInfo>>,
    containing_members: HashMap<(String, usize), (Symbol, Location)>,
    references: HashMap<String, Vec<super::ReferenceHit>>,
    implementations: HashMap<String, Vec<Symbol>>,
    callers: HashMap<String, Vec<CallerEdge>>,
    base_types: HashMap<String, Vec<Symbol>>,
    interfaces: HashMap<String, Vec<Symbol>>,
    derived_types: HashMap<String, Vec<Symbol>>,
    definitions: HashMap<String, Location>,
    overloads: HashMap<String, Vec<Symbol>>,
    rename_results: HashMap<String, RenameResult>,
    using_directives: HashMap<String, Vec<UsingDirective>>,
    organized_text: HashMap<String, String>,
    formatted_text: HashMap<String, String>,
    code_fixes: HashMap<(String, String, usize), Vec<CodeFixAction>>,
    code_fix_results: HashMap<(String, String, usize, usize), CodeFixResult>,
}

/// Builder/fixture seeded in-memory bridge. Every accessor returns whatever
/// was seeded via the `with_*`/`set_*` methods, or an empty/`None` default —
/// there is no hidden fallback to a real compiler.
#[derive(Default)]
pub struct FakeBridge {
    state: Mutex<FakeState>,
}

impl FakeBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solution(self, solution: Solution) -> Self {
        self.state.lock().unwrap().solution = Some(solution);
        self
    }

    pub fn with_symbols(self, symbols: Vec<Symbol>) -> Self {
        self.state.lock().unwrap().symbols = symbols;
        self
    }

    pub fn with_project_diagnostics(self, project_id: &str, diagnostics: Vec<Diagnostic>) -> Self {
        self.state
            .lock()
            .unwrap()
            .project_diagnostics
            .insert(project_id.to_string(), diagnostics);
        self
    }

    pub fn with_document_diagnostics(self, document_id: &str, diagnostics: Vec<Diagnostic>) -> Self {
        self.state
            .lock()
            .unwrap()
            .document_diagnostics
            .insert(document_id.to_string(), diagnostics);
        self
    }

    pub fn with_node_chain(
        self,
        document_id: &str,
        offset: usize,
        chain: Vec<SyntaxNodeInfo>,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .node_chains
            .insert((document_id.to_string(), offset), chain);
        self
    }

    pub fn with_containing_member(
        self,
        document_id: &str,
        offset: usize,
        symbol: Symbol,
        location: Location,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .containing_members
            .insert((document_id.to_string(), offset), (symbol, location));
        self
    }

    pub fn with_references(self, symbol_bridge_id: &str, hits: Vec<super::ReferenceHit>) -> Self {
        self.state
            .lock()
            .unwrap()
            .references
            .insert(symbol_bridge_id.to_string(), hits);
        self
    }

    pub fn with_implementations(self, symbol_bridge_id: &str, symbols: Vec<Symbol>) -> Self {
        self.state
            .lock()
            .unwrap()
            .implementations
            .insert(symbol_bridge_id.to_string(), symbols);
        self
    }

    pub fn with_callers(self, symbol_bridge_id: &str, edges: Vec<CallerEdge>) -> Self {
        self.state
            .lock()
            .unwrap()
            .callers
            .insert(symbol_bridge_id.to_string(), edges);
        self
    }

    pub fn with_base_types(self, symbol_bridge_id: &str, symbols: Vec<Symbol>) -> Self {
        self.state
            .lock()
            .unwrap()
            .base_types
            .insert(symbol_bridge_id.to_string(), symbols);
        self
    }

    pub fn with_interfaces(self, symbol_bridge_id: &str, symbols: Vec<Symbol>) -> Self {
        self.state
            .lock()
            .unwrap()
            .interfaces
            .insert(symbol_bridge_id.to_string(), symbols);
        self
    }

    pub fn with_derived_types(self, symbol_bridge_id: &str, symbols: Vec<Symbol>) -> Self {
        self.state
            .lock()
            .unwrap()
            .derived_types
            .insert(symbol_bridge_id.to_string(), symbols);
        self
    }

    pub fn with_definition(self, symbol_bridge_id: &str, location: Location) -> Self {
        self.state
            .lock()
            .unwrap()
            .definitions
            .insert(symbol_bridge_id.to_string(), location);
        self
    }

    pub fn with_overloads(self, symbol_bridge_id: &str, symbols: Vec<Symbol>) -> Self {
        self.state
            .lock()
            .unwrap()
            .overloads
            .insert(symbol_bridge_id.to_string(), symbols);
        self
    }

    pub fn with_rename_result(self, symbol_bridge_id: &str, result: RenameResult) -> Self {
        self.state
            .lock()
            .unwrap()
            .rename_results
            .insert(symbol_bridge_id.to_string(), result);
        self
    }

    pub fn with_using_directives(self, document_id: &str, directives: Vec<UsingDirective>) -> Self {
        self.state
            .lock()
            .unwrap()
            .using_directives
            .insert(document_id.to_string(), directives);
        self
    }

    pub fn with_organized_text(self, document_id: &str, text: impl Into<String>) -> Self {
        self.state
            .lock()
            .unwrap()
            .organized_text
            .insert(document_id.to_string(), text.into());
        self
    }

    pub fn with_formatted_text(self, document_id: &str, text: impl Into<String>) -> Self {
        self.state
            .lock()
            .unwrap()
            .formatted_text
            .insert(document_id.to_string(), text.into());
        self
    }

    pub fn with_code_fixes(
        self,
        document_id: &str,
        diagnostic_id: &str,
        offset: usize,
        actions: Vec<CodeFixAction>,
    ) -> Self {
        self.state.lock().unwrap().code_fixes.insert(
            (document_id.to_string(), diagnostic_id.to_string(), offset),
            actions,
        );
        self
    }

    pub fn with_code_fix_result(
        self,
        document_id: &str,
        diagnostic_id: &str,
        offset: usize,
        fix_index: usize,
        result: CodeFixResult,
    ) -> Self {
        self.state.lock().unwrap().code_fix_results.insert(
            (
                document_id.to_string(),
                diagnostic_id.to_string(),
                offset,
                fix_index,
            ),
            result,
        );
        self
    }
}

#[async_trait]
impl SolutionBridge for FakeBridge {
    async fn open_solution(&self, path: &Path) -> Result<Solution, BridgeError> {
        let state = self.state.lock().unwrap();
        match &state.solution {
            Some(solution) if solution.path == path => Ok(solution.clone()),
            Some(solution) => Ok(Solution {
                path: path.to_path_buf(),
                ..solution.clone()
            }),
            None => Err(BridgeError::SolutionNotFound(path.to_path_buf())),
        }
    }

    async fn project_diagnostics(&self, project_id: &str) -> Result<Vec<Diagnostic>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .project_diagnostics
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn document_diagnostics(
        &self,
        document_id: &str,
    ) -> Result<Vec<Diagnostic>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .document_diagnostics
            .get(document_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn all_symbols(&self) -> Result<Vec<Symbol>, BridgeError> {
        Ok(self.state.lock().unwrap().symbols.clone())
    }

    async fn node_chain_at_offset(
        &self,
        document_id: &str,
        offset: usize,
        max_ancestors: usize,
    ) -> Result<Option<Vec<SyntaxNodeInfo>>, BridgeError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .node_chains
            .get(&(document_id.to_string(), offset))
            .map(|chain| chain.iter().take(max_ancestors + 1).cloned().collect()))
    }

    async fn containing_member(
        &self,
        document_id: &str,
        offset: usize,
    ) -> Result<Option<(Symbol, Location)>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .containing_members
            .get(&(document_id.to_string(), offset))
            .cloned())
    }

    async fn find_references(
        &self,
        symbol_bridge_id: &str,
    ) -> Result<Vec<super::ReferenceHit>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .references
            .get(symbol_bridge_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_implementations(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .implementations
            .get(symbol_bridge_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_callers(&self, symbol_bridge_id: &str) -> Result<Vec<CallerEdge>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .callers
            .get(symbol_bridge_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn base_types(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .base_types
            .get(symbol_bridge_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn interfaces(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .interfaces
            .get(symbol_bridge_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn derived_types(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .derived_types
            .get(symbol_bridge_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn go_to_definition(&self, symbol_bridge_id: &str) -> Result<Option<Location>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .definitions
            .get(symbol_bridge_id)
            .cloned())
    }

    async fn method_overloads(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .overloads
            .get(symbol_bridge_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn rename(&self, symbol_bridge_id: &str, new_name: &str) -> Result<RenameResult, BridgeError> {
        let state = self.state.lock().unwrap();
        state
            .rename_results
            .get(symbol_bridge_id)
            .cloned()
            .ok_or_else(|| {
                BridgeError::Remote(format!(
                    "no seeded rename result for symbol '{symbol_bridge_id}' -> '{new_name}'"
                ))
            })
    }

    async fn using_directives(&self, document_id: &str) -> Result<Vec<UsingDirective>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .using_directives
            .get(document_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn organize_usings(&self, document_id: &str) -> Result<String, BridgeError> {
        let state = self.state.lock().unwrap();
        state
            .organized_text
            .get(document_id)
            .cloned()
            .or_else(|| state.solution.as_ref().and_then(|s| s.document(document_id)).map(|(_, d)| d.text.clone()))
            .ok_or_else(|| BridgeError::Protocol(format!("no document '{document_id}'")))
    }

    async fn format_document(&self, document_id: &str) -> Result<String, BridgeError> {
        let state = self.state.lock().unwrap();
        state
            .formatted_text
            .get(document_id)
            .cloned()
            .or_else(|| state.solution.as_ref().and_then(|s| s.document(document_id)).map(|(_, d)| d.text.clone()))
            .ok_or_else(|| BridgeError::Protocol(format!("no document '{document_id}'")))
    }

    async fn discover_code_fixes(
        &self,
        document_id: &str,
        diagnostic_id: &str,
        offset: usize,
    ) -> Result<Vec<CodeFixAction>, BridgeError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .code_fixes
            .get(&(document_id.to_string(), diagnostic_id.to_string(), offset))
            .cloned()
            .unwrap_or_default())
    }

    async fn apply_code_fix(
        &self,
        document_id: &str,
        diagnostic_id: &str,
        offset: usize,
        fix_index: usize,
    ) -> Result<CodeFixResult, BridgeError> {
        let state = self.state.lock().unwrap();
        state
            .code_fix_results
            .get(&(
                document_id.to_string(),
                diagnostic_id.to_string(),
                offset,
                fix_index,
            ))
            .cloned()
            .ok_or_else(|| {
                BridgeError::Remote(format!(
                    "no seeded code fix result for document '{document_id}' diagnostic '{diagnostic_id}' offset {offset} index {fix_index}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Accessibility, SymbolKind};

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
    async fn unseeded_lookups_return_empty_not_error() {
        let bridge = FakeBridge::new();
        assert!(bridge.find_references("missing").await.unwrap().is_empty());
        assert!(bridge
            .find_implementations("missing")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn seeded_implementations_round_trip() {
        let bridge = FakeBridge::new().with_implementations(
            "iface#1",
            vec![symbol("impl#1", SymbolKind::Class)],
        );
        let found = bridge.find_implementations("iface#1").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].bridge_id, "impl#1");
    }

    #[tokio::test]
    async fn unseeded_rename_is_an_error_not_a_silent_noop() {
        let bridge = FakeBridge::new();
        assert!(bridge.rename("sym#1", "NewName").await.is_err());
    }
}
