//! Name Search (C4, spec.md §4.4): glob/substring symbol search and the
//! richer semantic-filter query, sharing the same matching and pagination
//! machinery.
//!
//! Glob-to-regex compilation is hand-rolled against the `regex` crate rather
//! than pulled from `globset` (SPEC_FULL.md §4 C4 note): globset's glob
//! semantics target filesystem paths, not arbitrary symbol names, and don't
//! match spec.md's literal `*`/`?` conversion rule.

use crate::bridge::{BridgeError, SolutionBridge};
use crate::model::{Accessibility, Symbol};
use regex::Regex;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Convert a glob pattern to an anchored, case-insensitive regex per spec.md
/// §4.4: `*` -> `.*`, `?` -> `.`, everything else escaped literally.
pub fn glob_to_regex(pattern: &str) -> Regex {
    let mut out = String::from("(?i)^");
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(&ch.to_string())),
        }
    }
    out.push('$');
    Regex::new(&out).expect("glob-derived pattern is always a valid regex")
}

fn is_glob(query: &str) -> bool {
    query.contains('*') || query.contains('?')
}

fn name_matches(query: &str, name: &str) -> bool {
    if is_glob(query) {
        glob_to_regex(query).is_match(name)
    } else {
        name.to_ascii_lowercase().contains(&query.to_ascii_lowercase())
    }
}

fn kind_label(symbol: &Symbol) -> &'static str {
    symbol.kind.as_str()
}

fn kind_matches(filter: &str, symbol: &Symbol) -> bool {
    kind_label(symbol).eq_ignore_ascii_case(filter)
}

fn is_searchable(symbol: &Symbol) -> bool {
    !symbol.is_implicitly_declared && symbol.has_source_location()
}

fn namespace_of(symbol: &Symbol) -> &str {
    symbol.namespace.as_deref().unwrap_or("")
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub next_offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub total_count: usize,
    pub offset: usize,
    pub count: usize,
    pub has_more: bool,
    pub results: Vec<Symbol>,
    pub pagination: Pagination,
}

pub struct SearchSymbolsArgs<'a> {
    pub query: &'a str,
    pub kind: Option<&'a str>,
    pub namespace_filter: Option<&'a str>,
    pub max_results: usize,
    pub offset: usize,
}

/// Pagination accumulates matches until `offset + maxResults + 100` (spec.md
/// §4.4): the +100 lookahead lets `hasMore` be correct without scanning the
/// whole solution's symbol set for every page.
pub async fn search_symbols(
    bridge: &dyn SolutionBridge,
    args: SearchSymbolsArgs<'_>,
) -> Result<SearchResult, SearchError> {
    let all_symbols = bridge.all_symbols().await?;
    let stop_at = args.offset + args.max_results + 100;

    let namespace_regex = args.namespace_filter.map(glob_to_regex);

    let mut matches = Vec::new();
    for symbol in all_symbols {
        if matches.len() >= stop_at {
            break;
        }
        if !is_searchable(&symbol) {
            continue;
        }
        if !name_matches(args.query, &symbol.name) {
            continue;
        }
        if let Some(kind) = args.kind {
            if !kind_matches(kind, &symbol) {
                continue;
            }
        }
        if let Some(ns_regex) = &namespace_regex {
            if !ns_regex.is_match(namespace_of(&symbol)) {
                continue;
            }
        }
        matches.push(symbol);
    }

    let total_count = matches.len();
    let page: Vec<Symbol> = matches
        .into_iter()
        .skip(args.offset)
        .take(args.max_results)
        .collect();
    let count = page.len();
    let has_more = args.offset + count < total_count;

    Ok(SearchResult {
        total_count,
        offset: args.offset,
        count,
        has_more,
        results: page,
        pagination: Pagination {
            next_offset: has_more.then_some(args.offset + count),
        },
    })
}

#[derive(Debug, Default)]
pub struct SemanticFilters<'a> {
    pub kinds: Vec<&'a str>,
    pub is_async: Option<bool>,
    pub namespace_filter: Option<&'a str>,
    pub accessibility: Option<Accessibility>,
    pub is_static: Option<bool>,
    pub type_contains: Option<&'a str>,
    pub return_type_contains: Option<&'a str>,
    pub attributes: Vec<&'a str>,
    pub parameter_includes: Vec<&'a str>,
    pub parameter_excludes: Vec<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemanticQueryResult {
    pub total_count: usize,
    pub results: Vec<Symbol>,
    pub by_kind: Vec<(String, usize)>,
}

fn has_attribute(symbol: &Symbol, name: &str) -> bool {
    symbol.attributes.iter().any(|attr| {
        attr.short_name.eq_ignore_ascii_case(name) || attr.qualified_name.eq_ignore_ascii_case(name)
    })
}

fn parameter_type_contains(symbol: &Symbol, needle: &str) -> bool {
    symbol
        .method
        .as_ref()
        .map(|m| {
            m.parameters
                .iter()
                .any(|p| p.type_display.to_ascii_lowercase().contains(&needle.to_ascii_lowercase()))
        })
        .unwrap_or(false)
}

fn matches_semantic(symbol: &Symbol, filters: &SemanticFilters<'_>) -> bool {
    if !is_searchable(symbol) {
        return false;
    }
    if !filters.kinds.is_empty() && !filters.kinds.iter().any(|k| kind_matches(k, symbol)) {
        return false;
    }
    if let Some(namespace) = filters.namespace_filter {
        if !glob_to_regex(namespace).is_match(namespace_of(symbol)) {
            return false;
        }
    }
    if let Some(accessibility) = filters.accessibility {
        if symbol.accessibility != accessibility {
            return false;
        }
    }
    if let Some(is_static) = filters.is_static {
        if symbol.is_static != is_static {
            return false;
        }
    }
    if let Some(is_async) = filters.is_async {
        let actual = symbol.method.as_ref().map(|m| m.is_async).unwrap_or(false);
        if actual != is_async {
            return false;
        }
    }
    if let Some(type_needle) = filters.type_contains {
        let target = symbol
            .method
            .as_ref()
            .map(|m| m.return_type.as_str())
            .unwrap_or(&symbol.display_name);
        if !target.to_ascii_lowercase().contains(&type_needle.to_ascii_lowercase()) {
            return false;
        }
    }
    if let Some(return_needle) = filters.return_type_contains {
        let return_type = symbol.method.as_ref().map(|m| m.return_type.as_str()).unwrap_or("");
        if !return_type.to_ascii_lowercase().contains(&return_needle.to_ascii_lowercase()) {
            return false;
        }
    }
    if !filters.attributes.iter().all(|attr| has_attribute(symbol, attr)) {
        return false;
    }
    if !filters
        .parameter_includes
        .iter()
        .all(|needle| parameter_type_contains(symbol, needle))
    {
        return false;
    }
    if filters
        .parameter_excludes
        .iter()
        .any(|needle| parameter_type_contains(symbol, needle))
    {
        return false;
    }
    true
}

pub async fn semantic_query(
    bridge: &dyn SolutionBridge,
    filters: SemanticFilters<'_>,
    max_results: usize,
) -> Result<SemanticQueryResult, SearchError> {
    let all_symbols = bridge.all_symbols().await?;
    let matched: Vec<Symbol> = all_symbols
        .into_iter()
        .filter(|s| matches_semantic(s, &filters))
        .collect();

    let total_count = matched.len();

    let mut by_kind: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
    for symbol in &matched {
        *by_kind.entry(kind_label(symbol).to_string()).or_insert(0) += 1;
    }

    let results: Vec<Symbol> = matched.into_iter().take(max_results).collect();

    Ok(SemanticQueryResult {
        total_count,
        results,
        by_kind: by_kind.into_iter().collect(),
    })
}
