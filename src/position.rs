//! Position Resolver (C1, spec.md §4.1).
//!
//! The ancestor-walk / offset-nudge tolerance algorithm is structured the
//! same way `jvl::parse::offset_to_pointer_walk` walks a parsed AST by byte
//! offset, except it walks the bridge's syntax-node chain instead of a JSONC
//! AST, and retries ancestors and neighboring offsets per the six-step
//! algorithm below.

use crate::bridge::{BridgeError, SolutionBridge, SyntaxNodeInfo};
use crate::model::Symbol;

const MAX_ANCESTORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStrategy {
    DeclaredOnNode,
    ReferencedOnNode,
    DeclaredOnAncestor(usize),
    ReferencedOnAncestor(usize),
    OffsetMinusOne,
    OffsetPlusOne,
}

impl PositionStrategy {
    fn as_str(self) -> String {
        match self {
            PositionStrategy::DeclaredOnNode => "declared-on-node".to_string(),
            PositionStrategy::ReferencedOnNode => "referenced-on-node".to_string(),
            PositionStrategy::DeclaredOnAncestor(n) => format!("declared-on-ancestor-{n}"),
            PositionStrategy::ReferencedOnAncestor(n) => format!("referenced-on-ancestor-{n}"),
            PositionStrategy::OffsetMinusOne => "offset-1".to_string(),
            PositionStrategy::OffsetPlusOne => "offset+1".to_string(),
        }
    }
}

/// A resolved token/node/symbol triple (spec.md §4.1 success payload).
#[derive(Debug, Clone)]
pub struct Resolved {
    pub node_kind: String,
    pub token_text: String,
    pub token_kind: String,
    pub symbol: Option<Symbol>,
    pub found_via: String,
}

/// Structured "not found" payload (spec.md §4.1 step 6): never an error,
/// always a value the caller can serialize directly.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NotFound {
    pub requested_line: u32,
    pub requested_column: u32,
    pub token_text: Option<String>,
    pub token_kind: Option<String>,
    pub node_kind: Option<String>,
    pub strategies_attempted: Vec<String>,
    pub hint: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("line/column out of range for this document")]
    InvalidPosition,
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub enum Outcome {
    Resolved(Resolved),
    NotFound(NotFound),
}

/// Convert a 0-based (line, column) into a byte offset in `text`. Returns
/// `None` when the position is out of range (spec.md §4.1 step 1).
pub fn line_col_to_offset(text: &str, line: u32, column: u32) -> Option<usize> {
    let line_start = if line == 0 {
        0
    } else {
        let mut seen = 0u32;
        let mut start = None;
        for (idx, ch) in text.char_indices() {
            if ch == '\n' {
                seen += 1;
                if seen == line {
                    start = Some(idx + 1);
                    break;
                }
            }
        }
        start?
    };

    let remainder = &text[line_start..];
    let mut col = 0u32;
    for (idx, ch) in remainder.char_indices() {
        if col == column {
            return Some(line_start + idx);
        }
        if ch == '\n' {
            return None;
        }
        col += 1;
    }
    if col == column {
        Some(text.len())
    } else {
        None
    }
}

/// Resolve a (document, line, column) to a symbol with tolerance (spec.md
/// §4.1). `document_text` is used only to compute the initial byte offset;
/// everything past that is delegated to the bridge's syntax tree.
pub async fn resolve(
    bridge: &dyn SolutionBridge,
    document_id: &str,
    document_text: &str,
    line: u32,
    column: u32,
) -> Result<Outcome, PositionError> {
    let offset = line_col_to_offset(document_text, line, column).ok_or(PositionError::InvalidPosition)?;

    let mut attempted = Vec::new();

    if let Some(outcome) = try_offset(bridge, document_id, offset, &mut attempted).await? {
        return Ok(outcome);
    }

    for delta_offset in [offset.checked_sub(1), offset.checked_add(1)] {
        let Some(nudged) = delta_offset else { continue };
        let strategy_label = if nudged < offset {
            PositionStrategy::OffsetMinusOne
        } else {
            PositionStrategy::OffsetPlusOne
        };
        attempted.push(strategy_label.as_str());
        if let Some(outcome) = try_offset(bridge, document_id, nudged, &mut Vec::new()).await? {
            return Ok(outcome);
        }
    }

    let (last_node_kind, last_token) = last_seen(bridge, document_id, offset).await?;

    Ok(Outcome::NotFound(NotFound {
        requested_line: line,
        requested_column: column,
        token_text: last_token.as_ref().map(|(text, _)| text.clone()),
        token_kind: last_token.map(|(_, kind)| kind),
        node_kind: last_node_kind,
        strategies_attempted: attempted,
        hint: "try adjusting column by +/-1 or re-check the declaration line".to_string(),
    }))
}

async fn try_offset(
    bridge: &dyn SolutionBridge,
    document_id: &str,
    offset: usize,
    attempted: &mut Vec<String>,
) -> Result<Option<Outcome>, PositionError> {
    let Some(chain) = bridge
        .node_chain_at_offset(document_id, offset, MAX_ANCESTORS)
        .await?
    else {
        return Ok(None);
    };

    for (depth, node) in chain.iter().enumerate() {
        let (declared_strategy, referenced_strategy) = if depth == 0 {
            (PositionStrategy::DeclaredOnNode, PositionStrategy::ReferencedOnNode)
        } else {
            (
                PositionStrategy::DeclaredOnAncestor(depth),
                PositionStrategy::ReferencedOnAncestor(depth),
            )
        };

        attempted.push(declared_strategy.as_str());
        if let Some(symbol) = &node.declared_symbol {
            return Ok(Some(Outcome::Resolved(resolved_from(node, symbol.clone(), declared_strategy))));
        }

        attempted.push(referenced_strategy.as_str());
        if let Some(symbol) = &node.referenced_symbol {
            return Ok(Some(Outcome::Resolved(resolved_from(node, symbol.clone(), referenced_strategy))));
        }
    }

    Ok(None)
}

fn resolved_from(node: &SyntaxNodeInfo, symbol: Symbol, via: PositionStrategy) -> Resolved {
    Resolved {
        node_kind: node.node_kind.clone(),
        token_text: node.token_text.clone(),
        token_kind: node.token_kind.clone(),
        symbol: Some(symbol),
        found_via: via.as_str(),
    }
}

async fn last_seen(
    bridge: &dyn SolutionBridge,
    document_id: &str,
    offset: usize,
) -> Result<(Option<String>, Option<(String, String)>), PositionError> {
    let chain = bridge.node_chain_at_offset(document_id, offset, 0).await?;
    Ok(match chain.and_then(|c| c.into_iter().next()) {
        Some(node) => (Some(node.node_kind.clone()), Some((node.token_text, node.token_kind))),
        None => (None, None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_at_start_of_line() {
        let text = "line0\nline1\nline2";
        assert_eq!(line_col_to_offset(text, 1, 0), Some(6));
    }

    #[test]
    fn offset_mid_line() {
        let text = "class Customer {}";
        assert_eq!(line_col_to_offset(text, 0, 6), Some(6));
    }

    #[test]
    fn offset_out_of_range_line_is_none() {
        let text = "one\ntwo";
        assert_eq!(line_col_to_offset(text, 5, 0), None);
    }

    #[test]
    fn offset_out_of_range_column_is_none() {
        let text = "ab\ncd";
        assert_eq!(line_col_to_offset(text, 0, 10), None);
    }
}
