//! Shells out to an external Roslyn-hosted bridge process and exchanges
//! line-delimited JSON requests/responses over its stdio.
//!
//! Grounded the way `foundry-compilers`' `Resolc` compiler locates and
//! drives an external `resolc`/`solc` binary via [`which`] and
//! `std::process::Command`: the actual semantic engine is never vendored
//! into this crate, only spawned and spoken to.

use super::{
    BridgeError, CallerEdge, CodeFixAction, CodeFixResult, RenameResult, SolutionBridge,
    SyntaxNodeInfo, UsingDirective,
};
use crate::model::{ChangeKind, Diagnostic, Location, Solution, Symbol};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    id: u64,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Drives an external compiler-bridge process over stdio.
///
/// A single `Mutex` serializes calls: the process model is request/response,
/// one in flight at a time, which matches the single-client, strictly
/// sequential request processing the rest of the service exposes (spec.md
/// §5) — there is never a reason to pipeline bridge calls here.
pub struct ProcessBridge {
    child: Mutex<Child>,
    stdin: Mutex<ChildStdin>,
    stdout: Mutex<BufReader<ChildStdout>>,
    next_id: AtomicU64,
    timeout: Duration,
}

impl ProcessBridge {
    /// Spawn `cmd` (resolved via `PATH` through [`which`] if not already an
    /// absolute path) and take ownership of its stdio.
    pub fn spawn(cmd: &str, timeout: Duration) -> Result<Self, BridgeError> {
        let resolved = which::which(cmd).unwrap_or_else(|_| PathBuf::from(cmd));

        let mut child = Command::new(&resolved)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                cmd: cmd.to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(BridgeError::ProcessExited)?;
        let stdout = child.stdout.take().ok_or(BridgeError::ProcessExited)?;

        Ok(Self {
            child: Mutex::new(child),
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(BufReader::new(stdout)),
            next_id: AtomicU64::new(1),
            timeout,
        })
    }

    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, BridgeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = WireRequest { id, method, params };
        let mut line = serde_json::to_string(&request)
            .map_err(|e| BridgeError::Protocol(e.to_string()))?;
        line.push('\n');

        tokio::time::timeout(self.timeout, self.roundtrip(id, &line))
            .await
            .map_err(|_| BridgeError::Timeout(self.timeout))?
    }

    async fn roundtrip(&self, id: u64, line: &str) -> Result<serde_json::Value, BridgeError> {
        {
            let mut stdin = self.stdin.lock().await;
            stdin.write_all(line.as_bytes()).await?;
            stdin.flush().await?;
        }

        let mut stdout = self.stdout.lock().await;
        loop {
            let mut buf = String::new();
            let read = stdout.read_line(&mut buf).await?;
            if read == 0 {
                return Err(BridgeError::ProcessExited);
            }
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            let response: WireResponse = serde_json::from_str(trimmed)
                .map_err(|e| BridgeError::Protocol(format!("{e}: {trimmed}")))?;
            if response.id != id {
                // Stale response for a call this client gave up on (timeout);
                // discard and keep reading for ours.
                continue;
            }
            if let Some(message) = response.error {
                return Err(BridgeError::Remote(message));
            }
            return response
                .result
                .ok_or_else(|| BridgeError::Protocol("response had neither result nor error".into()));
        }
    }

    fn decode<T: for<'de> Deserialize<'de>>(value: serde_json::Value) -> Result<T, BridgeError> {
        serde_json::from_value(value).map_err(|e| BridgeError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl SolutionBridge for ProcessBridge {
    async fn open_solution(&self, path: &Path) -> Result<Solution, BridgeError> {
        let result = self
            .call("open_solution", serde_json::json!({ "path": path }))
            .await?;
        Self::decode(result)
    }

    async fn project_diagnostics(&self, project_id: &str) -> Result<Vec<Diagnostic>, BridgeError> {
        let result = self
            .call(
                "project_diagnostics",
                serde_json::json!({ "projectId": project_id }),
            )
            .await?;
        Self::decode(result)
    }

    async fn document_diagnostics(
        &self,
        document_id: &str,
    ) -> Result<Vec<Diagnostic>, BridgeError> {
        let result = self
            .call(
                "document_diagnostics",
                serde_json::json!({ "documentId": document_id }),
            )
            .await?;
        Self::decode(result)
    }

    async fn all_symbols(&self) -> Result<Vec<Symbol>, BridgeError> {
        let result = self.call("all_symbols", serde_json::json!({})).await?;
        Self::decode(result)
    }

    async fn node_chain_at_offset(
        &self,
        document_id: &str,
        offset: usize,
        max_ancestors: usize,
    ) -> Result<Option<Vec<SyntaxNodeInfo>>, BridgeError> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(rename = "nodeKind")]
            node_kind: String,
            #[serde(rename = "tokenText")]
            token_text: String,
            #[serde(rename = "tokenKind")]
            token_kind: String,
            #[serde(rename = "declaredSymbol")]
            declared_symbol: Option<Symbol>,
            #[serde(rename = "referencedSymbol")]
            referenced_symbol: Option<Symbol>,
        }

        let result = self
            .call(
                "node_chain_at_offset",
                serde_json::json!({
                    "documentId": document_id,
                    "offset": offset,
                    "maxAncestors": max_ancestors,
                }),
            )
            .await?;
        let decoded: Option<Vec<Wire>> = Self::decode(result)?;
        Ok(decoded.map(|chain| {
            chain
                .into_iter()
                .map(|w| SyntaxNodeInfo {
                    node_kind: w.node_kind,
                    token_text: w.token_text,
                    token_kind: w.token_kind,
                    declared_symbol: w.declared_symbol,
                    referenced_symbol: w.referenced_symbol,
                })
                .collect()
        }))
    }

    async fn containing_member(
        &self,
        document_id: &str,
        offset: usize,
    ) -> Result<Option<(Symbol, Location)>, BridgeError> {
        let result = self
            .call(
                "containing_member",
                serde_json::json!({ "documentId": document_id, "offset": offset }),
            )
            .await?;
        Self::decode(result)
    }

    async fn find_references(&self, symbol_bridge_id: &str) -> Result<Vec<super::ReferenceHit>, BridgeError> {
        #[derive(Deserialize)]
        struct Wire {
            location: Location,
            excerpt: String,
        }
        let result = self
            .call(
                "find_references",
                serde_json::json!({ "symbolId": symbol_bridge_id }),
            )
            .await?;
        let decoded: Vec<Wire> = Self::decode(result)?;
        Ok(decoded
            .into_iter()
            .map(|w| super::ReferenceHit {
                location: w.location,
                excerpt: w.excerpt,
            })
            .collect())
    }

    async fn find_implementations(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        let result = self
            .call(
                "find_implementations",
                serde_json::json!({ "symbolId": symbol_bridge_id }),
            )
            .await?;
        Self::decode(result)
    }

    async fn find_callers(&self, symbol_bridge_id: &str) -> Result<Vec<CallerEdge>, BridgeError> {
        #[derive(Deserialize)]
        struct Wire {
            caller: Symbol,
            #[serde(rename = "callSites")]
            call_sites: Vec<Location>,
        }
        let result = self
            .call(
                "find_callers",
                serde_json::json!({ "symbolId": symbol_bridge_id }),
            )
            .await?;
        let decoded: Vec<Wire> = Self::decode(result)?;
        Ok(decoded
            .into_iter()
            .map(|w| CallerEdge {
                caller: w.caller,
                call_sites: w.call_sites,
            })
            .collect())
    }

    async fn base_types(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        let result = self
            .call("base_types", serde_json::json!({ "symbolId": symbol_bridge_id }))
            .await?;
        Self::decode(result)
    }

    async fn interfaces(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        let result = self
            .call("interfaces", serde_json::json!({ "symbolId": symbol_bridge_id }))
            .await?;
        Self::decode(result)
    }

    async fn derived_types(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        let result = self
            .call(
                "derived_types",
                serde_json::json!({ "symbolId": symbol_bridge_id }),
            )
            .await?;
        Self::decode(result)
    }

    async fn go_to_definition(&self, symbol_bridge_id: &str) -> Result<Option<Location>, BridgeError> {
        let result = self
            .call(
                "go_to_definition",
                serde_json::json!({ "symbolId": symbol_bridge_id }),
            )
            .await?;
        Self::decode(result)
    }

    async fn method_overloads(&self, symbol_bridge_id: &str) -> Result<Vec<Symbol>, BridgeError> {
        let result = self
            .call(
                "method_overloads",
                serde_json::json!({ "symbolId": symbol_bridge_id }),
            )
            .await?;
        Self::decode(result)
    }

    async fn rename(&self, symbol_bridge_id: &str, new_name: &str) -> Result<RenameResult, BridgeError> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(rename = "changedDocuments")]
            changed_documents: Vec<(String, PathBuf, String)>,
        }
        let result = self
            .call(
                "rename",
                serde_json::json!({ "symbolId": symbol_bridge_id, "newName": new_name }),
            )
            .await?;
        let decoded: Wire = Self::decode(result)?;
        Ok(RenameResult {
            changed_documents: decoded.changed_documents,
        })
    }

    async fn using_directives(&self, document_id: &str) -> Result<Vec<UsingDirective>, BridgeError> {
        let result = self
            .call(
                "using_directives",
                serde_json::json!({ "documentId": document_id }),
            )
            .await?;
        Self::decode(result)
    }

    async fn organize_usings(&self, document_id: &str) -> Result<String, BridgeError> {
        #[derive(Deserialize)]
        struct Wire {
            text: String,
        }
        let result = self
            .call(
                "organize_usings",
                serde_json::json!({ "documentId": document_id }),
            )
            .await?;
        let decoded: Wire = Self::decode(result)?;
        Ok(decoded.text)
    }

    async fn format_document(&self, document_id: &str) -> Result<String, BridgeError> {
        #[derive(Deserialize)]
        struct Wire {
            text: String,
        }
        let result = self
            .call(
                "format_document",
                serde_json::json!({ "documentId": document_id }),
            )
            .await?;
        let decoded: Wire = Self::decode(result)?;
        Ok(decoded.text)
    }

    async fn discover_code_fixes(
        &self,
        document_id: &str,
        diagnostic_id: &str,
        offset: usize,
    ) -> Result<Vec<CodeFixAction>, BridgeError> {
        let result = self
            .call(
                "discover_code_fixes",
                serde_json::json!({
                    "documentId": document_id,
                    "diagnosticId": diagnostic_id,
                    "offset": offset,
                }),
            )
            .await?;
        Self::decode(result)
    }

    async fn apply_code_fix(
        &self,
        document_id: &str,
        diagnostic_id: &str,
        offset: usize,
        fix_index: usize,
    ) -> Result<CodeFixResult, BridgeError> {
        #[derive(Deserialize)]
        struct Wire {
            changes: Vec<(String, PathBuf, ChangeKind, Option<String>)>,
        }
        let result = self
            .call(
                "apply_code_fix",
                serde_json::json!({
                    "documentId": document_id,
                    "diagnosticId": diagnostic_id,
                    "offset": offset,
                    "fixIndex": fix_index,
                }),
            )
            .await?;
        let decoded: Wire = Self::decode(result)?;
        Ok(CodeFixResult {
            changes: decoded.changes,
        })
    }
}
