use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use roslyn_mcp::bridge::{ProcessBridge, SolutionBridge};
use roslyn_mcp::config::Config;
use roslyn_mcp::server::{Core, McpServer};
use tracing::{info, warn};

/// If `SOLUTION_PATH` resolves to a `.sln` file, or a directory containing
/// exactly one, return it. A directory with zero or multiple solution files
/// is ambiguous and is left for an explicit `load_solution` call (spec.md
/// §4.9 startup sequencing).
fn resolve_startup_solution(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if !path.is_dir() {
        return None;
    }
    let entries = std::fs::read_dir(path).ok()?;
    let solutions: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sln"))
        .collect();
    match solutions.as_slice() {
        [only] => Some(only.clone()),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    let filter = config
        .rust_log
        .clone()
        .map(tracing_subscriber::EnvFilter::new)
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new(config.log_level.as_filter_directive()));

    // All logging goes to stderr: stdout is the line-delimited JSON-RPC
    // channel and must never carry anything but protocol frames (spec.md §5).
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("starting roslyn-mcp");

    let bridge: Arc<dyn SolutionBridge> =
        Arc::new(ProcessBridge::spawn(&config.bridge_cmd, Duration::from_secs(config.timeout_seconds)).context("failed to launch compiler bridge")?);

    let solution_path = config.solution_path.clone();
    let core = Arc::new(Core::new(bridge, config));

    if let Some(requested) = solution_path {
        match resolve_startup_solution(&requested) {
            Some(resolved) => {
                let mut workspace = core.workspace.write().await;
                match workspace.load(core.bridge.as_ref(), &resolved).await {
                    Ok((projects, documents)) => {
                        info!(projects, documents, path = %resolved.display(), "loaded solution at startup");
                    }
                    Err(e) => {
                        // Autoload failure is non-fatal: the client can retry with loadSolution.
                        warn!("failed to autoload solution at startup: {e}");
                    }
                }
            }
            None => {
                warn!(
                    "SOLUTION_PATH '{}' is not a solution file and does not contain exactly one, skipping autoload",
                    requested.display()
                );
            }
        }
    }

    let server = McpServer::new(core);
    let service = server.serve(stdio()).await.context("MCP serve error")?;
    service.waiting().await.context("MCP runtime error")?;

    Ok(())
}
