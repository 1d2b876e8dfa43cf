//! Workspace Cache (C1 in spec.md's table is Position Resolver; this is C2):
//! owns the active `Solution` and the document-by-path cache.
//!
//! `DocumentCache` guards its entries the same way `jvl::schema::SchemaCache`
//! guards compiled-validator slots: one entry per canonicalized key,
//! populated lazily, cleared wholesale on reload.

use crate::bridge::{BridgeError, SolutionBridge};
use crate::model::{Document, Project, Solution};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no solution is loaded")]
    NoSolutionLoaded,
    #[error("file '{0}' is not part of the loaded solution")]
    FileNotInSolution(PathBuf),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Canonicalizes a path the way spec.md §4.2 requires: resolve relative
/// components, case-fold on platforms where the filesystem is
/// case-insensitive. Falls back to the original path when the file does not
/// exist yet (canonicalize requires existence), since solution loading may
/// reference documents lazily.
fn canonical_key(path: &Path) -> PathBuf {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if cfg!(target_os = "windows") || cfg!(target_os = "macos") {
        PathBuf::from(resolved.to_string_lossy().to_ascii_lowercase())
    } else {
        resolved
    }
}

#[derive(Default)]
struct DocumentCache {
    enabled: bool,
    entries: HashMap<PathBuf, Document>,
}

impl DocumentCache {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: HashMap::new(),
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn get(&self, key: &Path) -> Option<&Document> {
        if self.enabled {
            self.entries.get(key)
        } else {
            None
        }
    }

    fn insert(&mut self, key: PathBuf, doc: Document) {
        if self.enabled {
            self.entries.insert(key, doc);
        }
    }
}

/// Owns the active `Solution`, if any, and its document cache.
///
/// Held behind a `tokio::sync::RwLock` inside `server::Core` (SPEC_FULL.md
/// §3): readers never block each other's lookups; `load` takes exclusive
/// access only to swap the Solution and clear the cache.
pub struct Workspace {
    solution: Option<Solution>,
    cache: DocumentCache,
    cache_enabled: bool,
}

/// Health snapshot (spec.md §4.2 `health()`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Health {
    pub status: &'static str,
    pub message: Option<String>,
    pub solution_path: Option<PathBuf>,
    pub project_count: usize,
    pub document_count: usize,
    pub cache_enabled: bool,
}

impl Workspace {
    pub fn new(cache_enabled: bool) -> Self {
        Self {
            solution: None,
            cache: DocumentCache::new(cache_enabled),
            cache_enabled,
        }
    }

    /// Open a solution via the bridge, tearing down any prior state (spec.md
    /// §4.2 `load`). Compiler warnings are the bridge's concern to log; this
    /// call never fails because of them.
    pub async fn load(
        &mut self,
        bridge: &dyn SolutionBridge,
        path: &Path,
    ) -> Result<(usize, usize), WorkspaceError> {
        let solution = bridge.open_solution(path).await?;
        let project_count = solution.projects.len();
        let document_count = solution.document_count();
        self.cache.clear();
        self.solution = Some(solution);
        Ok((project_count, document_count))
    }

    pub fn solution(&self) -> Result<&Solution, WorkspaceError> {
        self.solution.as_ref().ok_or(WorkspaceError::NoSolutionLoaded)
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.solution.as_ref().and_then(|s| s.project(project_id))
    }

    pub fn health(&self) -> Health {
        match &self.solution {
            None => Health {
                status: "Not Ready",
                message: Some("no solution loaded".to_string()),
                solution_path: None,
                project_count: 0,
                document_count: 0,
                cache_enabled: self.cache_enabled,
            },
            Some(solution) => Health {
                status: "Ready",
                message: None,
                solution_path: Some(solution.path.clone()),
                project_count: solution.projects.len(),
                document_count: solution.document_count(),
                cache_enabled: self.cache_enabled,
            },
        }
    }

    /// Resolve a path to its `(Project, Document)`, caching the hit (spec.md
    /// §4.2 `document(path)`). Invariant upheld: a cache hit and a full
    /// lookup return the same Document value for the same canonicalized path.
    pub fn document(&mut self, path: &Path) -> Result<(&Project, Document), WorkspaceError> {
        let solution = self.solution.as_ref().ok_or(WorkspaceError::NoSolutionLoaded)?;
        let key = canonical_key(path);

        if let Some(cached) = self.cache.get(&key) {
            let project = solution
                .projects
                .iter()
                .find(|p| p.documents.iter().any(|d| d.id == cached.id))
                .expect("cached document always belongs to a project in the current solution");
            return Ok((project, cached.clone()));
        }

        let found = solution.projects.iter().find_map(|project| {
            project
                .documents
                .iter()
                .find(|doc| {
                    doc.path
                        .as_deref()
                        .map(|p| canonical_key(p) == key)
                        .unwrap_or(false)
                })
                .map(|doc| (project, doc.clone()))
        });

        match found {
            Some((project, doc)) => {
                self.cache.insert(key, doc.clone());
                Ok((project, doc))
            }
            None => Err(WorkspaceError::FileNotInSolution(path.to_path_buf())),
        }
    }
}
