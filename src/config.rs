//! Process configuration resolved from the environment (spec.md §6.3).
//!
//! Mirrors the teacher's config layer in shape — one fallible
//! `Config::from_env()` constructor, fixed defaults, a dedicated error enum
//! for malformed values — but the source is environment variables rather
//! than a JSONC file, since this service is headless and has no project
//! directory to discover a config file in.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a valid integer, got '{value}'")]
    InvalidInteger { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Information,
    Warning,
    Error,
}

impl LogLevel {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warning" | "warn" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Information,
        }
    }

    /// The `tracing_subscriber::EnvFilter` directive this level corresponds
    /// to, used when `RUST_LOG` is not set.
    pub fn as_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Information => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Process configuration (spec.md §6.3, SPEC_FULL.md §6.3).
#[derive(Debug, Clone)]
pub struct Config {
    /// File, or directory containing exactly one solution file, to autoload
    /// at startup. Absent when `SOLUTION_PATH` is unset.
    pub solution_path: Option<PathBuf>,
    pub log_level: LogLevel,
    /// Full `tracing_subscriber::EnvFilter` directive, when `RUST_LOG` is set.
    pub rust_log: Option<String>,
    pub enable_semantic_cache: bool,
    pub max_diagnostics: usize,
    pub timeout_seconds: u64,
    /// External bridge executable consulted by `ProcessBridge`.
    pub bridge_cmd: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_vars(|key| std::env::var(key).ok())
    }

    /// Testable seam: resolve from an arbitrary lookup function instead of
    /// the real process environment.
    pub fn from_env_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let solution_path = get("SOLUTION_PATH").map(PathBuf::from);

        let log_level = get("LOG_LEVEL")
            .map(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Information);

        let rust_log = get("RUST_LOG");

        let enable_semantic_cache = get("ENABLE_SEMANTIC_CACHE")
            .map(|v| v != "false")
            .unwrap_or(true);

        let max_diagnostics = parse_int(&get, "MAX_DIAGNOSTICS", 100)?;
        let timeout_seconds = parse_int(&get, "TIMEOUT_SECONDS", 30)?;

        let bridge_cmd = get("ROSLYN_BRIDGE_CMD").unwrap_or_else(|| "dotnet-roslyn-bridge".to_string());

        Ok(Self {
            solution_path,
            log_level,
            rust_log,
            enable_semantic_cache,
            max_diagnostics,
            timeout_seconds,
            bridge_cmd,
        })
    }
}

fn parse_int<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidInteger { var, value }),
    }
}
