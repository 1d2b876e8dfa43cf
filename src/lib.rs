pub mod bridge;
pub mod config;
pub mod deadcode;
pub mod depgraph;
pub mod diagnostics_engine;
pub mod model;
pub mod position;
pub mod refactor;
pub mod search;
pub mod server;
pub mod symbols;
pub mod workspace;
