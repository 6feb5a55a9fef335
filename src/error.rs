use std::time::Duration;
use thiserror::Error;

/// Errors raised while replicating a table schema or copying items.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("source table '{0}' does not exist")]
    SourceNotFound(String),

    #[error("failed to describe table '{table}': {message}")]
    Describe { table: String, message: String },

    #[error("invalid table definition: {0}")]
    Definition(String),

    #[error("failed to create table '{table}': {message}")]
    Create { table: String, message: String },

    #[error("table '{0}' did not become active within {1:?}")]
    CreationTimeout(String, Duration),

    #[error("scan of segment {segment} failed: {message}")]
    Scan { segment: i32, message: String },

    #[error("batch write to '{table}' failed: {message}")]
    BatchWrite { table: String, message: String },

    #[error("{count} items for '{table}' still unprocessed after {attempts} attempts")]
    UnprocessedItems {
        table: String,
        count: usize,
        attempts: u32,
    },
}

impl CopyError {
    /// Process exit code for a run aborted by this error.
    ///
    /// Every schema-phase failure is fatal before any copy work starts, so
    /// the whole taxonomy maps to 1. Copy-phase errors never reach the exit
    /// path directly; they are logged per worker by the orchestrator.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
