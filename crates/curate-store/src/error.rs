//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::entity::EntityId;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entity with this id is registered.
    #[error("unknown entity: {id}")]
    UnknownEntity { id: EntityId },

    /// The entity is registered but its content is gone.
    #[error("entity {id} points at missing content: {path}")]
    MissingContent { id: EntityId, path: PathBuf },

    /// The entity cannot be read as a table.
    #[error("entity {id} is not a table: {reason}")]
    NotATable { id: EntityId, reason: String },

    /// The entity is not a folder.
    #[error("entity {id} is not a folder")]
    NotAFolder { id: EntityId },

    /// A workbook has no sheet of that name.
    #[error("entity {id} has no sheet '{sheet}' (available: {})", available.join(", "))]
    SheetNotFound {
        id: EntityId,
        sheet: String,
        available: Vec<String>,
    },

    /// The ledger table lacks a required column.
    #[error("ledger {id} has no '{column}' column")]
    InvalidLedger { id: EntityId, column: String },

    /// File I/O error.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `store.toml` is missing or malformed.
    #[error("invalid store manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// Table reading or writing failed.
    #[error(transparent)]
    Ingest(#[from] curate_ingest::IngestError),

    /// Provenance sidecar (de)serialization failed.
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
