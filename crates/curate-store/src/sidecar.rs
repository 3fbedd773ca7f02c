//! Provenance sidecars written next to stored files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use curate_model::ProvenanceRecord;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::{Result, StoreError};

pub const SIDECAR_SUFFIX: &str = ".provenance.json";

/// Contents of `<name>.provenance.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceSidecar {
    pub entity_id: EntityId,
    pub name: String,
    pub sha256: String,
    pub stored_at: DateTime<Utc>,
    pub provenance: ProvenanceRecord,
}

pub fn sidecar_path(content_path: &Path) -> PathBuf {
    let mut name = content_path
        .file_name()
        .unwrap_or_default()
        .to_os_string();
    name.push(SIDECAR_SUFFIX);
    content_path.with_file_name(name)
}

pub fn write_sidecar(path: &Path, sidecar: &ProvenanceSidecar) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(sidecar).map_err(|e| StoreError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    curate_ingest::write_atomic(path, &bytes)?;
    Ok(())
}

pub fn read_sidecar(path: &Path) -> Result<ProvenanceSidecar> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })
}
