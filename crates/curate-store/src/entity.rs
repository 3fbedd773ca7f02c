//! Entity identifiers and the values exchanged with a store.

use std::fmt;
use std::path::PathBuf;

use curate_model::ProvenanceRecord;
use serde::{Deserialize, Serialize};

/// Opaque store identifier, e.g. `syn22294851`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// A fetched entity: its content is available at `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedEntity {
    pub id: EntityId,
    pub name: String,
    pub path: PathBuf,
}

/// A direct child of a folder entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChildEntry {
    pub name: String,
    pub id: EntityId,
}

/// A local file to upload under `parent`, named `name`.
#[derive(Debug, Clone)]
pub struct StoreRequest {
    pub local_path: PathBuf,
    pub name: String,
    pub parent: EntityId,
    pub provenance: ProvenanceRecord,
}

/// Where a stored file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntity {
    pub id: EntityId,
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
}
