//! The `store.toml` registry of a local store.
//!
//! ```toml
//! [store]
//! schema_version = 1
//!
//! [[entities]]
//! id = "syn22294851"
//! path = "reference/scope_of_release"
//! name = "PRISSMM scope of release"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::{Result, StoreError};

pub const MANIFEST_FILE: &str = "store.toml";
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreManifest {
    #[serde(default)]
    pub store: ManifestHeader,
    #[serde(default)]
    pub entities: Vec<ManifestEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema_version: u32,
}

impl Default for ManifestHeader {
    fn default() -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntity {
    pub id: EntityId,
    /// Path relative to the store root, `/`-separated.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ManifestEntity {
    /// Display name: the explicit name, else the last path component.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.path.rsplit('/').next().unwrap_or(&self.path))
    }
}

impl StoreManifest {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        let text = std::fs::read_to_string(&path).map_err(|e| StoreError::Manifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let manifest: Self = toml::from_str(&text).map_err(|e| StoreError::Manifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        manifest.validate(&path)?;
        Ok(manifest)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(MANIFEST_FILE);
        let text = toml::to_string_pretty(self).map_err(|e| StoreError::Manifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        curate_ingest::write_atomic(&path, text.as_bytes())?;
        Ok(())
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |reason: String| StoreError::Manifest {
            path: path.to_path_buf(),
            reason,
        };
        if self.store.schema_version > MANIFEST_SCHEMA_VERSION {
            return Err(invalid(format!(
                "schema version {} is newer than supported version {MANIFEST_SCHEMA_VERSION}",
                self.store.schema_version
            )));
        }
        let mut seen = std::collections::BTreeSet::new();
        for entity in &self.entities {
            if entity.id.as_str().is_empty() {
                return Err(invalid("entity with an empty id".to_string()));
            }
            if !seen.insert(&entity.id) {
                return Err(invalid(format!("entity {} is registered twice", entity.id)));
            }
            if Path::new(&entity.path).is_absolute()
                || entity.path.split('/').any(|part| part == "..")
            {
                return Err(invalid(format!(
                    "entity {} path '{}' must stay inside the store",
                    entity.id, entity.path
                )));
            }
        }
        Ok(())
    }

    pub fn find(&self, id: &EntityId) -> Option<&ManifestEntity> {
        self.entities.iter().find(|entity| &entity.id == id)
    }

    /// Inserts `entity`, replacing any entry with the same id.
    pub fn upsert(&mut self, entity: ManifestEntity) {
        match self.entities.iter_mut().find(|existing| existing.id == entity.id) {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
    }
}
