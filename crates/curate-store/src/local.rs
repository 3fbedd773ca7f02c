//! Directory-backed store.
//!
//! Entities are files or directories under the store root, registered in
//! `store.toml`. A directory entity is a folder; when read as a table it is
//! a workbook whose sheets are the delimited files inside it.

use std::path::{Path, PathBuf};

use chrono::Utc;
use curate_ingest::{
    ReadOptions, find_sheet, list_table_files, read_record_table, sheet_names, write_atomic,
};
use curate_model::{LedgerRow, RecordTable, cell_at};
use tracing::{debug, info};

use crate::backend::DataStore;
use crate::entity::{ChildEntry, EntityId, FetchedEntity, StoreRequest, StoredEntity};
use crate::error::{Result, StoreError};
use crate::hash::{compute_file_hash, local_entity_id};
use crate::manifest::{MANIFEST_FILE, ManifestEntity, StoreManifest};
use crate::sidecar::{ProvenanceSidecar, sidecar_path, write_sidecar};

/// Ledger columns accepted as the record identifier, in preference order.
pub const LEDGER_ID_COLUMNS: [&str; 2] = ["genie_id", "record_id"];
pub const LEDGER_SITE_COLUMN: &str = "site";
pub const LEDGER_PROJECT_COLUMN: &str = "project";

const NATIVE_WORKBOOK_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Opens an existing store, validating its manifest.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        StoreManifest::load(&root)?;
        Ok(Self { root })
    }

    /// Opens a store, creating the root and an empty manifest if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(MANIFEST_FILE).exists() {
            std::fs::create_dir_all(&root).map_err(|e| StoreError::Io {
                operation: "create directory",
                path: root.clone(),
                source: e,
            })?;
            StoreManifest::default().save(&root)?;
        }
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registers existing content under `id`.
    pub fn register(&self, id: EntityId, path: &str, name: Option<&str>) -> Result<()> {
        let mut manifest = StoreManifest::load(&self.root)?;
        manifest.upsert(ManifestEntity {
            id,
            path: path.trim_end_matches('/').to_string(),
            name: name.map(str::to_string),
        });
        manifest.save(&self.root)
    }

    fn resolve(&self, manifest: &StoreManifest, id: &EntityId) -> Result<(ManifestEntity, PathBuf)> {
        let entity = manifest
            .find(id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownEntity { id: id.clone() })?;
        let path = self.root.join(&entity.path);
        if !path.exists() {
            return Err(StoreError::MissingContent {
                id: id.clone(),
                path,
            });
        }
        Ok((entity, path))
    }

    fn resolve_folder(
        &self,
        manifest: &StoreManifest,
        id: &EntityId,
    ) -> Result<(ManifestEntity, PathBuf)> {
        let (entity, path) = self.resolve(manifest, id)?;
        if !path.is_dir() {
            return Err(StoreError::NotAFolder { id: id.clone() });
        }
        Ok((entity, path))
    }

    fn workbook_sheet(&self, id: &EntityId, workbook: &Path, sheet: Option<&str>) -> Result<PathBuf> {
        match sheet {
            Some(sheet) => find_sheet(workbook, sheet)?.ok_or_else(|| {
                StoreError::SheetNotFound {
                    id: id.clone(),
                    sheet: sheet.to_string(),
                    available: sheet_names(workbook).unwrap_or_default(),
                }
            }),
            None => list_table_files(workbook)?
                .into_iter()
                .next()
                .ok_or_else(|| StoreError::NotATable {
                    id: id.clone(),
                    reason: "workbook folder has no sheets".to_string(),
                }),
        }
    }
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

fn find_column(table: &RecordTable, name: &str) -> Option<usize> {
    table
        .columns
        .iter()
        .position(|column| column.trim().eq_ignore_ascii_case(name))
}

fn validate_name(parent: &EntityId, name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StoreError::NotATable {
            id: parent.clone(),
            reason: format!("'{name}' is not a valid file name"),
        });
    }
    Ok(())
}

impl DataStore for LocalStore {
    fn fetch(&self, id: &EntityId) -> Result<FetchedEntity> {
        let manifest = StoreManifest::load(&self.root)?;
        let (entity, path) = self.resolve(&manifest, id)?;
        debug!(id = %id, path = %path.display(), "fetched entity");
        Ok(FetchedEntity {
            id: id.clone(),
            name: entity.display_name().to_string(),
            path,
        })
    }

    fn fetch_table(
        &self,
        id: &EntityId,
        sheet: Option<&str>,
        options: &ReadOptions,
    ) -> Result<RecordTable> {
        let fetched = self.fetch(id)?;
        let table_path = if fetched.path.is_dir() {
            self.workbook_sheet(id, &fetched.path, sheet)?
        } else {
            let extension = fetched
                .path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default();
            if NATIVE_WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| extension.eq_ignore_ascii_case(known))
            {
                return Err(StoreError::NotATable {
                    id: id.clone(),
                    reason: "native spreadsheet files are not readable; export each sheet to CSV in a folder".to_string(),
                });
            }
            if let Some(sheet) = sheet {
                return Err(StoreError::NotATable {
                    id: id.clone(),
                    reason: format!("sheet '{sheet}' requested from a single-table entity"),
                });
            }
            fetched.path
        };
        Ok(read_record_table(&table_path, options)?)
    }

    fn list_children(&self, folder: &EntityId) -> Result<Vec<ChildEntry>> {
        let manifest = StoreManifest::load(&self.root)?;
        let (entity, _) = self.resolve_folder(&manifest, folder)?;
        let mut children: Vec<ChildEntry> = manifest
            .entities
            .iter()
            .filter(|child| child.id != entity.id && parent_of(&child.path) == entity.path)
            .map(|child| ChildEntry {
                name: child.display_name().to_string(),
                id: child.id.clone(),
            })
            .collect();
        children.sort();
        Ok(children)
    }

    fn query_ledger(&self, ledger: &EntityId, project: &str) -> Result<Vec<LedgerRow>> {
        let table = self.fetch_table(ledger, None, &ReadOptions::csv())?;
        let id_idx = LEDGER_ID_COLUMNS
            .iter()
            .find_map(|column| find_column(&table, column))
            .ok_or_else(|| StoreError::InvalidLedger {
                id: ledger.clone(),
                column: LEDGER_ID_COLUMNS.join(" or "),
            })?;
        let column = |name: &str| {
            find_column(&table, name).ok_or_else(|| StoreError::InvalidLedger {
                id: ledger.clone(),
                column: name.to_string(),
            })
        };
        let site_idx = column(LEDGER_SITE_COLUMN)?;
        let project_idx = column(LEDGER_PROJECT_COLUMN)?;

        let rows: Vec<LedgerRow> = table
            .rows
            .iter()
            .filter(|row| cell_at(row, project_idx).as_str().map(str::trim) == Some(project))
            .filter_map(|row| {
                Some(LedgerRow {
                    record_id: cell_at(row, id_idx).as_str()?.trim().to_string(),
                    site: cell_at(row, site_idx).as_str().unwrap_or_default().trim().to_string(),
                    project: project.to_string(),
                })
            })
            .collect();
        debug!(ledger = %ledger, project, rows = rows.len(), "queried retraction ledger");
        Ok(rows)
    }

    fn check_destination(&self, parent: &EntityId, name: &str) -> Result<()> {
        validate_name(parent, name)?;
        let manifest = StoreManifest::load(&self.root)?;
        self.resolve_folder(&manifest, parent)?;
        Ok(())
    }

    fn store(&self, request: &StoreRequest) -> Result<StoredEntity> {
        validate_name(&request.parent, &request.name)?;
        let mut manifest = StoreManifest::load(&self.root)?;
        let (parent, parent_dir) = self.resolve_folder(&manifest, &request.parent)?;

        let sha256 = compute_file_hash(&request.local_path)?;
        let bytes = std::fs::read(&request.local_path).map_err(|e| StoreError::Io {
            operation: "read",
            path: request.local_path.clone(),
            source: e,
        })?;
        let destination = parent_dir.join(&request.name);
        write_atomic(&destination, &bytes)?;

        let id = local_entity_id(&parent.id, &request.name);
        write_sidecar(
            &sidecar_path(&destination),
            &ProvenanceSidecar {
                entity_id: id.clone(),
                name: request.name.clone(),
                sha256: sha256.clone(),
                stored_at: Utc::now(),
                provenance: request.provenance.clone(),
            },
        )?;

        let relative = if parent.path.is_empty() {
            request.name.clone()
        } else {
            format!("{}/{}", parent.path, request.name)
        };
        manifest.upsert(ManifestEntity {
            id: id.clone(),
            path: relative,
            name: None,
        });
        manifest.save(&self.root)?;

        info!(
            id = %id,
            name = %request.name,
            parent = %request.parent,
            "stored file"
        );
        Ok(StoredEntity {
            id,
            name: request.name.clone(),
            path: destination,
            sha256,
        })
    }
}
