//! Storage seam for release curation.
//!
//! Tasks read reference documents and exports through [`DataStore`], and
//! upload results with a [`ProvenanceRecord`] attached. [`LocalStore`] keeps
//! everything in a directory described by `store.toml`; stored files get a
//! `<name>.provenance.json` sidecar with their content hash.
//!
//! [`ProvenanceRecord`]: curate_model::ProvenanceRecord

mod backend;
mod entity;
mod error;
mod hash;
mod local;
mod manifest;
mod sidecar;

pub use backend::DataStore;
pub use entity::{ChildEntry, EntityId, FetchedEntity, StoreRequest, StoredEntity};
pub use error::{Result, StoreError};
pub use hash::{LOCAL_ID_PREFIX, compute_file_hash, local_entity_id};
pub use local::{LEDGER_ID_COLUMNS, LEDGER_PROJECT_COLUMN, LEDGER_SITE_COLUMN, LocalStore};
pub use manifest::{MANIFEST_FILE, ManifestEntity, StoreManifest};
pub use sidecar::{ProvenanceSidecar, SIDECAR_SUFFIX, read_sidecar, sidecar_path};
