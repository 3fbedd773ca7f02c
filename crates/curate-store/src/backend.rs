//! The store seam every task talks to.

use curate_ingest::ReadOptions;
use curate_model::{LedgerRow, RecordTable};

use crate::entity::{ChildEntry, EntityId, FetchedEntity, StoreRequest, StoredEntity};
use crate::error::Result;

/// Versioned remote storage as seen by the curation tasks.
///
/// Drivers fetch every input and finish every transformation before the
/// first [`store`](DataStore::store) call.
pub trait DataStore: Send + Sync {
    /// Makes the entity's content available locally.
    fn fetch(&self, id: &EntityId) -> Result<FetchedEntity>;

    /// Reads a table entity, or one sheet of a workbook entity. Without a
    /// sheet name the first sheet is read.
    fn fetch_table(
        &self,
        id: &EntityId,
        sheet: Option<&str>,
        options: &ReadOptions,
    ) -> Result<RecordTable>;

    /// Direct children of a folder, sorted by name.
    fn list_children(&self, folder: &EntityId) -> Result<Vec<ChildEntry>>;

    /// Ledger rows for `project`. Columns: `genie_id` (or `record_id`),
    /// `site`, `project`.
    fn query_ledger(&self, ledger: &EntityId, project: &str) -> Result<Vec<LedgerRow>>;

    /// Checks that `name` can be stored under `parent` without storing
    /// anything. Fails like [`store`](DataStore::store) would for an unknown
    /// or non-folder parent and for an invalid name.
    fn check_destination(&self, parent: &EntityId, name: &str) -> Result<()>;

    /// Uploads a local file with its provenance.
    fn store(&self, request: &StoreRequest) -> Result<StoredEntity>;
}
