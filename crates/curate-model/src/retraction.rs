#![deny(unsafe_code)]

use std::collections::BTreeSet;

/// One row of the retraction ledger table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedgerRow {
    pub record_id: String,
    pub site: String,
    pub project: String,
}

/// Record identifiers withdrawn from a release for one site and project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetractionSet {
    ids: BTreeSet<String>,
}

impl RetractionSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Ledger rows scoped to exactly one `(site, project)` pair.
    ///
    /// An empty result means "no retractions"; it is indistinguishable from a
    /// site that does not appear in the ledger at all.
    pub fn scoped(rows: &[LedgerRow], site: &str, project: &str) -> Self {
        Self {
            ids: rows
                .iter()
                .filter(|row| row.site == site && row.project == project)
                .map(|row| row.record_id.clone())
                .collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }
}
