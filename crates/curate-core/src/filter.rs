//! Release variable filtering.

use std::collections::BTreeSet;

use curate_model::{CurateError, RECORD_ID, RecordTable, Result, RetractionSet, cell_at};
use tracing::{debug, warn};

/// Keeps the permitted columns of `table` and drops retracted records.
///
/// - Columns: exactly those in `allowed ∪ structural`, in the table's order.
///   Allowed names the table does not have are ignored.
/// - Rows: when `excluded` is non-empty, rows whose `record_id` is in it are
///   removed; otherwise every row passes through.
/// - Cells are copied verbatim.
///
/// # Errors
///
/// [`CurateError::MissingColumn`] when a structural column is absent, or when
/// `record_id` is absent and there are records to exclude.
pub fn filter_release(
    table: &RecordTable,
    allowed: &BTreeSet<String>,
    structural: &BTreeSet<String>,
    excluded: &RetractionSet,
) -> Result<RecordTable> {
    if let Some(column) = structural.iter().find(|column| !table.has_column(column)) {
        return Err(CurateError::missing_column(column.as_str(), "release filter"));
    }

    let indices: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| allowed.contains(*column) || structural.contains(*column))
        .map(|(idx, _)| idx)
        .collect();
    if indices.len() == structural.len() {
        warn!(
            allowed = allowed.len(),
            "no permitted variables present; keeping structural columns only"
        );
    }

    if excluded.is_empty() {
        debug!(columns = indices.len(), "no retractions to apply");
        return Ok(table.project(&indices));
    }

    let id_idx = table
        .column_index(RECORD_ID)
        .ok_or_else(|| CurateError::missing_column(RECORD_ID, "retraction filter"))?;
    let kept = table.retain_rows(|row| {
        cell_at(row, id_idx)
            .as_str()
            .is_none_or(|id| !excluded.contains(id))
    });
    debug!(
        columns = indices.len(),
        removed_rows = table.row_count() - kept.row_count(),
        "applied retractions"
    );
    Ok(kept.project(&indices))
}

/// Drops every column named in `excluded`, keeping the rest in order.
pub fn exclude_columns(table: &RecordTable, excluded: &BTreeSet<String>) -> RecordTable {
    let indices: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| !excluded.contains(*column))
        .map(|(idx, _)| idx)
        .collect();
    table.project(&indices)
}
