//! Row and column subsetting for genomic release files.

use std::collections::BTreeSet;

use curate_model::{CurateError, RecordTable, Result, cell_at};
use tracing::debug;

pub const PATIENT_ID: &str = "PATIENT_ID";
pub const SAMPLE_ID: &str = "SAMPLE_ID";

/// Sample identifiers belonging to `patients`, in sample-table order.
pub fn samples_for_patients(
    samples: &RecordTable,
    patients: &BTreeSet<String>,
) -> Result<Vec<String>> {
    let patient_idx = samples
        .column_index(PATIENT_ID)
        .ok_or_else(|| CurateError::missing_column(PATIENT_ID, "sample lookup"))?;
    let sample_idx = samples
        .column_index(SAMPLE_ID)
        .ok_or_else(|| CurateError::missing_column(SAMPLE_ID, "sample lookup"))?;

    let mut seen = BTreeSet::new();
    let mut result = Vec::new();
    for row in &samples.rows {
        let in_scope = cell_at(row, patient_idx)
            .as_str()
            .is_some_and(|patient| patients.contains(patient));
        if !in_scope {
            continue;
        }
        if let Some(sample) = cell_at(row, sample_idx).as_str()
            && seen.insert(sample.to_string())
        {
            result.push(sample.to_string());
        }
    }
    Ok(result)
}

/// Rows whose `column` value is one of `ids`.
pub fn retain_rows_in(
    table: &RecordTable,
    column: &str,
    ids: &BTreeSet<String>,
) -> Result<RecordTable> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| CurateError::missing_column(column, "row subset"))?;
    Ok(table.retain_rows(|row| cell_at(row, idx).as_str().is_some_and(|value| ids.contains(value))))
}

/// Selects `leading` columns (all required) followed by whichever of
/// `optional` exist, in the order given.
pub fn select_columns(
    table: &RecordTable,
    leading: &[String],
    optional: &[String],
) -> Result<RecordTable> {
    let mut indices = Vec::with_capacity(leading.len() + optional.len());
    for column in leading {
        let idx = table
            .column_index(column)
            .ok_or_else(|| CurateError::missing_column(column.as_str(), "column subset"))?;
        indices.push(idx);
    }
    for column in optional {
        match table.column_index(column) {
            Some(idx) if !indices.contains(&idx) => indices.push(idx),
            Some(_) => {}
            None => debug!(column = %column, "optional column absent"),
        }
    }
    Ok(table.project(&indices))
}
