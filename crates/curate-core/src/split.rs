//! Splitting a labelled export into one table per instrument.

use std::collections::{BTreeMap, BTreeSet};

use curate_model::{CurateError, InstrumentMap, REPEAT_INSTANCE, RECORD_ID, RecordTable, Result};
use tracing::{debug, warn};

/// Columns carried into every instrument table and ignored when deciding
/// whether a row is empty.
pub const SPLIT_SKIP_COLUMNS: [&str; 2] = [RECORD_ID, REPEAT_INSTANCE];

/// Strips one trailing checkbox suffix (`___` followed by digits).
///
/// `"race___1"` becomes `"race"`; names without such a suffix are returned
/// unchanged.
pub fn strip_checkbox_suffix(name: &str) -> &str {
    match name.rfind("___") {
        Some(pos) => {
            let digits = &name[pos + 3..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                &name[..pos]
            } else {
                name
            }
        }
        None => name,
    }
}

fn matches_instrument(column: &str, variables: &BTreeSet<String>) -> bool {
    variables.contains(column) || variables.contains(strip_checkbox_suffix(column))
}

/// Partitions the columns of `table` by instrument.
///
/// Each instrument table holds `record_id`, `redcap_repeat_instance` and every
/// column whose name (or name without a checkbox suffix) belongs to the
/// instrument. Instruments with no matching columns are omitted, rows with no
/// data outside the structural columns are dropped, and the repeat-instance
/// column is dropped when it is blank on every remaining row.
///
/// # Errors
///
/// [`CurateError::MissingColumn`] when `record_id` or
/// `redcap_repeat_instance` is absent.
pub fn split_by_instrument(
    table: &RecordTable,
    map: &InstrumentMap,
) -> Result<BTreeMap<String, RecordTable>> {
    let mut structural = Vec::with_capacity(SPLIT_SKIP_COLUMNS.len());
    for column in SPLIT_SKIP_COLUMNS {
        let idx = table
            .column_index(column)
            .ok_or_else(|| CurateError::missing_column(column, "instrument split"))?;
        structural.push(idx);
    }

    let mut result = BTreeMap::new();
    for (instrument, variables) in map.groups() {
        debug!(instrument = %instrument, "searching column names for instrument");
        let selected: Vec<usize> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(idx, column)| {
                !structural.contains(idx) && matches_instrument(column, &variables)
            })
            .map(|(idx, _)| idx)
            .collect();
        if selected.is_empty() {
            debug!(instrument = %instrument, "no columns for instrument; skipping");
            continue;
        }

        let mut indices = structural.clone();
        indices.extend(&selected);
        let projected = table.project(&indices);
        let data_start = structural.len();
        let populated = projected.retain_rows(|row| row[data_start..].iter().any(|cell| !cell.is_blank()));
        if populated.is_empty() {
            warn!(instrument = %instrument, "instrument has columns but no populated rows");
        }

        // Non-repeating form: the instance column carries no information.
        let instance_pos = 1;
        let repeating = populated
            .rows
            .iter()
            .any(|row| !row[instance_pos].is_blank());
        let instrument_table = if repeating {
            populated
        } else {
            let keep: Vec<usize> = (0..populated.column_count())
                .filter(|&idx| idx != instance_pos)
                .collect();
            populated.project(&keep)
        };

        debug!(
            instrument = %instrument,
            columns = instrument_table.column_count(),
            rows = instrument_table.row_count(),
            "instrument table built"
        );
        result.insert(instrument, instrument_table);
    }
    Ok(result)
}
