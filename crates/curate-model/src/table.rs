#![deny(unsafe_code)]

//! In-memory tabular data with string-typed cells.
//!
//! Exports are read with every cell kept as the literal text from the file.
//! A cell is either `Text` or `Missing`; there is no numeric coercion, so a
//! value such as `"1.20"` is written back exactly as it was read.

/// Record identifier column present in every REDCap export.
pub const RECORD_ID: &str = "record_id";
/// Name of the repeating instrument a row belongs to (blank for base rows).
pub const REPEAT_INSTRUMENT: &str = "redcap_repeat_instrument";
/// Sequence number of a repeating instrument row.
pub const REPEAT_INSTANCE: &str = "redcap_repeat_instance";

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Missing,
}

impl CellValue {
    /// Builds a cell from a raw field; an empty field is `Missing`.
    pub fn from_field(raw: &str) -> Self {
        if raw.is_empty() {
            Self::Missing
        } else {
            Self::Text(raw.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// True for `Missing` and for empty text.
    pub fn is_blank(&self) -> bool {
        self.as_str().is_none_or(str::is_empty)
    }

    /// Field text used when serializing; `Missing` becomes an empty field.
    pub fn as_field(&self) -> &str {
        self.as_str().unwrap_or("")
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Option<&str>> for CellValue {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(text) => Self::Text(text.to_string()),
            None => Self::Missing,
        }
    }
}

static MISSING_CELL: CellValue = CellValue::Missing;

/// Cell `idx` of `row`; positions past the end of a short row read as
/// `Missing`.
pub fn cell_at(row: &[CellValue], idx: usize) -> &CellValue {
    row.get(idx).unwrap_or(&MISSING_CELL)
}

/// Ordered rows over an ordered list of column names.
///
/// Rows are stored positionally. Tables built through [`RecordTable::push_row`]
/// have exactly `columns.len()` cells per row; a ragged table built by hand
/// reads its absent cells as `Missing` and [`RecordTable::project`] yields a
/// rectangular table.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding with `Missing` or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Missing);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `column`), or `None` if either is out of range.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(idx))
    }

    /// All cells of one column, in row order.
    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &CellValue>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |row| cell_at(row, idx)))
    }

    /// New table holding the given column positions, in the given order.
    pub fn project(&self, indices: &[usize]) -> RecordTable {
        let columns = indices
            .iter()
            .map(|&idx| self.columns[idx].clone())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&idx| cell_at(row, idx).clone()).collect())
            .collect();
        RecordTable { columns, rows }
    }

    /// New table keeping only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&self, mut keep: F) -> RecordTable
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        RecordTable {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordTable {
        let mut table = RecordTable::new(vec!["record_id".into(), "age".into()]);
        table.push_row(vec!["R1".into(), "1.20".into()]);
        table.push_row(vec!["R2".into()]);
        table
    }

    #[test]
    fn ragged_rows_read_as_missing() {
        let table = RecordTable {
            columns: vec!["record_id".into(), "age".into()],
            rows: vec![vec!["R1".into()], vec![]],
        };
        let projected = table.project(&[1, 0]);
        assert_eq!(
            projected.rows,
            vec![
                vec![CellValue::Missing, CellValue::from("R1")],
                vec![CellValue::Missing, CellValue::Missing],
            ]
        );
        assert_eq!(table.column_values("age").unwrap().count(), 2);
    }

    #[test]
    fn push_row_pads_short_rows() {
        let table = sample();
        assert_eq!(table.rows[1], vec![CellValue::from("R2"), CellValue::Missing]);
    }

    #[test]
    fn value_keeps_literal_text() {
        let table = sample();
        assert_eq!(table.value(0, "age").and_then(CellValue::as_str), Some("1.20"));
        assert_eq!(table.value(5, "age"), None);
        assert_eq!(table.value(0, "missing"), None);
    }

    #[test]
    fn project_reorders_columns() {
        let table = sample().project(&[1, 0]);
        assert_eq!(table.columns, vec!["age", "record_id"]);
        assert_eq!(table.rows[0], vec![CellValue::from("1.20"), CellValue::from("R1")]);
    }

    #[test]
    fn empty_field_is_missing() {
        assert!(CellValue::from_field("").is_missing());
        assert_eq!(CellValue::from_field(" ").as_str(), Some(" "));
        assert_eq!(CellValue::Missing.as_field(), "");
    }
}
