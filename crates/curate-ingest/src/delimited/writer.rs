//! Delimited-text writing with atomic replacement.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use curate_model::{CellValue, RecordTable};

use crate::error::{IngestError, Result};

/// How a delimited file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub delimiter: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::csv()
    }
}

impl WriteOptions {
    pub fn csv() -> Self {
        Self { delimiter: b',' }
    }

    pub fn tsv() -> Self {
        Self { delimiter: b'\t' }
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

fn encode(table: &RecordTable, options: &WriteOptions, path: &Path) -> Result<Vec<u8>> {
    let csv_error = |source: csv::Error| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(Vec::new());
    writer.write_record(&table.columns).map_err(csv_error)?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(CellValue::as_field))
            .map_err(csv_error)?;
    }
    writer.into_inner().map_err(|e| IngestError::Io {
        operation: "encode",
        path: path.to_path_buf(),
        source: std::io::Error::other(e.to_string()),
    })
}

/// Writes `bytes` to `path` through a temp file beside it.
///
/// The parent directory is created if needed. The temp file is synced and
/// then renamed over the target, so a failed write never leaves a truncated
/// file behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IngestError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = temp_path_for(path);
    let mut file = File::create(&temp_path).map_err(|e| IngestError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(bytes).map_err(|e| IngestError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| IngestError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| IngestError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })
}

/// Writes `table` with a header row and no index column, atomically.
pub fn write_record_table(path: &Path, table: &RecordTable, options: &WriteOptions) -> Result<()> {
    let bytes = encode(table, options, path)?;
    write_atomic(path, &bytes)?;
    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "wrote table"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> RecordTable {
        let mut table = RecordTable::new(vec!["record_id".into(), "note".into()]);
        table.push_row(vec!["R1".into(), "a, b".into()]);
        table.push_row(vec!["R2".into(), CellValue::Missing]);
        table
    }

    #[test]
    fn test_writes_header_and_quotes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/release.csv");
        write_record_table(&path, &sample(), &WriteOptions::csv()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "record_id,note\nR1,\"a, b\"\nR2,\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_tab_delimited() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_mutations.txt");
        write_record_table(&path, &sample(), &WriteOptions::tsv()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "record_id\tnote\nR1\ta, b\nR2\t\n");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("release.csv");
        fs::write(&path, "stale").unwrap();
        write_record_table(&path, &sample(), &WriteOptions::csv()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("record_id"));
    }
}
