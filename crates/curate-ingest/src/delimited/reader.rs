//! Delimited-text reading into [`RecordTable`]s.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use curate_model::{CellValue, RecordTable};

use crate::error::{IngestError, Result};

/// How a delimited file is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    pub delimiter: u8,
    /// Lines starting with this byte are skipped, including before the header.
    pub comment: Option<u8>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::csv()
    }
}

impl ReadOptions {
    pub fn csv() -> Self {
        Self {
            delimiter: b',',
            comment: None,
        }
    }

    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            comment: None,
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: u8) -> Self {
        self.comment = Some(comment);
        self
    }
}

/// Rejects UTF-16 files, which the CSV reader would silently mangle.
///
/// A UTF-8 BOM is acceptable and stripped from the first header.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file
        .read(&mut buffer)
        .map_err(|e| IngestError::read(path, e))?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

fn parse_headers(path: &Path, record: &csv::StringRecord) -> Result<Vec<String>> {
    if record.iter().all(|field| field.trim_matches('\u{feff}').trim().is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let mut seen = BTreeSet::new();
    let mut columns = Vec::with_capacity(record.len());
    for (index, raw) in record.iter().enumerate() {
        let name = raw.trim_matches('\u{feff}').trim();
        if name.is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
                index,
            });
        }
        if !seen.insert(name) {
            return Err(IngestError::DuplicateColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            });
        }
        columns.push(name.to_string());
    }
    Ok(columns)
}

/// Reads a delimited file with a header row.
///
/// Values are kept verbatim; an empty field becomes [`CellValue::Missing`].
/// Short rows are padded with missing cells.
pub fn read_record_table(path: &Path, options: &ReadOptions) -> Result<RecordTable> {
    validate_encoding(path)?;
    let file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(options.delimiter)
        .comment(options.comment)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();
    let mut table = RecordTable::new(parse_headers(path, &headers)?);
    let width = table.column_count();

    let mut ragged = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        if record.len() > width {
            if record.iter().skip(width).any(|field| !field.is_empty()) {
                return Err(IngestError::Csv {
                    path: path.to_path_buf(),
                    source: csv::Error::from(std::io::Error::other(format!(
                        "row {} has {} fields but the header has {width}",
                        table.row_count() + 1,
                        record.len()
                    ))),
                });
            }
            ragged += 1;
        } else if record.len() < width {
            ragged += 1;
        }
        table.push_row(record.iter().map(CellValue::from_field).collect());
    }

    if ragged > 0 {
        tracing::debug!(path = %path.display(), rows = ragged, "padded ragged rows");
    }
    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = width,
        "read table"
    );
    Ok(table)
}
