//! Table ingestion for release curation.
//!
//! Reads and writes delimited text as [`RecordTable`]s with every cell kept
//! as a string, and locates sheets inside workbook folders.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use curate_ingest::{ReadOptions, WriteOptions, read_record_table, write_record_table};
//!
//! let samples = read_record_table(
//!     Path::new("data_clinical_sample.txt"),
//!     &ReadOptions::tsv().with_comment(b'#'),
//! )?;
//! write_record_table(Path::new("out/samples.csv"), &samples, &WriteOptions::csv())?;
//! ```
//!
//! [`RecordTable`]: curate_model::RecordTable

mod delimited;
mod discovery;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === Delimited Text ===
pub use delimited::{
    ReadOptions, WriteOptions, read_record_table, validate_encoding, write_atomic,
    write_record_table,
};

// === Discovery ===
pub use discovery::{TABLE_EXTENSIONS, find_sheet, list_table_files, sheet_names};
