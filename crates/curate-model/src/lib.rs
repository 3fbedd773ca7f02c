//! Data model for release curation.
//!
//! Tables are string-typed and immutable once derived: every operation in
//! `curate-core` borrows a [`RecordTable`] and returns a new one.

pub mod catalog;
pub mod error;
pub mod instrument;
pub mod provenance;
pub mod retraction;
pub mod table;

pub use catalog::{VariableCatalog, VariableEntry, VariableKind, normalize_variable_name};
pub use error::{CurateError, Result};
pub use instrument::InstrumentMap;
pub use provenance::ProvenanceRecord;
pub use retraction::{LedgerRow, RetractionSet};
pub use table::{CellValue, RECORD_ID, REPEAT_INSTANCE, REPEAT_INSTRUMENT, RecordTable, cell_at};
