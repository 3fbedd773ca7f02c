//! Delimited-text tables.

mod reader;
mod writer;

pub use reader::{ReadOptions, read_record_table, validate_encoding};
pub use writer::{WriteOptions, write_atomic, write_record_table};
