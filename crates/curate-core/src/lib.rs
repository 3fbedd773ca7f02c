//! Release curation core.
//!
//! Pure functions over in-memory [`RecordTable`]s: nothing here touches the
//! network or the file system. Every operation borrows its input and returns
//! a new table.
//!
//! - [`filter_release`]: keep permitted variables, drop retracted records
//! - [`split_by_instrument`]: one table per data-entry instrument
//! - [`reference`]: turn reference documents into catalogs and instrument maps
//!
//! [`RecordTable`]: curate_model::RecordTable

pub mod filter;
pub mod reference;
pub mod split;
pub mod subset;

pub use filter::{exclude_columns, filter_release};
pub use reference::{
    DEFAULT_ACCEPTED_VALUES, ScopeOfReleaseLayout, catalog_from_scope_of_release,
    catalog_from_variable_list, default_accepted_values, derived_variables,
    instrument_map_from_dictionary,
};
pub use split::{SPLIT_SKIP_COLUMNS, split_by_instrument, strip_checkbox_suffix};
pub use subset::{retain_rows_in, samples_for_patients, select_columns};
