//! Interpreting reference documents: scope-of-release sheets, variable
//! lists and REDCap data dictionaries.

use std::collections::{BTreeMap, BTreeSet};

use curate_model::{
    CurateError, InstrumentMap, RecordTable, Result, VariableCatalog, VariableEntry, VariableKind,
    cell_at, normalize_variable_name,
};
use tracing::debug;

/// Data dictionary column holding the variable name.
pub const DICTIONARY_VARIABLE_COLUMN: &str = "Variable / Field Name";
/// Data dictionary column holding the instrument (form) name.
pub const DICTIONARY_FORM_COLUMN: &str = "Form Name";

/// Flag values that mark a variable as shared.
pub const DEFAULT_ACCEPTED_VALUES: [&str; 4] =
    ["yes", "always", "index cancer only", "non-index cancer only"];

/// Type labels treated as curated data.
pub const DEFAULT_CURATED_ALIASES: [&str; 2] = ["project genie tier 1 data", "tumor registry"];

/// Where to find things in a scope-of-release sheet. Header matching is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScopeOfReleaseLayout {
    pub variable_column: String,
    pub type_column: Option<String>,
    /// Flag name to header. When empty, every header containing "shared"
    /// becomes a flag named after its lowercased header.
    pub flag_columns: BTreeMap<String, String>,
    pub curated_aliases: Vec<String>,
}

impl Default for ScopeOfReleaseLayout {
    fn default() -> Self {
        Self {
            variable_column: "varname".to_string(),
            type_column: Some("type".to_string()),
            flag_columns: BTreeMap::new(),
            curated_aliases: DEFAULT_CURATED_ALIASES.map(String::from).to_vec(),
        }
    }
}

impl ScopeOfReleaseLayout {
    fn kind_for(&self, label: &str) -> VariableKind {
        let trimmed = label.trim();
        if self
            .curated_aliases
            .iter()
            .any(|alias| alias.trim().eq_ignore_ascii_case(trimmed))
        {
            VariableKind::Curated
        } else {
            VariableKind::from_label(trimmed)
        }
    }
}

fn find_header(table: &RecordTable, name: &str) -> Option<usize> {
    let wanted = name.trim();
    table
        .columns
        .iter()
        .position(|column| column.trim().eq_ignore_ascii_case(wanted))
}

fn require_header(table: &RecordTable, name: &str, context: &'static str) -> Result<usize> {
    find_header(table, name).ok_or_else(|| CurateError::missing_column(name, context))
}

/// Resolves the flag columns of a scope-of-release sheet.
fn flag_indices(
    table: &RecordTable,
    layout: &ScopeOfReleaseLayout,
) -> Result<BTreeMap<String, usize>> {
    if layout.flag_columns.is_empty() {
        return Ok(table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.to_lowercase().contains("shared"))
            .map(|(idx, column)| (column.trim().to_lowercase(), idx))
            .collect());
    }
    layout
        .flag_columns
        .iter()
        .map(|(flag, header)| {
            require_header(table, header, "scope of release").map(|idx| (flag.clone(), idx))
        })
        .collect()
}

/// Builds a catalog from a scope-of-release sheet.
///
/// Rows without a variable name are skipped. Derived variables are excluded
/// by the catalog itself.
pub fn catalog_from_scope_of_release(
    table: &RecordTable,
    layout: &ScopeOfReleaseLayout,
) -> Result<VariableCatalog> {
    let variable_idx = require_header(table, &layout.variable_column, "scope of release")?;
    let type_idx = layout
        .type_column
        .as_deref()
        .map(|column| require_header(table, column, "scope of release"))
        .transpose()?;
    let flags = flag_indices(table, layout)?;
    if flags.is_empty() {
        return Err(CurateError::InvalidReference {
            reason: "scope of release has no release flag columns".to_string(),
        });
    }

    let entries = table.rows.iter().filter_map(|row| {
        let name = cell_at(row, variable_idx).as_str()?;
        let mut entry = VariableEntry::new(name);
        if let Some(kind) = type_idx.and_then(|idx| cell_at(row, idx).as_str()) {
            entry = entry.with_kind(layout.kind_for(kind));
        }
        for (flag, &idx) in &flags {
            entry = entry.with_flag(flag, cell_at(row, idx).as_str());
        }
        Some(entry)
    });
    let catalog = VariableCatalog::from_entries(entries);
    debug!(
        variables = catalog.len(),
        derived = catalog.derived_names().len(),
        flags = flags.len(),
        "scope of release loaded"
    );
    Ok(catalog)
}

/// Builds a catalog from a single-column list of variable names.
pub fn catalog_from_variable_list(table: &RecordTable, column: &str) -> Result<VariableCatalog> {
    let idx = require_header(table, column, "variable list")?;
    let catalog =
        VariableCatalog::from_names(table.rows.iter().filter_map(|row| cell_at(row, idx).as_str()));
    debug!(variables = catalog.len(), "variable list loaded");
    Ok(catalog)
}

/// Names the scope-of-release sheet classifies as derived.
///
/// A name is derived when any of its rows has a derived type, even if an
/// earlier row for the same name does not.
pub fn derived_variables(
    table: &RecordTable,
    layout: &ScopeOfReleaseLayout,
) -> Result<BTreeSet<String>> {
    let type_column = layout
        .type_column
        .as_deref()
        .ok_or_else(|| CurateError::InvalidReference {
            reason: "a type column is needed to find derived variables".to_string(),
        })?;
    let variable_idx = require_header(table, &layout.variable_column, "data dictionary")?;
    let type_idx = require_header(table, type_column, "data dictionary")?;
    let derived: BTreeSet<String> = table
        .rows
        .iter()
        .filter(|row| {
            cell_at(row, type_idx)
                .as_str()
                .is_some_and(|label| layout.kind_for(label).is_derived())
        })
        .filter_map(|row| cell_at(row, variable_idx).as_str())
        .map(normalize_variable_name)
        .filter(|name| !name.is_empty())
        .collect();
    debug!(derived = derived.len(), "derived variables listed");
    Ok(derived)
}

/// Builds the variable-to-instrument map from a REDCap data dictionary.
pub fn instrument_map_from_dictionary(table: &RecordTable) -> Result<InstrumentMap> {
    let variable_idx = require_header(table, DICTIONARY_VARIABLE_COLUMN, "data dictionary")?;
    let form_idx = require_header(table, DICTIONARY_FORM_COLUMN, "data dictionary")?;
    let map = InstrumentMap::from_pairs(table.rows.iter().filter_map(|row| {
        Some((cell_at(row, variable_idx).as_str()?, cell_at(row, form_idx).as_str()?))
    }));
    if map.is_empty() {
        return Err(CurateError::InvalidReference {
            reason: "data dictionary maps no variables to instruments".to_string(),
        });
    }
    Ok(map)
}

/// Lowercased default accepted flag values.
pub fn default_accepted_values() -> BTreeSet<String> {
    DEFAULT_ACCEPTED_VALUES.map(String::from).into_iter().collect()
}
