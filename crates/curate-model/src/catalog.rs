#![deny(unsafe_code)]

//! Catalog of releasable variables built from a reference document.

use std::collections::{BTreeMap, BTreeSet};

/// Classification of a variable in the reference document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VariableKind {
    /// Computed from other variables; never redistributed.
    Derived,
    Curated,
    Other(String),
}

impl VariableKind {
    /// Parses a type label case-insensitively.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("derived") {
            Self::Derived
        } else if trimmed.eq_ignore_ascii_case("curated") {
            Self::Curated
        } else {
            Self::Other(trimmed.to_string())
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Derived)
    }
}

/// One row of the reference document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariableEntry {
    pub name: String,
    pub kind: Option<VariableKind>,
    /// Release flag name (lowercase) to raw flag value.
    pub flags: BTreeMap<String, Option<String>>,
}

impl VariableEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            flags: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: VariableKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_flag(mut self, flag: &str, value: Option<&str>) -> Self {
        self.flags
            .insert(flag.trim().to_lowercase(), value.map(str::to_string));
        self
    }

    /// Flag value lowercased and trimmed, if the flag is set.
    fn flag_value(&self, flag: &str) -> Option<String> {
        self.flags
            .get(&flag.trim().to_lowercase())
            .and_then(Option::as_deref)
            .map(|value| value.trim().to_lowercase())
    }
}

/// Trims a variable name and collapses internal whitespace runs.
pub fn normalize_variable_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// De-duplicated, normalized set of variables with their release flags.
///
/// Construction has set-union semantics: the first entry for a name wins and
/// later duplicates are ignored, except that a derived row for a name always
/// marks it derived. Derived variables are held apart and never appear in
/// [`VariableCatalog::names`] or any release selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableCatalog {
    entries: BTreeMap<String, VariableEntry>,
    derived: BTreeSet<String>,
}

impl VariableCatalog {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = VariableEntry>,
    {
        let mut catalog = Self::default();
        for mut entry in entries {
            let name = normalize_variable_name(&entry.name);
            if name.is_empty() || catalog.derived.contains(&name) {
                continue;
            }
            if entry.kind.as_ref().is_some_and(VariableKind::is_derived) {
                catalog.entries.remove(&name);
                catalog.derived.insert(name);
                continue;
            }
            if catalog.entries.contains_key(&name) {
                continue;
            }
            entry.name = name.clone();
            catalog.entries.insert(name, entry);
        }
        catalog
    }

    /// Catalog from bare names (no type, no flags).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_entries(names.into_iter().map(|name| VariableEntry::new(name.as_ref())))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&VariableEntry> {
        self.entries.get(name)
    }

    /// Every non-derived variable name.
    pub fn names(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    /// Names that were classified as derived and excluded.
    pub fn derived_names(&self) -> &BTreeSet<String> {
        &self.derived
    }

    /// Variables whose value for any of `flags` is one of `accepted`.
    ///
    /// Comparison is case-insensitive on both the flag name and the value.
    pub fn released_under(&self, flags: &[String], accepted: &BTreeSet<String>) -> BTreeSet<String> {
        let accepted: BTreeSet<String> = accepted
            .iter()
            .map(|value| value.trim().to_lowercase())
            .collect();
        self.entries
            .values()
            .filter(|entry| {
                flags.iter().any(|flag| {
                    entry
                        .flag_value(flag)
                        .is_some_and(|value| accepted.contains(&value))
                })
            })
            .map(|entry| entry.name.clone())
            .collect()
    }
}
