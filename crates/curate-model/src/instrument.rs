#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use crate::table::RECORD_ID;

/// Variable name to the instrument(s) (data-entry forms) it belongs to.
///
/// The record identifier is never part of the map: it is a structural column
/// carried into every instrument's output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentMap {
    variables: BTreeMap<String, BTreeSet<String>>,
}

impl InstrumentMap {
    /// Builds the map from `(variable, instrument)` pairs.
    ///
    /// Blank names are ignored; a variable listed under several instruments
    /// is assigned to each of them.
    pub fn from_pairs<I, V, F>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (V, F)>,
        V: AsRef<str>,
        F: AsRef<str>,
    {
        let mut variables: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (variable, instrument) in pairs {
            let variable = variable.as_ref().trim();
            let instrument = instrument.as_ref().trim();
            if variable.is_empty() || instrument.is_empty() || variable == RECORD_ID {
                continue;
            }
            variables
                .entry(variable.to_string())
                .or_default()
                .insert(instrument.to_string());
        }
        Self { variables }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn instruments_for(&self, variable: &str) -> Option<&BTreeSet<String>> {
        self.variables.get(variable)
    }

    /// Instrument name to the set of its variables.
    pub fn groups(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (variable, instruments) in &self.variables {
            for instrument in instruments {
                groups
                    .entry(instrument.clone())
                    .or_default()
                    .insert(variable.clone());
            }
        }
        groups
    }
}
