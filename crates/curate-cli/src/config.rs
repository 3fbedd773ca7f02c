//! Run configuration files.
//!
//! Each task reads a TOML file naming the store entities it works on. The
//! file is parsed and validated before the store is touched.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use curate_core::{DEFAULT_ACCEPTED_VALUES, ScopeOfReleaseLayout};
use curate_model::{RECORD_ID, REPEAT_INSTANCE, REPEAT_INSTRUMENT};
use curate_store::EntityId;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Provenance link used when a configuration does not name one.
pub const DEFAULT_EXECUTED: &str = concat!("curate ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Checks that go beyond what deserialization enforces.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Reads and validates a run configuration.
pub fn load_config<T>(path: &Path) -> Result<T, RunConfigError>
where
    T: DeserializeOwned + Validate,
{
    let text = std::fs::read_to_string(path).map_err(|e| RunConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&text, path)
}

fn parse_config<T>(text: &str, path: &Path) -> Result<T, RunConfigError>
where
    T: DeserializeOwned + Validate,
{
    let config: T = toml::from_str(text).map_err(|e| RunConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate().map_err(|reason| RunConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(config)
}

fn default_executed() -> String {
    DEFAULT_EXECUTED.to_string()
}

fn default_accepted_values() -> Vec<String> {
    DEFAULT_ACCEPTED_VALUES.map(String::from).to_vec()
}

fn default_structural_columns() -> Vec<String> {
    [RECORD_ID, REPEAT_INSTRUMENT, REPEAT_INSTANCE]
        .map(String::from)
        .to_vec()
}

/// Where the release catalog comes from and how to read it.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub id: EntityId,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(flatten)]
    pub source: CatalogSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CatalogSource {
    /// A scope-of-release sheet with per-release flag columns.
    ScopeOfRelease {
        #[serde(default)]
        layout: ScopeOfReleaseLayout,
        /// Flag names (lowercased headers unless the layout maps them).
        flags: Vec<String>,
        #[serde(default = "default_accepted_values")]
        accepted_values: Vec<String>,
    },
    /// A single column listing every variable to release.
    VariableList { column: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetractionConfig {
    pub ledger: EntityId,
    pub project: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Site code as it appears in the retraction ledger.
    pub name: String,
    pub input: EntityId,
    pub output_folder: EntityId,
    /// Overrides `<input name>_release.csv`.
    #[serde(default)]
    pub output_name: Option<String>,
}

/// `curate release`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
    #[serde(default = "default_executed")]
    pub executed: String,
    #[serde(default)]
    pub description: Option<String>,
    pub catalog: CatalogConfig,
    #[serde(default = "default_structural_columns")]
    pub structural_columns: Vec<String>,
    #[serde(default)]
    pub retractions: Option<RetractionConfig>,
    pub sites: Vec<SiteConfig>,
}

impl ReleaseConfig {
    pub fn structural(&self) -> BTreeSet<String> {
        self.structural_columns
            .iter()
            .map(|column| column.trim().to_string())
            .collect()
    }
}

impl Validate for ReleaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.sites.is_empty() {
            return Err("at least one [[sites]] entry is required".to_string());
        }
        let mut names = BTreeSet::new();
        for site in &self.sites {
            if site.name.trim().is_empty() {
                return Err("site name must not be empty".to_string());
            }
            if !names.insert(site.name.as_str()) {
                return Err(format!("site '{}' is listed twice", site.name));
            }
        }
        let mut outputs = BTreeSet::new();
        for site in &self.sites {
            if let Some(name) = &site.output_name
                && !outputs.insert((site.output_folder.clone(), name.as_str()))
            {
                return Err(format!("output name '{name}' is used twice in one folder"));
            }
        }
        if let CatalogSource::ScopeOfRelease {
            flags,
            accepted_values,
            ..
        } = &self.catalog.source
        {
            if flags.is_empty() {
                return Err("catalog.flags must name at least one release flag".to_string());
            }
            if accepted_values.is_empty() {
                return Err("catalog.accepted_values must not be empty".to_string());
            }
        }
        if let Some(retractions) = &self.retractions
            && retractions.project.trim().is_empty()
        {
            return Err("retractions.project must not be empty".to_string());
        }
        Ok(())
    }
}

/// Scope-of-release sheet used to find derived variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DictionaryConfig {
    pub id: EntityId,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub layout: ScopeOfReleaseLayout,
}

/// `curate exclude-derived`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcludeDerivedConfig {
    #[serde(default = "default_executed")]
    pub executed: String,
    pub dictionary: DictionaryConfig,
    pub input_folder: EntityId,
    pub output_folder: EntityId,
    /// Child names ending in one of these are skipped.
    #[serde(default = "default_skip_suffixes")]
    pub skip_suffixes: Vec<String>,
}

fn default_skip_suffixes() -> Vec<String> {
    vec![".xlsx".to_string()]
}

impl Validate for ExcludeDerivedConfig {
    fn validate(&self) -> Result<(), String> {
        if self.dictionary.layout.type_column.is_none() {
            return Err("dictionary.layout.type_column is required".to_string());
        }
        if self.input_folder == self.output_folder {
            return Err("input_folder and output_folder must differ".to_string());
        }
        Ok(())
    }
}

/// `curate split`, assembled from command-line arguments.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub executed: String,
    pub input: EntityId,
    pub dictionary: EntityId,
    pub output: Option<EntityId>,
}

impl SplitConfig {
    /// Checks the output folder requirement for a storing run.
    pub fn validate_for(&self, dry_run: bool) -> Result<(), String> {
        if !dry_run && self.output.is_none() {
            return Err("--output is required unless --dry-run is given".to_string());
        }
        Ok(())
    }
}

/// `curate genomic-subset`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenomicSubsetConfig {
    #[serde(default = "default_executed")]
    pub executed: String,
    /// CSV with a `PATIENT_ID` column.
    pub patients: EntityId,
    /// cBioPortal clinical sample file (tab-separated, `#` comments).
    pub samples: EntityId,
    #[serde(default)]
    pub mutations: Option<EntityId>,
    #[serde(default)]
    pub cna: Option<EntityId>,
    #[serde(default)]
    pub fusions: Option<EntityId>,
    pub output_folder: EntityId,
}

impl Validate for GenomicSubsetConfig {
    fn validate(&self) -> Result<(), String> {
        if self.mutations.is_none() && self.cna.is_none() && self.fusions.is_none() {
            return Err("name at least one of mutations, cna or fusions".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASE: &str = r#"
        executed = "https://example.org/curation/release"

        [catalog]
        id = "syn22294851"
        sheet = "Data Dictionary"
        source = "scope_of_release"
        flags = ["shared for nsclc 2.0-public release", "shared for crc v2.0 public release"]

        [retractions]
        ledger = "syn49097276"
        project = "NTRK"

        [[sites]]
        name = "DFCI"
        input = "syn49770249"
        output_folder = "syn49688680"

        [[sites]]
        name = "VICC"
        input = "syn49090681"
        output_folder = "syn49091348"
    "#;

    fn path() -> &'static Path {
        Path::new("release.toml")
    }

    #[test]
    fn parses_release_config() {
        let config: ReleaseConfig = parse_config(RELEASE, path()).unwrap();
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.structural().len(), 3);
        match &config.catalog.source {
            CatalogSource::ScopeOfRelease {
                layout,
                accepted_values,
                ..
            } => {
                assert_eq!(layout.variable_column, "varname");
                assert_eq!(accepted_values.len(), 4);
            }
            CatalogSource::VariableList { .. } => panic!("expected scope of release"),
        }
    }

    #[test]
    fn parses_variable_list_catalog() {
        let text = r#"
            structural_columns = ["redcap_repeat_instance"]

            [catalog]
            id = "syn49769483"
            sheet = "Sheet1"
            source = "variable_list"
            column = "variables to be included in upload"

            [[sites]]
            name = "PROV"
            input = "syn49090867"
            output_folder = "syn50118024"
        "#;
        let config: ReleaseConfig = parse_config(text, path()).unwrap();
        assert_eq!(config.executed, DEFAULT_EXECUTED);
        assert!(config.retractions.is_none());
        assert!(matches!(
            config.catalog.source,
            CatalogSource::VariableList { ref column } if column == "variables to be included in upload"
        ));
    }

    #[test]
    fn rejects_duplicate_sites() {
        let text = RELEASE.replace("name = \"VICC\"", "name = \"DFCI\"");
        let err = parse_config::<ReleaseConfig>(&text, path()).unwrap_err();
        assert!(matches!(err, RunConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_unknown_keys() {
        let text = format!("{RELEASE}\nsurprise = true\n");
        let err = parse_config::<ReleaseConfig>(&text, path()).unwrap_err();
        assert!(matches!(err, RunConfigError::Parse { .. }));
    }

    #[test]
    fn genomic_subset_needs_a_genomic_file() {
        let text = r#"
            patients = "syn33113130"
            samples = "syn32299605"
            output_folder = "syn33113020"
        "#;
        let err = parse_config::<GenomicSubsetConfig>(text, path()).unwrap_err();
        assert!(err.to_string().contains("at least one of"));
    }

    #[test]
    fn split_requires_output_unless_dry_run() {
        let config = SplitConfig {
            executed: DEFAULT_EXECUTED.to_string(),
            input: EntityId::new("syn1"),
            dictionary: EntityId::new("syn2"),
            output: None,
        };
        assert!(config.validate_for(true).is_ok());
        assert!(config.validate_for(false).is_err());
    }
}
