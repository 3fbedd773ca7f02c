//! Dropping derived variables from every export in a folder.

use anyhow::{Context, Result};
use curate_core::{derived_variables, exclude_columns};
use curate_ingest::{ReadOptions, WriteOptions};
use curate_model::ProvenanceRecord;
use curate_store::DataStore;
use tracing::{debug, info};

use crate::config::ExcludeDerivedConfig;
use crate::pipeline::{PlannedOutput, RunOptions, Staging};
use crate::types::TaskReport;

pub const TASK: &str = "exclude-derived";

pub fn run(
    store: &dyn DataStore,
    config: &ExcludeDerivedConfig,
    options: &RunOptions,
) -> Result<TaskReport> {
    let dictionary = &config.dictionary;
    let sheet = store
        .fetch_table(&dictionary.id, dictionary.sheet.as_deref(), &ReadOptions::csv())
        .with_context(|| format!("fetch data dictionary {}", dictionary.id))?;
    let derived = derived_variables(&sheet, &dictionary.layout)
        .with_context(|| format!("read data dictionary {}", dictionary.id))?;
    info!(derived = derived.len(), "derived variables loaded");

    let children = store
        .list_children(&config.input_folder)
        .with_context(|| format!("list folder {}", config.input_folder))?;

    let mut planned = Vec::new();
    for child in children {
        let lowered = child.name.to_lowercase();
        if config
            .skip_suffixes
            .iter()
            .any(|suffix| lowered.ends_with(&suffix.to_lowercase()))
        {
            debug!(name = %child.name, "skipping by suffix");
            continue;
        }
        let fetched = store.fetch(&child.id)?;
        if fetched.path.is_dir() {
            debug!(name = %child.name, "skipping folder");
            continue;
        }

        let export = store
            .fetch_table(&child.id, None, &ReadOptions::csv())
            .with_context(|| format!("read export {}", child.name))?;
        let kept = exclude_columns(&export, &derived);
        info!(
            name = %child.name,
            dropped = export.column_count() - kept.column_count(),
            columns = kept.column_count(),
            rows = kept.row_count(),
            "derived variables removed"
        );

        planned.push(PlannedOutput {
            name: child.name.clone(),
            table: kept,
            format: WriteOptions::csv(),
            parent: Some(config.output_folder.clone()),
            provenance: ProvenanceRecord::new(&config.executed)
                .used(dictionary.id.as_str())
                .used(child.id.as_str()),
        });
    }

    let mut staging = Staging::new(TASK, options)?;
    staging.stage_all(planned)?;
    staging.commit(store)
}
