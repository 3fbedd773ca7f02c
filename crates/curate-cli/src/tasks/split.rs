//! Splitting a labelled export into one file per instrument.

use anyhow::{Context, Result};
use curate_core::{instrument_map_from_dictionary, split_by_instrument};
use curate_ingest::{ReadOptions, WriteOptions};
use curate_model::ProvenanceRecord;
use curate_store::DataStore;
use tracing::{info, warn};

use crate::config::SplitConfig;
use crate::pipeline::{PlannedOutput, RunOptions, Staging};
use crate::types::TaskReport;

pub const TASK: &str = "split";

/// Activity description attached to every instrument file.
pub const DESCRIPTION: &str = "Split REDCap labelled data by instruments";

pub fn run(store: &dyn DataStore, config: &SplitConfig, options: &RunOptions) -> Result<TaskReport> {
    config
        .validate_for(options.dry_run)
        .map_err(anyhow::Error::msg)?;

    info!(input = %config.input, "download the labelled data");
    let export = store
        .fetch_table(&config.input, None, &ReadOptions::csv())
        .with_context(|| format!("read labelled export {}", config.input))?;

    info!(dictionary = %config.dictionary, "download data dictionary");
    let dictionary = store
        .fetch_table(&config.dictionary, None, &ReadOptions::csv())
        .with_context(|| format!("read data dictionary {}", config.dictionary))?;
    let map = instrument_map_from_dictionary(&dictionary)
        .with_context(|| format!("read data dictionary {}", config.dictionary))?;

    let tables = split_by_instrument(&export, &map).context("split by instrument")?;
    if tables.is_empty() {
        warn!("no export column matched any instrument");
    }
    info!(instruments = tables.len(), "labelled data split");

    let planned = tables
        .into_iter()
        .map(|(instrument, table)| PlannedOutput {
            name: format!("{instrument}.csv"),
            table,
            format: WriteOptions::csv(),
            parent: config.output.clone(),
            provenance: ProvenanceRecord::new(&config.executed)
                .with_description(DESCRIPTION)
                .used(config.input.as_str())
                .used(config.dictionary.as_str()),
        })
        .collect();

    let mut staging = Staging::new(TASK, options)?;
    staging.stage_all(planned)?;
    staging.commit(store)
}
