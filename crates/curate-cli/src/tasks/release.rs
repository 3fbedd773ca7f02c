//! Per-site release files filtered by a variable catalog.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use curate_core::{catalog_from_scope_of_release, catalog_from_variable_list, filter_release};
use curate_ingest::{ReadOptions, WriteOptions};
use curate_model::{LedgerRow, ProvenanceRecord, RetractionSet};
use curate_store::DataStore;
use tracing::{info, info_span, trace, warn};

use crate::config::{CatalogSource, ReleaseConfig};
use crate::logging::redact_value;
use crate::pipeline::{PlannedOutput, RunOptions, Staging};
use crate::types::TaskReport;

pub const TASK: &str = "release";

/// Variable names the catalog releases.
fn allowed_variables(store: &dyn DataStore, config: &ReleaseConfig) -> Result<BTreeSet<String>> {
    let catalog = &config.catalog;
    let sheet = store
        .fetch_table(&catalog.id, catalog.sheet.as_deref(), &ReadOptions::csv())
        .with_context(|| format!("fetch catalog {}", catalog.id))?;
    let allowed = match &catalog.source {
        CatalogSource::ScopeOfRelease {
            layout,
            flags,
            accepted_values,
        } => {
            let accepted: BTreeSet<String> = accepted_values
                .iter()
                .map(|value| value.trim().to_lowercase())
                .collect();
            catalog_from_scope_of_release(&sheet, layout)
                .with_context(|| format!("read scope of release {}", catalog.id))?
                .released_under(flags, &accepted)
        }
        CatalogSource::VariableList { column } => catalog_from_variable_list(&sheet, column)
            .with_context(|| format!("read variable list {}", catalog.id))?
            .names(),
    };
    if allowed.is_empty() {
        warn!(catalog = %catalog.id, "catalog releases no variables");
    }
    info!(catalog = %catalog.id, variables = allowed.len(), "release catalog loaded");
    Ok(allowed)
}

pub fn run(store: &dyn DataStore, config: &ReleaseConfig, options: &RunOptions) -> Result<TaskReport> {
    let allowed = allowed_variables(store, config)?;
    let structural = config.structural();

    let ledger: Vec<LedgerRow> = match &config.retractions {
        Some(retractions) => store
            .query_ledger(&retractions.ledger, &retractions.project)
            .with_context(|| format!("query retraction ledger {}", retractions.ledger))?,
        None => Vec::new(),
    };

    let mut planned = Vec::with_capacity(config.sites.len());
    for site in &config.sites {
        let span = info_span!("site", site = %site.name);
        let _guard = span.enter();

        let input = store
            .fetch(&site.input)
            .with_context(|| format!("fetch export for {}", site.name))?;
        let export = store
            .fetch_table(&site.input, None, &ReadOptions::csv())
            .with_context(|| format!("read export for {}", site.name))?;

        let excluded = match &config.retractions {
            Some(retractions) => RetractionSet::scoped(&ledger, &site.name, &retractions.project),
            None => RetractionSet::default(),
        };
        for id in excluded.ids() {
            trace!(record_id = redact_value(id), "retracted record");
        }

        let released = filter_release(&export, &allowed, &structural, &excluded)
            .with_context(|| format!("filter export for {}", site.name))?;
        info!(
            rows_in = export.row_count(),
            rows_out = released.row_count(),
            columns = released.column_count(),
            retracted = excluded.len(),
            "site release built"
        );

        let mut provenance = ProvenanceRecord::new(&config.executed)
            .used(config.catalog.id.as_str())
            .used(site.input.as_str());
        if let Some(retractions) = &config.retractions {
            provenance = provenance.used(retractions.ledger.as_str());
        }
        if let Some(description) = &config.description {
            provenance = provenance.with_description(description);
        }

        planned.push(PlannedOutput {
            name: site
                .output_name
                .clone()
                .unwrap_or_else(|| format!("{}_release.csv", input.name)),
            table: released,
            format: WriteOptions::csv(),
            parent: Some(site.output_folder.clone()),
            provenance,
        });
    }

    let mut staging = Staging::new(TASK, options)?;
    staging.stage_all(planned)?;
    staging.commit(store)
}
