//! Subsetting genomic release files to a list of patients.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use curate_core::subset::{PATIENT_ID, SAMPLE_ID};
use curate_core::{retain_rows_in, samples_for_patients, select_columns};
use curate_ingest::{ReadOptions, WriteOptions};
use curate_model::{CellValue, CurateError, ProvenanceRecord, RecordTable};
use curate_store::{DataStore, EntityId};
use tracing::{info, warn};

use crate::config::GenomicSubsetConfig;
use crate::pipeline::{PlannedOutput, RunOptions, Staging};
use crate::types::TaskReport;

pub const TASK: &str = "genomic-subset";

pub const SAMPLE_BARCODE_COLUMN: &str = "Tumor_Sample_Barcode";
pub const GENE_SYMBOL_COLUMN: &str = "Hugo_Symbol";

fn patient_ids(table: &RecordTable) -> Result<BTreeSet<String>, CurateError> {
    let values = table
        .column_values(PATIENT_ID)
        .ok_or_else(|| CurateError::missing_column(PATIENT_ID, "patient list"))?;
    Ok(values
        .filter_map(CellValue::as_str)
        .map(|id| id.trim().to_string())
        .collect())
}

fn genomic_table(store: &dyn DataStore, id: &EntityId, what: &str) -> Result<RecordTable> {
    store
        .fetch_table(id, None, &ReadOptions::tsv())
        .with_context(|| format!("read {what} {id}"))
}

pub fn run(
    store: &dyn DataStore,
    config: &GenomicSubsetConfig,
    options: &RunOptions,
) -> Result<TaskReport> {
    let patients_table = store
        .fetch_table(&config.patients, None, &ReadOptions::csv())
        .with_context(|| format!("read patient list {}", config.patients))?;
    let patients = patient_ids(&patients_table)?;

    let sample_table = store
        .fetch_table(
            &config.samples,
            None,
            &ReadOptions::tsv().with_comment(b'#'),
        )
        .with_context(|| format!("read sample file {}", config.samples))?;
    let samples = samples_for_patients(&sample_table, &patients)?;
    if samples.is_empty() {
        warn!(patients = patients.len(), "no samples found for the patient list");
    }
    info!(patients = patients.len(), samples = samples.len(), "samples resolved");
    let sample_set: BTreeSet<String> = samples.iter().cloned().collect();

    let provenance = |source: &EntityId| {
        ProvenanceRecord::new(&config.executed)
            .used(config.patients.as_str())
            .used(source.as_str())
    };
    let mut planned = Vec::new();

    if let Some(id) = &config.mutations {
        let maf = genomic_table(store, id, "mutations")?;
        let subset = retain_rows_in(&maf, SAMPLE_BARCODE_COLUMN, &sample_set)?;
        info!(rows = subset.row_count(), "mutations subset");
        planned.push(PlannedOutput {
            name: "subset_maf.tsv".to_string(),
            table: subset,
            format: WriteOptions::tsv(),
            parent: Some(config.output_folder.clone()),
            provenance: provenance(id),
        });
    }

    if let Some(id) = &config.cna {
        let cna = genomic_table(store, id, "copy-number")?;
        let subset = select_columns(&cna, &[GENE_SYMBOL_COLUMN.to_string()], &samples)?;
        info!(
            samples = subset.column_count().saturating_sub(1),
            "copy-number subset"
        );
        planned.push(PlannedOutput {
            name: "subset_cna.tsv".to_string(),
            table: subset,
            format: WriteOptions::tsv(),
            parent: Some(config.output_folder.clone()),
            provenance: provenance(id),
        });
    }

    if let Some(id) = &config.fusions {
        let fusions = genomic_table(store, id, "fusions")?;
        let subset = retain_rows_in(&fusions, SAMPLE_BARCODE_COLUMN, &sample_set)?;
        info!(rows = subset.row_count(), "fusions subset");
        planned.push(PlannedOutput {
            name: "subset_fusion.tsv".to_string(),
            table: subset,
            format: WriteOptions::tsv(),
            parent: Some(config.output_folder.clone()),
            provenance: provenance(id),
        });
    }

    let mut staging = Staging::new(TASK, options)?;
    staging.stage_all(planned)?;
    staging.commit(store)
}
