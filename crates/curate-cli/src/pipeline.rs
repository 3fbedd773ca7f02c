//! Staging outputs and storing them all-or-nothing.
//!
//! Tasks compute every output table first, stage them as local files, and
//! only then hand the batch to [`Staging::commit`]. A failure before the
//! commit leaves the store untouched, and the commit checks every
//! destination before the first upload.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use curate_ingest::{WriteOptions, write_record_table};
use curate_model::{ProvenanceRecord, RecordTable};
use curate_store::{DataStore, EntityId, StoreRequest};
use tempfile::TempDir;
use tracing::{info, warn};

use crate::types::{OutputStatus, OutputSummary, TaskReport};

/// Options shared by every task.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Write outputs locally and never store them.
    pub dry_run: bool,
    /// Where outputs are written. Defaults to the current directory for a
    /// dry run and to a temp directory otherwise.
    pub work_dir: Option<PathBuf>,
}

/// A computed output waiting to be written.
#[derive(Debug)]
pub struct PlannedOutput {
    pub name: String,
    pub table: RecordTable,
    pub format: WriteOptions,
    pub parent: Option<EntityId>,
    pub provenance: ProvenanceRecord,
}

#[derive(Debug)]
struct StagedOutput {
    name: String,
    local_path: PathBuf,
    rows: usize,
    columns: usize,
    parent: Option<EntityId>,
    provenance: ProvenanceRecord,
}

#[derive(Debug)]
enum WorkDir {
    Temp(TempDir),
    Given(PathBuf),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            Self::Temp(dir) => dir.path(),
            Self::Given(path) => path,
        }
    }
}

/// Local output files of one run.
#[derive(Debug)]
pub struct Staging {
    task: &'static str,
    dry_run: bool,
    work_dir: WorkDir,
    staged: Vec<StagedOutput>,
}

impl Staging {
    pub fn new(task: &'static str, options: &RunOptions) -> Result<Self> {
        let work_dir = match (&options.work_dir, options.dry_run) {
            (Some(path), _) => {
                std::fs::create_dir_all(path)
                    .with_context(|| format!("create work dir {}", path.display()))?;
                WorkDir::Given(path.clone())
            }
            (None, true) => WorkDir::Given(PathBuf::from(".")),
            (None, false) => WorkDir::Temp(
                tempfile::Builder::new()
                    .prefix("curate-")
                    .tempdir()
                    .context("create temp work dir")?,
            ),
        };
        Ok(Self {
            task,
            dry_run: options.dry_run,
            work_dir,
            staged: Vec::new(),
        })
    }

    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }

    /// Writes every planned output to the work dir.
    pub fn stage_all(&mut self, planned: Vec<PlannedOutput>) -> Result<()> {
        for output in planned {
            if self.staged.iter().any(|staged| {
                staged.name == output.name && staged.parent == output.parent
            }) {
                anyhow::bail!("output {} would be written twice", output.name);
            }
            let local_path = self.work_dir.path().join(&output.name);
            write_record_table(&local_path, &output.table, &output.format)
                .with_context(|| format!("write {}", local_path.display()))?;
            info!(
                output = %output.name,
                rows = output.table.row_count(),
                columns = output.table.column_count(),
                "wrote local output"
            );
            self.staged.push(StagedOutput {
                name: output.name,
                local_path,
                rows: output.table.row_count(),
                columns: output.table.column_count(),
                parent: output.parent,
                provenance: output.provenance,
            });
        }
        Ok(())
    }

    /// Checks every destination, then stores every staged output, removing
    /// each local file once stored.
    /// A dry run keeps the local files and stores nothing.
    pub fn commit(self, store: &dyn DataStore) -> Result<TaskReport> {
        if !self.dry_run {
            for staged in &self.staged {
                if let Some(parent) = &staged.parent {
                    store
                        .check_destination(parent, &staged.name)
                        .with_context(|| format!("check destination of {}", staged.name))?;
                }
            }
        }
        let mut outputs = Vec::with_capacity(self.staged.len());
        for staged in self.staged {
            let status = match (&staged.parent, self.dry_run) {
                (Some(parent), false) => {
                    let stored = store
                        .store(&StoreRequest {
                            local_path: staged.local_path.clone(),
                            name: staged.name.clone(),
                            parent: parent.clone(),
                            provenance: staged.provenance,
                        })
                        .with_context(|| format!("store {}", staged.name))?;
                    if let Err(error) = std::fs::remove_file(&staged.local_path) {
                        warn!(
                            path = %staged.local_path.display(),
                            %error,
                            "could not remove local output"
                        );
                    }
                    OutputStatus::Stored(stored.id)
                }
                _ => OutputStatus::Written(staged.local_path),
            };
            outputs.push(OutputSummary {
                name: staged.name,
                rows: staged.rows,
                columns: staged.columns,
                destination: staged.parent,
                status,
            });
        }
        Ok(TaskReport {
            task: self.task,
            dry_run: self.dry_run,
            work_dir: self.work_dir.path().to_path_buf(),
            outputs,
        })
    }
}
