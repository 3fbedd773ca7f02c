use std::path::PathBuf;

use curate_store::EntityId;

/// Outcome of one task run.
#[derive(Debug)]
pub struct TaskReport {
    pub task: &'static str,
    pub dry_run: bool,
    /// Where outputs were written before storing.
    pub work_dir: PathBuf,
    pub outputs: Vec<OutputSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    /// Folder the output is stored under, if any.
    pub destination: Option<EntityId>,
    pub status: OutputStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStatus {
    /// Uploaded under a new or replaced entity.
    Stored(EntityId),
    /// Written locally only.
    Written(PathBuf),
}
