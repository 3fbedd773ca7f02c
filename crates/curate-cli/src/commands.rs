use anyhow::{Context, Result};
use curate_cli::config::{DEFAULT_EXECUTED, SplitConfig, load_config};
use curate_cli::pipeline::RunOptions;
use curate_cli::tasks::{exclude_derived, genomic, release, split};
use curate_cli::types::TaskReport;
use curate_store::LocalStore;
use tracing::info_span;

use crate::cli::{ConfigArgs, RunArgs, SplitArgs};

fn open_store(args: &RunArgs) -> Result<LocalStore> {
    LocalStore::open(&args.store)
        .with_context(|| format!("open store at {}", args.store.display()))
}

fn run_options(args: &RunArgs) -> RunOptions {
    RunOptions {
        dry_run: args.dry_run,
        work_dir: args.work_dir.clone(),
    }
}

pub fn run_release(args: &ConfigArgs) -> Result<TaskReport> {
    let _span = info_span!("task", name = release::TASK).entered();
    let config = load_config(&args.config)?;
    let store = open_store(&args.run)?;
    release::run(&store, &config, &run_options(&args.run))
}

pub fn run_exclude_derived(args: &ConfigArgs) -> Result<TaskReport> {
    let _span = info_span!("task", name = exclude_derived::TASK).entered();
    let config = load_config(&args.config)?;
    let store = open_store(&args.run)?;
    exclude_derived::run(&store, &config, &run_options(&args.run))
}

pub fn run_split(args: &SplitArgs) -> Result<TaskReport> {
    let _span = info_span!("task", name = split::TASK).entered();
    let config = SplitConfig {
        executed: args
            .executed
            .clone()
            .unwrap_or_else(|| DEFAULT_EXECUTED.to_string()),
        input: args.input.clone(),
        dictionary: args.dictionary.clone(),
        output: args.output.clone(),
    };
    let store = open_store(&args.run)?;
    split::run(&store, &config, &run_options(&args.run))
}

pub fn run_genomic_subset(args: &ConfigArgs) -> Result<TaskReport> {
    let _span = info_span!("task", name = genomic::TASK).entered();
    let config = load_config(&args.config)?;
    let store = open_store(&args.run)?;
    genomic::run(&store, &config, &run_options(&args.run))
}
