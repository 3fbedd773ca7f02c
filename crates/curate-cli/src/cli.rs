//! CLI argument definitions for the curation tasks.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use curate_store::EntityId;

#[derive(Parser)]
#[command(
    name = "curate",
    version,
    about = "Curate clinical data releases",
    long_about = "Build per-site release files from REDCap exports.\n\n\
                  Filters exports by a variable catalog, removes retracted records,\n\
                  splits labelled exports by instrument and subsets genomic files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow record identifiers in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build per-site release files from a catalog and retraction ledger.
    Release(ConfigArgs),

    /// Drop derived variables from every export in a folder.
    ExcludeDerived(ConfigArgs),

    /// Split a labelled export into one file per instrument.
    Split(SplitArgs),

    /// Subset genomic files to a list of patients.
    GenomicSubset(ConfigArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Root of the local store (contains store.toml).
    #[arg(long = "store", value_name = "DIR", default_value = ".")]
    pub store: PathBuf,

    /// Write outputs locally without storing them.
    #[arg(short = 'd', long = "dry-run")]
    pub dry_run: bool,

    /// Directory for local outputs (default: current directory on a dry run,
    /// a temporary directory otherwise).
    #[arg(long = "work-dir", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Task configuration file.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args)]
pub struct SplitArgs {
    /// Labelled export entity.
    #[arg(short = 'i', long = "input", value_name = "ID")]
    pub input: EntityId,

    /// REDCap data dictionary entity.
    #[arg(short = 'f', long = "dictionary", visible_alias = "file", value_name = "ID")]
    pub dictionary: EntityId,

    /// Folder the instrument files are stored under.
    #[arg(short = 'o', long = "output", value_name = "ID")]
    pub output: Option<EntityId>,

    /// Provenance link recorded as the executing code.
    #[arg(long = "executed", value_name = "URL")]
    pub executed: Option<String>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
