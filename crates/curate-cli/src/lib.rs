//! Release curation drivers.
//!
//! Each task in [`tasks`] reads its inputs from a [`DataStore`], runs the
//! pure transformations from `curate-core`, stages every output locally and
//! only then stores the batch.
//!
//! [`DataStore`]: curate_store::DataStore

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod tasks;
pub mod types;
