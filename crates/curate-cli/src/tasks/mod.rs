//! One driver per curation task.
//!
//! Every driver follows the same shape: fetch inputs, compute all outputs,
//! then stage and commit them through [`Staging`](crate::pipeline::Staging).

pub mod exclude_derived;
pub mod genomic;
pub mod release;
pub mod split;
