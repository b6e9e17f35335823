//! brc-batch - download-and-classify reconciliation pipeline
//!
//! Takes a list of remote object keys, reconciles them against a local
//! cache, downloads missing objects with per-key failure isolation,
//! extracts the brand and good identifiers from each object's JSON body,
//! and rewrites a tabular report annotating each entry as matching or
//! mismatched against the expected brand.

pub mod pipeline;
pub mod services;
pub mod types;

pub use pipeline::{Pipeline, RunOutcome};
