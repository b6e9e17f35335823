//! Pipeline orchestrator
//!
//! Runs the full reconciliation: key listing, cache-aware fetch, payload
//! extraction, classification, and the single atomic report write.
//!
//! # Error Handling
//! - Per-key error isolation: a failed fetch or unreadable payload marks
//!   that record and the run continues
//! - Only an unreadable key source and a failed report write are fatal
//!
//! Processing is strictly sequential: key *i*'s record is finalized before
//! key *i+1* starts, so the report's row order is deterministic.

use crate::services::classifier::Classifier;
use crate::services::key_source::KeySource;
use crate::services::object_fetcher::ObjectFetcher;
use crate::services::payload_extractor;
use crate::services::report_sink::ReportSink;
use crate::types::{
    ClassificationRecord, DownloadStatus, ExtractedPayload, ObjectKey, Problem, Report, RunSummary,
};
use brc_common::Result;
use chrono::Utc;
use std::collections::HashSet;
use tracing::{info, warn};

/// Outcome of one pipeline run
#[derive(Debug)]
pub enum RunOutcome {
    /// The key source yielded nothing; the previous report was left untouched
    NoInput,
    Completed(Report),
}

/// Sequential download-and-classify pipeline
pub struct Pipeline {
    fetcher: ObjectFetcher,
    classifier: Classifier,
    sink: Box<dyn ReportSink>,
}

impl Pipeline {
    pub fn new(fetcher: ObjectFetcher, classifier: Classifier, sink: Box<dyn ReportSink>) -> Pipeline {
        Pipeline {
            fetcher,
            classifier,
            sink,
        }
    }

    pub async fn run(&self, source: &dyn KeySource) -> Result<RunOutcome> {
        let started_at = Utc::now();

        let keys = source.list_keys().await?;
        if keys.is_empty() {
            info!("Key source returned no keys; nothing to reconcile");
            return Ok(RunOutcome::NoInput);
        }

        // Dedup preserving insertion order so each key is fetched at most
        // once per run
        let mut seen = HashSet::new();
        let keys: Vec<ObjectKey> = keys
            .into_iter()
            .filter(|key| seen.insert(key.clone()))
            .collect();

        info!(
            "Reconciling {} keys against cache {}",
            keys.len(),
            self.fetcher.cache_dir().display()
        );

        let mut records = Vec::with_capacity(keys.len());
        let mut downloaded = 0usize;
        let mut already_present = 0usize;
        let mut failed = 0usize;

        for (i, key) in keys.iter().enumerate() {
            let result = self.fetcher.fetch(key).await;

            let payload = match &result.status {
                DownloadStatus::Failed(message) => {
                    failed += 1;
                    warn!("{}: treating as file not found: {}", key, message);
                    ExtractedPayload::unavailable()
                }
                status => {
                    match status {
                        DownloadStatus::Downloaded => downloaded += 1,
                        _ => already_present += 1,
                    }
                    match tokio::fs::read(&result.local_path).await {
                        Ok(bytes) => payload_extractor::extract(&bytes),
                        Err(e) => {
                            warn!(
                                "{}: cached file {} unreadable: {}",
                                key,
                                result.local_path.display(),
                                e
                            );
                            ExtractedPayload::unavailable()
                        }
                    }
                }
            };

            let (problem, order_id) = self.classifier.classify(&payload.brand, key);
            records.push(ClassificationRecord {
                index: i + 1,
                key: key.clone(),
                file_name: key.file_name().to_string(),
                brand: payload.brand,
                problem,
                good_ids: payload.good_ids,
                order_id,
            });
        }

        let flagged_records: Vec<&ClassificationRecord> = records
            .iter()
            .filter(|r| r.problem == Problem::Yes)
            .collect();
        let summary = RunSummary {
            total_keys: records.len(),
            downloaded,
            already_present,
            failed,
            flagged: flagged_records.len(),
            anomaly_order_ids: flagged_records.iter().filter_map(|r| r.order_id).collect(),
            started_at,
            finished_at: Utc::now(),
        };

        let report = Report { records, summary };
        self.sink.write(&report)?;

        let summary = &report.summary;
        info!(
            "Run complete: {} keys, {} downloaded, {} already present, {} failed, {} flagged",
            summary.total_keys,
            summary.downloaded,
            summary.already_present,
            summary.failed,
            summary.flagged
        );
        if !summary.anomaly_order_ids.is_empty() {
            warn!("Anomaly order ids: {:?}", summary.anomaly_order_ids);
        }

        Ok(RunOutcome::Completed(report))
    }
}
