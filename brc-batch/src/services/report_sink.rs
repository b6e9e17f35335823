//! Report persistence
//!
//! Builds the output table from the finalized record sequence and persists
//! it in one atomic replace. Rows flagged as problems carry the highlight
//! annotation in the document model.

use crate::types::{Problem, Report};
use brc_common::table::{Cell, Row, TableDocument};
use brc_common::Result;
use std::path::{Path, PathBuf};

/// Fixed output column headers
pub const REPORT_HEADERS: [&str; 6] = ["#", "S3 Path", "File", "Brand", "Problem?", "GoodIds"];

/// Persists a finalized report
pub trait ReportSink: Send + Sync {
    fn write(&self, report: &Report) -> Result<()>;
}

/// CSV-backed report sink with write-to-temp-then-rename semantics
pub struct CsvReportSink {
    path: PathBuf,
}

impl CsvReportSink {
    pub fn new(path: impl Into<PathBuf>) -> CsvReportSink {
        CsvReportSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for CsvReportSink {
    fn write(&self, report: &Report) -> Result<()> {
        let mut doc = TableDocument::new(REPORT_HEADERS.iter().map(|h| h.to_string()).collect());
        for record in &report.records {
            let cells = vec![
                Cell::Int(record.index as i64),
                Cell::text(record.key.as_str()),
                Cell::text(&record.file_name),
                Cell::text(record.brand.render()),
                Cell::text(record.problem.render()),
                Cell::text(record.good_ids.render()),
            ];
            let row = match record.problem {
                Problem::Yes => Row::highlighted(cells),
                _ => Row::new(cells),
            };
            doc.push_row(row);
        }
        doc.write_csv_atomic(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        BrandField, ClassificationRecord, GoodIdsField, ObjectKey, RunSummary,
    };
    use chrono::Utc;

    fn record(index: usize, key: &str, problem: Problem) -> ClassificationRecord {
        let key = ObjectKey::new(key).unwrap();
        ClassificationRecord {
            index,
            file_name: key.file_name().to_string(),
            brand: BrandField::Found("Digitalpay".into()),
            problem,
            good_ids: GoodIdsField::Found(vec!["A".into()]),
            order_id: key.file_stem().parse().ok(),
            key,
        }
    }

    fn report(records: Vec<ClassificationRecord>) -> Report {
        let now = Utc::now();
        Report {
            summary: RunSummary {
                total_keys: records.len(),
                downloaded: records.len(),
                already_present: 0,
                failed: 0,
                flagged: records.iter().filter(|r| r.problem == Problem::Yes).count(),
                anomaly_order_ids: vec![],
                started_at: now,
                finished_at: now,
            },
            records,
        }
    }

    #[test]
    fn test_written_report_has_headers_and_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let sink = CsvReportSink::new(&path);

        sink.write(&report(vec![
            record(1, "orders/123.json", Problem::No),
            record(2, "orders/124.json", Problem::Yes),
        ]))
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "#,S3 Path,File,Brand,Problem?,GoodIds");
        assert_eq!(lines[1], "1,orders/123.json,123.json,Digitalpay,No,A");
        assert_eq!(lines[2], "2,orders/124.json,124.json,Digitalpay,Yes,A");
    }

    #[test]
    fn test_rewrite_replaces_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let sink = CsvReportSink::new(&path);

        sink.write(&report(vec![
            record(1, "orders/123.json", Problem::No),
            record(2, "orders/124.json", Problem::No),
        ]))
        .unwrap();
        sink.write(&report(vec![record(1, "orders/125.json", Problem::No)]))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("orders/125.json"));
        assert!(!content.contains("orders/123.json"));
    }

    #[test]
    fn test_unwritable_destination_is_fatal_error() {
        let sink = CsvReportSink::new("/nonexistent/dir/report.csv");
        let err = sink.write(&report(vec![])).unwrap_err();
        assert!(matches!(err, brc_common::Error::ReportWrite(_)));
    }
}
