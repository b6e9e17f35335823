//! Core domain types for the reconciliation batch
//!
//! The extraction results are tagged enums rather than sentinel strings;
//! the sentinel spellings (`not found`, `parse error`, `file not found`,
//! `no lots`, `error`) exist only at the rendering boundary, so consumers
//! branch on variants instead of string-matching.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

/// Identifier of a remote object, doubling as a relative path.
///
/// Always non-empty and trimmed; construction rejects blank input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Trim `raw` and build a key; `None` for empty/whitespace-only input.
    pub fn new(raw: &str) -> Option<ObjectKey> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ObjectKey(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment, used as the local cache filename.
    /// Empty when the key ends with a separator.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// [`file_name`](Self::file_name) stripped of its extension
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(i) if i > 0 => &name[..i],
            _ => name,
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How one key's object was reconciled against the local cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Cache hit; no request was made
    AlreadyPresent,
    /// Fetched from the object store this run
    Downloaded,
    /// Single attempt failed; the run continues
    Failed(String),
}

/// Per-key fetch outcome, immutable once created
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub key: ObjectKey,
    pub local_path: PathBuf,
    pub status: DownloadStatus,
}

/// Brand extracted from a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandField {
    Found(String),
    /// Navigation path absent or not a string
    Missing,
    /// Payload root was not valid JSON
    ParseFailed(String),
    /// The local file was never fetched
    Unavailable,
}

impl BrandField {
    /// Report-facing rendering, matching the fixed sentinel spellings
    pub fn render(&self) -> String {
        match self {
            BrandField::Found(brand) => brand.clone(),
            BrandField::Missing => "not found".to_string(),
            BrandField::ParseFailed(_) => "parse error".to_string(),
            BrandField::Unavailable => "file not found".to_string(),
        }
    }
}

/// Good identifiers extracted from a payload's lots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoodIdsField {
    /// Deduplicated ids in first-seen order; may be empty when lots exist
    /// but none carries a usable id
    Found(Vec<String>),
    /// `lots` absent or an empty array
    NoLots,
    /// Extraction failed (malformed root, or `lots` is not an array);
    /// distinguishable from an empty dedup result
    Error(String),
    /// The local file was never fetched
    Unavailable,
}

impl GoodIdsField {
    pub fn render(&self) -> String {
        match self {
            GoodIdsField::Found(ids) => ids.join(", "),
            GoodIdsField::NoLots => "no lots".to_string(),
            GoodIdsField::Error(_) => "error".to_string(),
            GoodIdsField::Unavailable => "file not found".to_string(),
        }
    }
}

/// Fields extracted from one downloaded object, never mutated afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPayload {
    pub brand: BrandField,
    pub good_ids: GoodIdsField,
}

impl ExtractedPayload {
    /// Payload for a key whose object never made it to the local cache
    pub fn unavailable() -> ExtractedPayload {
        ExtractedPayload {
            brand: BrandField::Unavailable,
            good_ids: GoodIdsField::Unavailable,
        }
    }
}

/// Tri-state problem flag; `Unknown` keeps never-fetched records out of
/// both the matched and mismatched buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    Yes,
    No,
    Unknown,
}

impl Problem {
    pub fn render(&self) -> &'static str {
        match self {
            Problem::Yes => "Yes",
            Problem::No => "No",
            Problem::Unknown => "—",
        }
    }
}

/// One finalized report row
#[derive(Debug, Clone)]
pub struct ClassificationRecord {
    /// 1-based position in the deduplicated key sequence
    pub index: usize,
    pub key: ObjectKey,
    pub file_name: String,
    pub brand: BrandField,
    pub problem: Problem,
    pub good_ids: GoodIdsField,
    /// Key's file stem parsed as an integer, when it is one
    pub order_id: Option<i64>,
}

/// Counters and anomaly list for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_keys: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub failed: usize,
    pub flagged: usize,
    /// Order ids of flagged records, in report order
    pub anomaly_order_ids: Vec<i64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Full result of one pipeline run
#[derive(Debug, Clone)]
pub struct Report {
    pub records: Vec<ClassificationRecord>,
    pub summary: RunSummary,
}
