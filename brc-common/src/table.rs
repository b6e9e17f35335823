//! Tabular document model and CSV codec
//!
//! The report store is modeled as an in-memory document of typed cells with
//! row-level style annotations. The bundled codec is CSV: styles are carried
//! in the model for sinks that can render them, but the CSV serialization
//! writes values only.
//!
//! Writing is atomic: the document is serialized to a temporary file in the
//! destination directory and renamed over the previous report, so a crash
//! mid-write leaves the prior report untouched.

use crate::{Error, Result};
use std::path::Path;

/// A single typed cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Cell {
        Cell::Text(value.into())
    }

    /// Render the cell the way the codec serializes it
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// Row-level style annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStyle {
    #[default]
    Normal,
    /// Visually distinguished row (anomaly highlighting)
    Highlight,
}

/// One data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub style: RowStyle,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Row {
        Row {
            cells,
            style: RowStyle::Normal,
        }
    }

    pub fn highlighted(cells: Vec<Cell>) -> Row {
        Row {
            cells,
            style: RowStyle::Highlight,
        }
    }

    /// Cell at `index`, treating missing trailing cells as empty
    pub fn cell(&self, index: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.cells.get(index).unwrap_or(&EMPTY)
    }
}

/// An ordered table with one header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDocument {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl TableDocument {
    pub fn new(headers: Vec<String>) -> TableDocument {
        TableDocument {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Read a CSV document. The first record is the header row; data cells
    /// come back as `Text` (CSV carries no type information). Ragged rows
    /// are tolerated.
    ///
    /// Any failure maps to [`Error::SourceUnavailable`]: a table that cannot
    /// be read means the run has no key list to work from.
    pub fn read_csv(path: &Path) -> Result<TableDocument> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;

        let headers = reader
            .headers()
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut doc = TableDocument::new(headers);
        for record in reader.records() {
            let record = record
                .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
            let cells = record.iter().map(Cell::text).collect();
            doc.push_row(Row::new(cells));
        }
        Ok(doc)
    }

    /// Persist the document as CSV, replacing any previous file at `path`
    /// atomically (write to a sibling temp file, then rename).
    ///
    /// Failures map to [`Error::ReportWrite`] and must be treated as fatal
    /// by the caller.
    pub fn write_csv_atomic(&self, path: &Path) -> Result<()> {
        let tmp_path = temp_sibling(path);

        let write = || -> std::result::Result<(), csv::Error> {
            let mut writer = csv::Writer::from_path(&tmp_path)?;
            writer.write_record(&self.headers)?;
            for row in &self.rows {
                let rendered: Vec<String> = row.cells.iter().map(Cell::render).collect();
                writer.write_record(&rendered)?;
            }
            writer.flush()?;
            Ok(())
        };

        if let Err(e) = write() {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(Error::ReportWrite(format!("{}: {}", path.display(), e)));
        }

        std::fs::rename(&tmp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            Error::ReportWrite(format!("{}: {}", path.display(), e))
        })
    }
}

/// Temp file next to the destination so the final rename stays on one
/// filesystem. Single-instance execution is assumed, so a fixed suffix
/// is sufficient.
fn temp_sibling(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}
