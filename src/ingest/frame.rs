//! Raw session log as read from CSV

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// Column names match case-insensitively after trimming.
pub fn normalize_column_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Untyped table: normalized headers plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawFrame {
    /// Build a frame from in-memory headers and rows. Headers are normalized.
    pub fn new<H: AsRef<str>>(headers: &[H], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers
                .iter()
                .map(|h| normalize_column_name(h.as_ref()))
                .collect(),
            rows,
        }
    }

    /// Read a CSV file. A path that does not exist is `InputMissing`.
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::InputMissing {
                path: path.to_path_buf(),
            },
            _ => PipelineError::IoError(e),
        })?;
        let frame = Self::from_reader(file)?;
        debug!(
            "Read {} rows x {} columns from {}",
            frame.len(),
            frame.headers.len(),
            path.display()
        );
        Ok(frame)
    }

    /// Read CSV from any reader. Short rows are kept; their missing cells read as empty.
    pub fn from_reader<R: Read>(reader: R) -> PipelineResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(&headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by normalized name. Duplicate headers: first wins.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = normalize_column_name(name);
        self.headers.iter().position(|h| *h == name)
    }

    /// Trimmed cell text, `None` when the row is short or the cell is empty.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }
}
