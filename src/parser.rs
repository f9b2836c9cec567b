//! CSV ingestion for exported pull-request records.

use tracing::{debug, warn};

use crate::analyzers::types::{Diagnostic, RawRecord};
use crate::error::{ReleaseError, Result};

/// Header columns that must be present; any others are ignored.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Branch", "Release Type", "Merged At"];

/// One exported batch held in memory.
#[derive(Debug, Default)]
pub struct Batch {
    pub records: Vec<RawRecord>,
    /// Rows that could not be read as a record.
    pub rejected: Vec<Diagnostic>,
}

/// Reads a CSV batch from raw bytes.
///
/// # Errors
///
/// Returns an error if a required column is missing or the underlying
/// reader fails. Malformed rows are collected in [`Batch::rejected`] instead.
pub fn parse_records(bytes: &[u8]) -> Result<Batch> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ReleaseError::MissingColumn(column));
        }
    }

    let mut batch = Batch::default();

    for result in rdr.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                warn!(line, error = %e, "Rejecting unreadable CSV row");
                batch.rejected.push(Diagnostic {
                    line,
                    value: String::new(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let line = row.position().map(|p| p.line()).unwrap_or(0);
        match row.deserialize::<RawRecord>(Some(&headers)) {
            Ok(record) => batch.records.push(record.at_line(line)),
            Err(e) => {
                warn!(line, error = %e, "Rejecting malformed CSV row");
                batch.rejected.push(Diagnostic {
                    line,
                    value: row.iter().collect::<Vec<_>>().join(","),
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        records = batch.records.len(),
        rejected = batch.rejected.len(),
        "CSV batch parsed"
    );

    Ok(batch)
}
