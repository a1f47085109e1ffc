//! Tab-separated code table → JSON records.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{PublishError, Result};

/// Source column holding the administrative code.
pub const CODE_COLUMN: &str = "ADMCD";
/// Source column holding the administrative unit name.
pub const NAME_COLUMN: &str = "ADMNM";

/// One data row, keyed by header name. Every value is kept as text.
pub type Row = BTreeMap<String, String>;

/// A published administrative code entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdministrativeCode {
    pub code: String,
    pub name: String,
}

/// Reads a tab-delimited file with a header row.
pub fn read_tsv(path: &Path) -> Result<Vec<Row>> {
    let file = File::open(path).map_err(|source| {
        error!(path = %path.display(), error = ?source, "Failed to open TSV file");
        PublishError::FileAccess {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let rows = parse_tsv(file, path)?;
    info!(path = %path.display(), rows = rows.len(), "Parsed TSV file");
    Ok(rows)
}

/// Parses tab-delimited text from any reader. `origin` is only used in errors.
///
/// Rows with fewer cells than the header are accepted; the missing columns are
/// simply absent from that row. Cells beyond the header are dropped.
pub fn parse_tsv<R: Read>(reader: R, origin: &Path) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| csv_error(origin, e))?
        .clone();
    debug!(headers = ?headers, "Read TSV header row");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(origin, e))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Projects raw rows onto `{code, name}`, preserving order and duplicates.
pub fn to_adm_codes(rows: &[Row]) -> Result<Vec<AdministrativeCode>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            Ok(AdministrativeCode {
                code: field(row, i + 1, CODE_COLUMN)?,
                name: field(row, i + 1, NAME_COLUMN)?,
            })
        })
        .collect()
}

fn field(row: &Row, row_number: usize, column: &'static str) -> Result<String> {
    row.get(column).cloned().ok_or_else(|| {
        error!(row = row_number, field = column, "Record is missing expected column");
        PublishError::MissingField {
            row: row_number,
            field: column,
        }
    })
}

fn csv_error(origin: &Path, e: csv::Error) -> PublishError {
    let message = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(source) => PublishError::FileAccess {
            path: origin.to_path_buf(),
            source,
        },
        _ => PublishError::Parse {
            path: origin.to_path_buf(),
            message,
        },
    }
}
