//! CSV export writer
//!
//! Output is UTF-8 with a byte-order marker so spreadsheet applications pick
//! the right encoding. Cells are quoted only when they contain a comma, a
//! quote or a line break; embedded quotes are doubled.

use crate::comment::{NormalizedRecord, RECORD_HEADERS};
use crate::output::traits::{ExportError, ExportResult};
use chrono::NaiveDate;

/// UTF-8 byte-order marker
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serializes records into CSV bytes
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - BOM, header row, one row per record
/// * `Err(ExportError::Empty)` - There were no records to export
pub fn serialize_records(records: &[NormalizedRecord]) -> ExportResult<Vec<u8>> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(BOM.to_vec());

    writer.write_record(RECORD_HEADERS)?;
    for record in records {
        writer.write_record(record.to_fields())?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Builds the export file name `{author}_{YYYY-MM-DD}.csv`
///
/// Falls back to `fallback` when the author is unknown or blank. Characters
/// that are not allowed in file names are replaced by `_`.
pub fn export_filename(author: Option<&str>, fallback: &str, date: NaiveDate) -> String {
    let name = author
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback);

    let safe: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    format!("{}_{}.csv", safe, date.format("%Y-%m-%d"))
}
