use std::path::Path;

use crate::domain::{AssembledRecord, COLUMNS};
use crate::error::AppError;

/// Write records to the tabular sink: fixed 16-column header, every field
/// quoted, UTF-8, one row per record. Incomplete records are written like any
/// other; flagging happens upstream, never by omission here.
pub fn write_records_csv(path: &Path, records: &[AssembledRecord]) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_path(path)
        .map_err(|e| {
            AppError::new("EXPORT_CSV_FAILED", "Failed to open CSV output")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;

    writer.write_record(COLUMNS).map_err(|e| {
        AppError::new("EXPORT_CSV_FAILED", "Failed to write CSV header").with_details(e.to_string())
    })?;

    for assembled in records {
        writer.write_record(assembled.record.to_row()).map_err(|e| {
            AppError::new("EXPORT_CSV_FAILED", "Failed to write CSV row")
                .with_details(format!("file={}; err={}", assembled.record.file, e))
        })?;
    }

    writer.flush().map_err(|e| {
        AppError::new("EXPORT_CSV_FAILED", "Failed to flush CSV output").with_details(e.to_string())
    })
}
