//! Entry export
//!
//! Dumps the ledger as CSV (`id,amount,label,category,date`) or as the same
//! JSON array that is persisted.

use crate::ledger::Entry;
use std::io::Write;
use thiserror::Error;

/// Columns written by [`write_csv`], after `id` and `amount`
const DETAIL_COLUMNS: [&str; 3] = ["label", "category", "date"];

/// Export failures
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("Unknown export format: {}. Use: csv, json", other)),
        }
    }
}

/// Write entries in the given format
pub fn write_entries<W: Write>(
    entries: &[Entry],
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => write_csv(entries, writer),
        ExportFormat::Json => write_json(entries, writer),
    }
}

/// CSV with a header row. Missing or non-text detail fields are left empty.
pub fn write_csv<W: Write>(entries: &[Entry], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["id", "amount"];
    header.extend(DETAIL_COLUMNS);
    csv.write_record(&header)?;

    for entry in entries {
        let mut record = vec![entry.id.to_string(), entry.amount.to_string()];
        for column in DETAIL_COLUMNS {
            record.push(entry.detail_str(column).unwrap_or_default().to_string());
        }
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Pretty-printed JSON array
pub fn write_json<W: Write>(entries: &[Entry], mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writeln!(writer)?;
    Ok(())
}
