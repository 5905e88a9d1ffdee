//! Data Loading and Writing
//!
//! Reads the paper table (identifier + JSON range column) and writes the
//! harmonized table, both as CSV via Polars.
//!
//! Input columns: `Paper`, `ReportedRangesJSON`

use crate::harmonize::HarmonizedTable;
use crate::records::RawRecord;
use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Identifier column of the input table
pub const PAPER_COLUMN: &str = "Paper";

/// JSON range column of the input table
pub const RANGES_COLUMN: &str = "ReportedRangesJSON";

/// Load raw records from the input CSV
///
/// Encodings are kept as text; parsing happens in the table builder so that
/// errors name the record.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load input CSV: {:?}", path))?;

    let records = records_from_dataframe(&df)
        .with_context(|| format!("Invalid input table: {:?}", path))?;

    info!(path = ?path, records = records.len(), "loaded input table");
    Ok(records)
}

/// Extract raw records from an input DataFrame
pub fn records_from_dataframe(df: &DataFrame) -> Result<Vec<RawRecord>> {
    // Identifiers may be inferred as numbers (e.g. years); treat them as text
    let ids = df
        .column(PAPER_COLUMN)
        .with_context(|| format!("Column '{}' not found", PAPER_COLUMN))?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", PAPER_COLUMN))?;
    let ids = ids.str()?;

    let encodings = df
        .column(RANGES_COLUMN)
        .with_context(|| format!("Column '{}' not found", RANGES_COLUMN))?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", RANGES_COLUMN))?;
    let encodings = encodings.str()?;

    let records = (0..df.height())
        .map(|idx| RawRecord {
            id: ids.get(idx).unwrap_or_default().to_string(),
            encoding: encodings.get(idx).map(str::to_string),
        })
        .collect();

    Ok(records)
}

/// Write the harmonized table: rows = identifiers, columns = bin labels
pub fn write_harmonized_csv(table: &HarmonizedTable, path: &Path) -> Result<()> {
    let mut df = table.to_dataframe()?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output CSV: {:?}", path))?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("Failed to write harmonized table: {:?}", path))?;

    debug!(path = ?path, rows = df.height(), columns = df.width(), "wrote harmonized table");
    Ok(())
}
