//! Harmonization Table Builder
//!
//! Runs the allocator once per record and assembles a record × bin table.
//! Rows keep input order and duplicates; columns always follow the configured
//! bin order. Includes both sequential and parallel (Rayon) builders.

use crate::allocator::{allocate_with_options, AllocationOptions, AllocationResult};
use crate::bins::BinSet;
use crate::records::{ParseError, RawRecord, Record};
use anyhow::Result;
use polars::prelude::*;
use rayon::prelude::*;
use tracing::{info, warn};

/// Name of the identifier column in tabular output
pub const ID_COLUMN: &str = "Paper";

/// One harmonized record
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonizedRow {
    pub id: String,
    pub result: AllocationResult,
}

/// Record × bin matrix of allocated percentages
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonizedTable {
    bin_labels: Vec<String>,
    rows: Vec<HarmonizedRow>,
}

impl HarmonizedTable {
    pub fn bin_labels(&self) -> &[String] {
        &self.bin_labels
    }

    pub fn rows(&self) -> &[HarmonizedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row with this identifier
    pub fn row(&self, id: &str) -> Option<&HarmonizedRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Value of `label` in row `row_idx`, zero for unknown labels
    pub fn value(&self, row_idx: usize, label: &str) -> f64 {
        self.rows
            .get(row_idx)
            .and_then(|r| r.result.get(label))
            .unwrap_or(0.0)
    }

    /// Row values in column order
    pub fn row_values(&self, row_idx: usize) -> Vec<f64> {
        self.bin_labels.iter().map(|label| self.value(row_idx, label)).collect()
    }

    /// Output total per row
    pub fn row_totals(&self) -> Vec<(String, f64)> {
        (0..self.rows.len())
            .map(|i| (self.rows[i].id.clone(), self.row_values(i).iter().sum()))
            .collect()
    }

    /// Transposed view for charting: per bin, one value per record
    pub fn bin_series(&self) -> Vec<(String, Vec<f64>)> {
        self.bin_labels
            .iter()
            .map(|label| {
                let values = (0..self.rows.len()).map(|i| self.value(i, label)).collect();
                (label.clone(), values)
            })
            .collect()
    }

    /// Table as a DataFrame: identifier column, then one column per bin
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let ids: Vec<&str> = self.rows.iter().map(|r| r.id.as_str()).collect();

        let mut columns = Vec::with_capacity(self.bin_labels.len() + 1);
        columns.push(Column::new(ID_COLUMN.into(), ids));

        for label in &self.bin_labels {
            let values: Vec<f64> = (0..self.rows.len()).map(|i| self.value(i, label)).collect();
            columns.push(Column::new(label.as_str().into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }
}

fn log_row(row: &HarmonizedRow) {
    let diag = &row.result.diagnostics;
    if diag.has_losses() {
        warn!(
            record = %row.id,
            skipped = diag.skipped_ranges,
            clipped = diag.clipped_ranges,
            discarded_pct = diag.discarded_pct,
            "ranges fell outside the configured bins"
        );
    }
    if !diag.normalized && diag.raw_total != 0.0 {
        info!(record = %row.id, total = diag.raw_total, "row total outside tolerance, left unnormalized");
    }
}

fn harmonize_one(record: &Record, bins: &BinSet, options: &AllocationOptions) -> HarmonizedRow {
    let row = HarmonizedRow {
        id: record.id.clone(),
        result: allocate_with_options(&record.ranges, bins, options),
    };
    log_row(&row);
    row
}

/// Harmonize already-parsed records
pub fn harmonize_records(records: &[Record], bins: &BinSet) -> HarmonizedTable {
    harmonize_records_with_options(records, bins, &AllocationOptions::default())
}

pub fn harmonize_records_with_options(
    records: &[Record],
    bins: &BinSet,
    options: &AllocationOptions,
) -> HarmonizedTable {
    HarmonizedTable {
        bin_labels: bins.labels(),
        rows: records.iter().map(|r| harmonize_one(r, bins, options)).collect(),
    }
}

/// Parse and harmonize raw records, aborting on the first malformed encoding
pub fn build_harmonized_table(
    records: &[RawRecord],
    bins: &BinSet,
) -> std::result::Result<HarmonizedTable, ParseError> {
    build_harmonized_table_with_options(records, bins, &AllocationOptions::default())
}

pub fn build_harmonized_table_with_options(
    records: &[RawRecord],
    bins: &BinSet,
    options: &AllocationOptions,
) -> std::result::Result<HarmonizedTable, ParseError> {
    let parsed = records
        .iter()
        .map(RawRecord::parse)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(harmonize_records_with_options(&parsed, bins, options))
}

/// Parallel variant of [`build_harmonized_table`]
///
/// Records are independent, so this yields the same table; row order is
/// preserved by the indexed collect.
pub fn build_harmonized_table_parallel(
    records: &[RawRecord],
    bins: &BinSet,
) -> std::result::Result<HarmonizedTable, ParseError> {
    build_harmonized_table_parallel_with_options(records, bins, &AllocationOptions::default())
}

pub fn build_harmonized_table_parallel_with_options(
    records: &[RawRecord],
    bins: &BinSet,
    options: &AllocationOptions,
) -> std::result::Result<HarmonizedTable, ParseError> {
    let rows = records
        .par_iter()
        .map(|raw| raw.parse().map(|record| harmonize_one(&record, bins, options)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(HarmonizedTable { bin_labels: bins.labels(), rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MIXED: &str =
        r#"[{"low":6,"high":11,"pct":50},{"low":12,"high":20,"pct":45},{"low":21,"high":40,"pct":5}]"#;

    fn sample_records() -> Vec<RawRecord> {
        vec![
            RawRecord::new("Smith 2020", MIXED),
            RawRecord::new("Out of range", r#"[{"low":50,"high":60,"pct":10}]"#),
            RawRecord::new("Gappy", r#"[{"low":6,"high":10,"pct":60},{"low":11,"high":15,"pct":37}]"#),
            RawRecord::new("Smith 2020", r#"[{"low":4,"high":5,"pct":100}]"#),
        ]
    }

    #[test]
    fn test_build_table_keeps_order_and_duplicates() {
        let table = build_harmonized_table(&sample_records(), &BinSet::pyrolysis_default()).unwrap();

        let ids: Vec<_> = table.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["Smith 2020", "Out of range", "Gappy", "Smith 2020"]);
        assert_eq!(table.row_values(0), vec![0.0, 41.667, 28.333, 25.0, 5.0]);
        assert_eq!(table.row_values(1), vec![0.0; 5]);
        assert_eq!(table.row_values(3), vec![100.0, 0.0, 0.0, 0.0, 0.0]);

        // First match wins for duplicate identifiers
        assert_eq!(table.row("Smith 2020").unwrap().result.get("C6–C10"), Some(41.667));
    }

    #[test]
    fn test_row_totals_show_unnormalized_gaps() {
        let table = build_harmonized_table(&sample_records(), &BinSet::pyrolysis_default()).unwrap();
        let totals = table.row_totals();

        assert_relative_eq!(totals[0].1, 100.0, epsilon = 1e-9);
        assert_relative_eq!(totals[2].1, 97.0, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_error_aborts_batch() {
        let mut records = sample_records();
        records.insert(1, RawRecord::new("Broken", r#"[{"low":6}]"#));

        let err = build_harmonized_table(&records, &BinSet::pyrolysis_default()).unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let bins = BinSet::pyrolysis_default();
        let records: Vec<_> = sample_records().into_iter().cycle().take(64).collect();

        let sequential = build_harmonized_table(&records, &bins).unwrap();
        let parallel = build_harmonized_table_parallel(&records, &bins).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_parallel_with_options_matches_sequential() {
        let bins = BinSet::pyrolysis_default();
        let options = AllocationOptions { tolerance: (90.0, 110.0), target: 100.0, precision: 1 };
        let records: Vec<_> = sample_records().into_iter().cycle().take(32).collect();

        let sequential = build_harmonized_table_with_options(&records, &bins, &options).unwrap();
        let parallel = build_harmonized_table_parallel_with_options(&records, &bins, &options).unwrap();
        assert_eq!(sequential, parallel);

        // The 97% row falls inside the wider band and is rescaled
        assert!(parallel.rows()[2].result.diagnostics.normalized);
        assert_eq!(parallel.row_values(2), vec![0.0, 61.9, 38.1, 0.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_bound_fails_batch_without_panic() {
        let records = vec![RawRecord::new("p", r#"[{"low":-1e300,"high":10,"pct":5}]"#)];

        let err = build_harmonized_table(&records, &BinSet::pyrolysis_default()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidBound { .. }));
        assert!(build_harmonized_table_parallel(&records, &BinSet::pyrolysis_default()).is_err());
    }

    #[test]
    fn test_bin_series_is_transposed() {
        let table = build_harmonized_table(&sample_records(), &BinSet::pyrolysis_default()).unwrap();
        let series = table.bin_series();

        assert_eq!(series.len(), 5);
        assert_eq!(series[0].0, "C4–C5");
        assert_eq!(series[1].1, vec![41.667, 0.0, 60.0, 0.0]);
    }

    #[test]
    fn test_to_dataframe_column_order() {
        let table = build_harmonized_table(&sample_records(), &BinSet::pyrolysis_default()).unwrap();
        let df = table.to_dataframe().unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["Paper", "C4–C5", "C6–C10", "C11–C15", "C16–C20", "C21–C40"]);
        assert_eq!(df.height(), 4);

        let c16 = df.column("C16–C20").unwrap().f64().unwrap();
        assert_eq!(c16.get(0), Some(25.0));
    }

    #[test]
    fn test_empty_batch() {
        let table = build_harmonized_table(&[], &BinSet::pyrolysis_default()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.bin_labels().len(), 5);
        assert_eq!(table.to_dataframe().unwrap().height(), 0);
    }
}
