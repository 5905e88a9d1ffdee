// Harmonization Integration Tests
//
// Purpose: CSV in → harmonized table → CSV out, end to end through the public API
// Run with: cargo test --test harmonize_integration_tests

use carbon_bins_rust::data::{PAPER_COLUMN, RANGES_COLUMN};
use carbon_bins_rust::{
    build_harmonized_table, load_records, write_harmonized_csv, BinSet, ParseError,
};
use std::fs;
use std::path::Path;

fn write_input(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("pp_bins_input.csv");
    fs::write(&path, format!("{},{}\n{}", PAPER_COLUMN, RANGES_COLUMN, body)).unwrap();
    path
}

// =========================================================================
// Section 1: Full pipeline
// =========================================================================

#[test]
fn test_csv_to_harmonized_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        concat!(
            "Smith 2020,\"[{\"\"low\"\":6,\"\"high\"\":11,\"\"pct\"\":50},{\"\"low\"\":12,\"\"high\"\":20,\"\"pct\"\":45},{\"\"low\"\":21,\"\"high\"\":40,\"\"pct\"\":5}]\"\n",
            "Out of domain,\"[{\"\"low\"\":50,\"\"high\"\":60,\"\"pct\"\":10}]\"\n",
            "Partial,\"[{\"\"low\"\":6,\"\"high\"\":10,\"\"pct\"\":60},{\"\"low\"\":11,\"\"high\"\":15,\"\"pct\"\":37}]\"\n",
        ),
    );

    let records = load_records(&input).unwrap();
    assert_eq!(records.len(), 3);

    let table = build_harmonized_table(&records, &BinSet::pyrolysis_default()).unwrap();
    let output = dir.path().join("pp_bins_harmonized.csv");
    write_harmonized_csv(&table, &output).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();

    assert_eq!(lines[0], "Paper,C4–C5,C6–C10,C11–C15,C16–C20,C21–C40");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("Smith 2020,"));

    let smith: Vec<f64> = lines[1].split(',').skip(1).map(|v| v.parse().unwrap()).collect();
    assert_eq!(smith, vec![0.0, 41.667, 28.333, 25.0, 5.0]);

    let out_of_domain: Vec<f64> = lines[2].split(',').skip(1).map(|v| v.parse().unwrap()).collect();
    assert_eq!(out_of_domain, vec![0.0; 5]);

    // 97% total stays 97%
    let partial: Vec<f64> = lines[3].split(',').skip(1).map(|v| v.parse().unwrap()).collect();
    assert_eq!(partial, vec![0.0, 60.0, 37.0, 0.0, 0.0]);
}

#[test]
fn test_duplicate_papers_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        concat!(
            "Lee,\"[{\"\"low\"\":4,\"\"high\"\":5,\"\"pct\"\":100}]\"\n",
            "Lee,\"[{\"\"low\"\":21,\"\"high\"\":40,\"\"pct\"\":100}]\"\n",
        ),
    );

    let records = load_records(&input).unwrap();
    let table = build_harmonized_table(&records, &BinSet::pyrolysis_default()).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.row_values(0), vec![100.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(table.row_values(1), vec![0.0, 0.0, 0.0, 0.0, 100.0]);
}

// =========================================================================
// Section 2: Failures
// =========================================================================

#[test]
fn test_malformed_row_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        concat!(
            "Good,\"[{\"\"low\"\":4,\"\"high\"\":5,\"\"pct\"\":100}]\"\n",
            "Bad,\"[{\"\"low\"\":4,\"\"pct\"\":100}]\"\n",
        ),
    );

    let records = load_records(&input).unwrap();
    let err = build_harmonized_table(&records, &BinSet::pyrolysis_default()).unwrap_err();

    assert!(matches!(err, ParseError::Malformed { ref record, .. } if record == "Bad"));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_records(&dir.path().join("nope.csv")).unwrap_err();
    assert!(format!("{:#}", err).contains("nope.csv"));
}

#[test]
fn test_missing_range_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.csv");
    fs::write(&path, "Paper,Ranges\nA,[]\n").unwrap();

    let err = load_records(&path).unwrap_err();
    assert!(format!("{:#}", err).contains(RANGES_COLUMN));
}

// =========================================================================
// Section 3: Custom bins
// =========================================================================

#[test]
fn test_custom_bin_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bins.json");
    fs::write(
        &config,
        r#"[{"low":5,"high":12,"label":"Gasoline"},{"low":13,"high":20,"label":"Diesel"}]"#,
    )
    .unwrap();
    let bins = BinSet::load(&config).unwrap();

    let input = write_input(
        dir.path(),
        "Wax,\"[{\"\"low\"\":11,\"\"high\"\":30,\"\"pct\"\":100}]\"\n",
    );
    let records = load_records(&input).unwrap();
    let table = build_harmonized_table(&records, &bins).unwrap();

    // [11, 30] clipped to [11, 20]: 2 units gasoline, 8 units diesel
    assert_eq!(table.bin_labels(), &["Gasoline".to_string(), "Diesel".to_string()]);
    assert_eq!(table.row_values(0), vec![20.0, 80.0]);
    assert_eq!(table.rows()[0].result.diagnostics.clipped_ranges, 1);
}
