//! Carbon-Number Bin Harmonization
//!
//! Converts paper-reported carbon-number distributions of pyrolysis oils into
//! a common set of standard bins so that papers can be compared directly.
//!
//! Layout:
//! - `bins`: fixed, validated bin configuration (C4–C5 … C21–C40)
//! - `allocator`: overlap-unit proportional allocation of ranges into bins
//! - `records`: record model and JSON range-encoding parser
//! - `harmonize`: record × bin table builder (sequential and Rayon)
//! - `data`: CSV input/output with Polars
//! - `plot`: grouped bar chart with plotters
//! - `utils`: tolerant normalization and rounding

pub mod utils;
pub mod bins;
pub mod allocator;
pub mod records;
pub mod harmonize;
pub mod data;
pub mod plot;

// Re-export commonly used types
pub use bins::{Bin, BinConfigError, BinSet};
pub use allocator::{
    allocate_to_bins, allocate_with_options, overlap_units, AllocationDiagnostics,
    AllocationOptions, AllocationResult, BinShare, ReportedRange,
};
pub use records::{parse_ranges, ParseError, RawRecord, Record};
pub use harmonize::{
    build_harmonized_table, build_harmonized_table_parallel,
    build_harmonized_table_parallel_with_options, build_harmonized_table_with_options,
    harmonize_records, HarmonizedRow,
    HarmonizedTable,
};
pub use data::{load_records, write_harmonized_csv};
pub use plot::{plot_grouped_bins, PlotError};
