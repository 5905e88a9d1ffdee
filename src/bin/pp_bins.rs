//! PP pyrolysis oil: harmonize reported carbon-number ranges into standard
//! bins, write the table as CSV and render a grouped bar chart.
//!
//! Usage:
//!   cargo run --bin pp_bins -- --input pp_bins_input.csv \
//!       --out-png grouped_bins.png --out-csv harmonized_bins.csv
//!
//! Environment:
//!   PP_BINS_CONFIG  optional JSON bin configuration (default: C4–C5 … C21–C40)
//!   RUST_LOG        log filter

use anyhow::{Context, Result};
use carbon_bins_rust::{build_harmonized_table, load_records, plot_grouped_bins, write_harmonized_csv, BinSet};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pp_bins", about = "Grouped bar chart of pyrolysis oil composition by standard carbon-number bins")]
struct Args {
    /// Input CSV with columns [Paper, ReportedRangesJSON]
    #[arg(long)]
    input: PathBuf,

    /// Output PNG path
    #[arg(long, alias = "out_png", default_value = "pp_bins_grouped.png")]
    out_png: PathBuf,

    /// Output harmonized CSV path
    #[arg(long, alias = "out_csv", default_value = "pp_bins_harmonized.csv")]
    out_csv: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carbon_bins_rust=info,pp_bins=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    // Bin configuration from the environment; defaults to the standard bins
    let bins = match std::env::var_os("PP_BINS_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            tracing::info!("Loading bin configuration: {:?}", path);
            BinSet::load(&path)?
        }
        None => BinSet::pyrolysis_default(),
    };
    tracing::info!("Bins: {}", bins.labels().join(", "));

    let records = load_records(&args.input)?;
    let table = build_harmonized_table(&records, &bins)
        .with_context(|| format!("Failed to harmonize {:?}", args.input))?;

    write_harmonized_csv(&table, &args.out_csv)?;
    println!("Saved harmonized table: {}", args.out_csv.display());

    plot_grouped_bins(&table, &args.out_png)
        .with_context(|| format!("Failed to render chart {:?}", args.out_png))?;
    println!("Saved figure: {}", args.out_png.display());

    Ok(())
}
