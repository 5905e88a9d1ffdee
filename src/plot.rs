//! Grouped bar chart of the harmonized table
//!
//! Bins run along the X axis; within each bin every record gets one bar, so
//! papers can be compared side by side. Rendered with the [`plotters`]
//! bitmap backend to PNG at 2200x1100 (11x5.5 in at 200 dpi).

use crate::harmonize::HarmonizedTable;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Share of each bin slot taken by its group of bars
pub const GROUP_WIDTH: f64 = 0.85;

const CHART_SIZE: (u32, u32) = (2200, 1100);
const TITLE: &str = "PP Pyrolysis Oil – Grouped Bar by Standard Bins";

/// Horizontal extent of bar `series_index` in bin `bin_index`
///
/// Bins sit at integer positions; the group is centred on the bin.
pub fn bar_span(bin_index: usize, series_index: usize, n_series: usize) -> (f64, f64) {
    let bar_width = GROUP_WIDTH / n_series as f64;
    let left = bin_index as f64 - GROUP_WIDTH / 2.0 + series_index as f64 * bar_width;
    (left, left + bar_width)
}

/// Y axis upper bound: 10% headroom over the tallest bar
fn y_max(table: &HarmonizedTable) -> f64 {
    let tallest = table
        .rows()
        .iter()
        .flat_map(|r| r.result.shares.iter().map(|s| s.pct))
        .fold(0.0_f64, f64::max);
    (tallest * 1.1).max(1.0)
}

/// Render the grouped bar chart and save it as PNG
pub fn plot_grouped_bins(table: &HarmonizedTable, output_path: &Path) -> Result<()> {
    render(table, output_path, true)
}

/// Draw the chart; `with_text` adds caption, axis labels and legend
fn render(table: &HarmonizedTable, output_path: &Path, with_text: bool) -> Result<()> {
    if table.is_empty() {
        return Err(PlotError::InvalidData("no records to plot".to_string()));
    }
    if table.bin_labels().is_empty() {
        return Err(PlotError::InvalidData("no bins to plot".to_string()));
    }

    let labels = table.bin_labels().to_vec();
    let n_bins = labels.len();
    let n_series = table.len();

    let root = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(30);
    if with_text {
        builder
            .caption(TITLE, ("sans-serif", 48))
            .x_label_area_size(90)
            .y_label_area_size(110);
    }
    let mut chart = builder
        .build_cartesian_2d(-0.5..(n_bins as f64 - 0.5), 0.0..y_max(table))
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    // Only integer positions carry a bin label
    let x_formatter = |x: &f64| {
        let nearest = x.round();
        if (x - nearest).abs() < 1e-6 && nearest >= 0.0 && (nearest as usize) < labels.len() {
            labels[nearest as usize].clone()
        } else {
            String::new()
        }
    };

    if with_text {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n_bins)
            .x_label_formatter(&x_formatter)
            .x_desc("Carbon-number bins")
            .y_desc("Share (%)")
            .light_line_style(BLACK.mix(0.08))
            .label_style(("sans-serif", 28))
            .axis_desc_style(("sans-serif", 34))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    for (series_index, row) in table.rows().iter().enumerate() {
        let color = Palette99::pick(series_index).to_rgba();
        let values = table.row_values(series_index);

        chart
            .draw_series(values.into_iter().enumerate().map(|(bin_index, value)| {
                let (left, right) = bar_span(bin_index, series_index, n_series);
                Rectangle::new([(left, 0.0), (right, value)], color.filled())
            }))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(row.id.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 8), (x + 16, y + 8)], color.filled()));
    }

    if with_text {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.3))
            .label_font(("sans-serif", 22))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    debug!(path = ?output_path, bins = n_bins, series = n_series, "rendered grouped bar chart");
    Ok(())
}
