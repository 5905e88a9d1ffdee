//! Bin Allocator
//!
//! Redistributes paper-reported carbon-number ranges into the standard bins
//! by overlap-unit proportion: a range's percentage is split across bins in
//! proportion to how many integer carbon numbers each bin shares with it.
//!
//! Algorithm:
//! 1. Clip each range's high bound to the ceiling (last bin's high)
//! 2. Skip ranges left with low > high
//! 3. Add `pct × overlap_units / width` to every overlapping bin
//! 4. Rescale the row to 100 when its total is within the tolerance band
//! 5. Round to a fixed precision
//!
//! Units above the ceiling are cut off before the width is taken. Units below
//! the floor still count towards the width, so their share is discarded.

use crate::bins::{Bin, BinSet};
use crate::utils::{round_to, tolerant_rescale, DEFAULT_TARGET, DEFAULT_TOLERANCE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One reported share: `pct`% of material lies in carbon numbers [low, high]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportedRange {
    pub low: i64,
    pub high: i64,
    pub pct: f64,
}

impl ReportedRange {
    pub fn new(low: i64, high: i64, pct: f64) -> Self {
        Self { low, high, pct }
    }
}

/// Allocation tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationOptions {
    /// Closed band in which a row total is rescaled to `target`
    pub tolerance: (f64, f64),
    pub target: f64,
    /// Decimal digits kept in the output
    pub precision: u32,
}

impl Default for AllocationOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            target: DEFAULT_TARGET,
            precision: 3,
        }
    }
}

/// Allocated share of a single bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinShare {
    pub label: String,
    pub pct: f64,
}

/// What happened to the input while allocating one record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllocationDiagnostics {
    /// Ranges dropped entirely (low > high after clipping)
    pub skipped_ranges: usize,
    /// Ranges whose high bound was cut at the ceiling; their units above it
    /// no longer count towards the width
    pub clipped_ranges: usize,
    /// Input percentage that landed in no bin (skipped ranges, units below the floor)
    pub discarded_pct: f64,
    /// Sum of bin values before normalization and rounding
    pub raw_total: f64,
    /// Whether the tolerant rescale was applied
    pub normalized: bool,
}

impl AllocationDiagnostics {
    /// True when any range was clipped, dropped or partly unplaced
    pub fn has_losses(&self) -> bool {
        self.skipped_ranges > 0 || self.clipped_ranges > 0 || self.discarded_pct > 0.0
    }
}

/// Per-bin allocation for one record, in configured bin order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationResult {
    pub shares: Vec<BinShare>,
    pub diagnostics: AllocationDiagnostics,
}

impl AllocationResult {
    /// Share allocated to the bin with this label
    pub fn get(&self, label: &str) -> Option<f64> {
        self.shares.iter().find(|s| s.label == label).map(|s| s.pct)
    }

    /// Values in bin order
    pub fn values(&self) -> Vec<f64> {
        self.shares.iter().map(|s| s.pct).collect()
    }

    /// Sum of the (rounded) output values
    pub fn total(&self) -> f64 {
        self.shares.iter().map(|s| s.pct).sum()
    }
}

/// Count of integer carbon numbers shared by [low, high] and the bin
pub fn overlap_units(low: i64, high: i64, bin: &Bin) -> i64 {
    let overlap_low = low.max(bin.low);
    let overlap_high = high.min(bin.high);
    if overlap_low <= overlap_high {
        overlap_high - overlap_low + 1
    } else {
        0
    }
}

/// Allocate ranges into bins with the default options
pub fn allocate_to_bins(ranges: &[ReportedRange], bins: &BinSet) -> AllocationResult {
    allocate_with_options(ranges, bins, &AllocationOptions::default())
}

/// Allocate ranges into bins by overlap-unit proportion
pub fn allocate_with_options(
    ranges: &[ReportedRange],
    bins: &BinSet,
    options: &AllocationOptions,
) -> AllocationResult {
    let mut acc = vec![0.0_f64; bins.len()];
    let mut diagnostics = AllocationDiagnostics::default();
    let max_high = bins.ceiling();

    for (idx, range) in ranges.iter().enumerate() {
        let a = range.low;
        let mut b = range.high;

        if b > max_high {
            debug!(range = idx, low = a, high = b, ceiling = max_high, "clipping range at ceiling");
            b = max_high;
            diagnostics.clipped_ranges += 1;
        }

        if a > b {
            debug!(range = idx, low = a, high = b, pct = range.pct, "skipping empty range");
            diagnostics.skipped_ranges += 1;
            diagnostics.discarded_pct += range.pct;
            continue;
        }

        let width = match b.checked_sub(a).and_then(|w| w.checked_add(1)) {
            Some(width) if width > 0 => width,
            _ => {
                debug!(range = idx, low = a, high = b, pct = range.pct, "skipping range with unrepresentable width");
                diagnostics.skipped_ranges += 1;
                diagnostics.discarded_pct += range.pct;
                continue;
            }
        };

        let mut placed_units = 0;
        for (slot, bin) in acc.iter_mut().zip(bins.bins()) {
            let units = overlap_units(a, b, bin);
            if units > 0 {
                *slot += range.pct * (units as f64 / width as f64);
                placed_units += units;
            }
        }

        // Units below the floor
        if placed_units < width {
            diagnostics.discarded_pct += range.pct * ((width - placed_units) as f64 / width as f64);
        }
    }

    diagnostics.raw_total = acc.iter().sum();
    diagnostics.normalized = tolerant_rescale(&mut acc, options.tolerance, options.target);

    let shares = bins
        .bins()
        .iter()
        .zip(acc)
        .map(|(bin, pct)| BinShare {
            label: bin.label.clone(),
            pct: round_to(pct, options.precision),
        })
        .collect();

    AllocationResult { shares, diagnostics }
}
