//! Standard Carbon-Number Bins
//!
//! The fixed, ordered set of harmonization targets. Bins are contiguous and
//! non-overlapping, so the set covers every carbon number from the first
//! bin's lower bound to the last bin's upper bound.
//!
//! Default bins: C4–C5, C6–C10, C11–C15, C16–C20, C21–C40

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default bins as (low, high, label)
const PYROLYSIS_BINS: [(i64, i64, &str); 5] = [
    (4, 5, "C4–C5"),
    (6, 10, "C6–C10"),
    (11, 15, "C11–C15"),
    (16, 20, "C16–C20"),
    (21, 40, "C21–C40"),
];

/// A labeled, inclusive carbon-number interval
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Bin {
    pub low: i64,
    pub high: i64,
    pub label: String,
}

impl Bin {
    pub fn new(low: i64, high: i64, label: impl Into<String>) -> Self {
        Self { low, high, label: label.into() }
    }

    /// Number of integer carbon numbers in the bin
    pub fn units(&self) -> i64 {
        self.high - self.low + 1
    }
}

/// Rejected bin configurations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BinConfigError {
    #[error("bin configuration is empty")]
    Empty,

    #[error("bin '{label}' has low {low} above high {high}")]
    InvertedBin { label: String, low: i64, high: i64 },

    #[error("bin '{label}' has an empty label")]
    EmptyLabel { label: String },

    #[error("bins '{previous}' and '{next}' are not contiguous (expected next low {expected}, found {found})")]
    NotContiguous {
        previous: String,
        next: String,
        expected: i64,
        found: i64,
    },

    #[error("duplicate bin label '{0}'")]
    DuplicateLabel(String),
}

/// Validated, immutable, ordered bin list
///
/// Built once at startup and passed explicitly to the allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinSet {
    bins: Vec<Bin>,
}

impl BinSet {
    /// Validate and wrap an ordered bin list
    pub fn new(bins: Vec<Bin>) -> std::result::Result<Self, BinConfigError> {
        if bins.is_empty() {
            return Err(BinConfigError::Empty);
        }

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for bin in &bins {
            if bin.label.trim().is_empty() {
                return Err(BinConfigError::EmptyLabel { label: bin.label.clone() });
            }
            if bin.low > bin.high {
                return Err(BinConfigError::InvertedBin {
                    label: bin.label.clone(),
                    low: bin.low,
                    high: bin.high,
                });
            }
            if !seen.insert(bin.label.as_str()) {
                return Err(BinConfigError::DuplicateLabel(bin.label.clone()));
            }
        }

        for pair in bins.windows(2) {
            let expected = pair[0].high + 1;
            if pair[1].low != expected {
                return Err(BinConfigError::NotContiguous {
                    previous: pair[0].label.clone(),
                    next: pair[1].label.clone(),
                    expected,
                    found: pair[1].low,
                });
            }
        }

        Ok(Self { bins })
    }

    /// The five standard pyrolysis-oil bins
    pub fn pyrolysis_default() -> Self {
        Self {
            bins: PYROLYSIS_BINS
                .iter()
                .map(|&(low, high, label)| Bin::new(low, high, label))
                .collect(),
        }
    }

    /// Load bins from a JSON array of `{"low", "high", "label"}` objects
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read bin configuration: {:?}", path))?;

        let bins: Vec<Bin> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse bin configuration JSON: {:?}", path))?;

        Self::new(bins).with_context(|| format!("Invalid bin configuration: {:?}", path))
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn labels(&self) -> Vec<String> {
        self.bins.iter().map(|b| b.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Lowest covered carbon number
    pub fn floor(&self) -> i64 {
        self.bins[0].low
    }

    /// Highest covered carbon number (ranges are clipped here)
    pub fn ceiling(&self) -> i64 {
        self.bins[self.bins.len() - 1].high
    }
}

impl Default for BinSet {
    fn default() -> Self {
        Self::pyrolysis_default()
    }
}
