//! Records and Range Encoding
//!
//! A record is one paper: an identifier plus the carbon-number ranges it
//! reports. Ranges arrive as a JSON array cell, e.g.
//!
//! ```text
//! [{"low":6,"high":11,"pct":50},{"low":12,"high":20,"pct":45}]
//! ```
//!
//! Any malformed cell is a hard error for the whole batch.

use crate::allocator::ReportedRange;
use serde::Deserialize;
use thiserror::Error;

/// Range encoding failures, each naming the offending record
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("record '{record}': missing range encoding")]
    MissingEncoding { record: String },

    #[error("record '{record}': malformed range encoding: {source}")]
    Malformed {
        record: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record '{record}': range {index} has an out-of-range bound (low={low}, high={high})")]
    InvalidBound {
        record: String,
        index: usize,
        low: f64,
        high: f64,
    },

    #[error("record '{record}': range {index} has invalid pct {pct}")]
    InvalidPercentage { record: String, index: usize, pct: f64 },
}

/// Record as read from the input table, encoding not yet parsed
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: String,
    pub encoding: Option<String>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self { id: id.into(), encoding: Some(encoding.into()) }
    }

    pub fn parse(&self) -> Result<Record, ParseError> {
        let encoding = self.encoding.as_deref().ok_or_else(|| ParseError::MissingEncoding {
            record: self.id.clone(),
        })?;

        Ok(Record {
            id: self.id.clone(),
            ranges: parse_ranges(&self.id, encoding)?,
        })
    }
}

/// Record with its ranges decoded
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub ranges: Vec<ReportedRange>,
}

/// Largest accepted carbon-number magnitude; keeps width arithmetic in range
pub const MAX_BOUND: f64 = i32::MAX as f64;

fn bound_ok(value: f64) -> bool {
    value.is_finite() && value.abs() <= MAX_BOUND
}

/// Wire shape of one range; extra keys are ignored
#[derive(Debug, Deserialize)]
struct RangeEntry {
    low: f64,
    high: f64,
    pct: f64,
}

/// Decode a JSON range array for `record`
///
/// Bounds are truncated toward zero to whole carbon numbers. `low > high` is
/// accepted here; the allocator skips such ranges.
pub fn parse_ranges(record: &str, encoding: &str) -> Result<Vec<ReportedRange>, ParseError> {
    if encoding.trim().is_empty() {
        return Err(ParseError::MissingEncoding { record: record.to_string() });
    }

    let entries: Vec<RangeEntry> =
        serde_json::from_str(encoding).map_err(|source| ParseError::Malformed {
            record: record.to_string(),
            source,
        })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if !bound_ok(entry.low) || !bound_ok(entry.high) {
                return Err(ParseError::InvalidBound {
                    record: record.to_string(),
                    index,
                    low: entry.low,
                    high: entry.high,
                });
            }
            if !entry.pct.is_finite() || entry.pct < 0.0 {
                return Err(ParseError::InvalidPercentage {
                    record: record.to_string(),
                    index,
                    pct: entry.pct,
                });
            }
            Ok(ReportedRange::new(entry.low.trunc() as i64, entry.high.trunc() as i64, entry.pct))
        })
        .collect()
}
