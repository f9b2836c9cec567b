//! Summary statistics derived from finalized release series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzers::types::DayCount;
use crate::analyzers::utility::{extrema, mean};

/// Share of `part` in `total` as a percentage, undefined when `total` is zero.
pub fn pct(part: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some((part as f64 / total as f64) * 100.0)
    }
}

/// Percentage split between fast and slow releases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedShare {
    pub fast_pct: f64,
    pub slow_pct: f64,
}

impl SpeedShare {
    /// Returns `None` when there is nothing to divide by.
    pub fn from_counts(fast: usize, slow: usize) -> Option<Self> {
        let total = fast + slow;
        Some(SpeedShare {
            fast_pct: pct(fast, total)?,
            slow_pct: pct(slow, total)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extremum {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub total: usize,
    /// Mean over every day in the series, zero-count days included.
    pub mean: f64,
    pub max: Extremum,
    pub min: Extremum,
}

impl SummaryStatistics {
    /// Computes statistics over an ascending daily series. Returns `None`
    /// for an empty series.
    pub fn from_series(series: &[DayCount]) -> Option<Self> {
        let ((max_date, max_count), (min_date, min_count)) =
            extrema(series.iter().map(|day| (day.date, day.count)))?;

        let counts: Vec<f64> = series.iter().map(|day| day.count as f64).collect();

        Some(SummaryStatistics {
            total: series.iter().map(|day| day.count).sum(),
            mean: mean(&counts),
            max: Extremum {
                date: max_date,
                count: max_count,
            },
            min: Extremum {
                date: min_date,
                count: min_count,
            },
        })
    }
}
