//! Data types used by the release aggregation pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::TimestampError;
use crate::stats::{SpeedShare, SummaryStatistics};

/// A single row deserialized from an exported pull-request CSV.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "Release Type")]
    pub release_type: String,
    #[serde(rename = "Merged At")]
    pub merged_at: String,
    /// 1-based line in the source file, filled in by the parser.
    #[serde(skip)]
    pub line: u64,
}

impl RawRecord {
    pub fn new(branch: &str, release_type: &str, merged_at: &str) -> Self {
        Self {
            branch: branch.to_string(),
            release_type: release_type.to_string(),
            merged_at: merged_at.to_string(),
            line: 0,
        }
    }

    pub fn at_line(mut self, line: u64) -> Self {
        self.line = line;
        self
    }
}

/// A production record after branch canonicalization.
///
/// `timestamp` carries the parse result of `merged_at`; an `Err` marks the
/// record as unusable for the calendar reports but not for fast/slow.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub branch: String,
    pub release_type: String,
    pub merged_at: String,
    pub timestamp: Result<NaiveDateTime, TimestampError>,
    pub line: u64,
}

impl NormalizedRecord {
    pub fn has_valid_timestamp(&self) -> bool {
        self.timestamp.is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseSpeed {
    Fast,
    Slow,
}

impl ReleaseSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseSpeed::Fast => "fast",
            ReleaseSpeed::Slow => "slow",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReleaseSpeed::Fast => "Fast Releases",
            ReleaseSpeed::Slow => "Slow Releases",
        }
    }
}

/// ISO-8601 week key. Ordering is by `(year, week)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IsoWeekKey {
    pub year: i32,
    pub week: u32,
}

impl fmt::Display for IsoWeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Ordered key → count accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket<K: Ord> {
    counts: BTreeMap<K, usize>,
}

impl<K: Ord> Default for Bucket<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K: Ord> Bucket<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn count(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn first_key(&self) -> Option<&K> {
        self.counts.keys().next()
    }

    pub fn last_key(&self) -> Option<&K> {
        self.counts.keys().next_back()
    }

    /// Iterates keys in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> + '_ {
        self.counts.iter().map(|(k, &v)| (k, v))
    }
}

impl<K: Ord> FromIterator<K> for Bucket<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut bucket = Bucket::new();
        for key in iter {
            bucket.add(key);
        }
        bucket
    }
}

/// A row-level problem that was skipped rather than aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: u64,
    pub value: String,
    pub reason: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    FastSlow,
    Daily,
    Weekly,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::FastSlow, ReportKind::Daily, ReportKind::Weekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::FastSlow => "fast_slow",
            ReportKind::Daily => "daily",
            ReportKind::Weekly => "weekly",
        }
    }

    /// Folder under the output directory that holds this report's artifacts.
    pub fn folder(&self) -> &'static str {
        match self {
            ReportKind::FastSlow => "pie_chart",
            ReportKind::Daily => "daily_report",
            ReportKind::Weekly => "weekly_report",
        }
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            ReportKind::FastSlow => "pie_chart_fast_slow",
            ReportKind::Daily => "releases_per_day",
            ReportKind::Weekly => "releases_per_week",
        }
    }

    pub fn labels(&self) -> ChartLabels {
        match self {
            ReportKind::FastSlow => ChartLabels {
                title: "Fast vs Slow Prod Releases",
                x_axis: None,
                y_axis: None,
                legend_title: Some("Release Types"),
            },
            ReportKind::Daily => ChartLabels {
                title: "Number of Prod Releases Per Day",
                x_axis: Some("Release Date"),
                y_axis: Some("Number of Prod Releases"),
                legend_title: None,
            },
            ReportKind::Weekly => ChartLabels {
                title: "Number of Prod Releases Per Week",
                x_axis: Some("Date Range"),
                y_axis: Some("Number of Prod Releases"),
                legend_title: None,
            },
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text the renderer places around the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartLabels {
    pub title: &'static str,
    pub x_axis: Option<&'static str>,
    pub y_axis: Option<&'static str>,
    pub legend_title: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FastSlowReport {
    pub fast: usize,
    pub slow: usize,
    pub total: usize,
    pub share: SpeedShare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    /// One entry per business day between the first and last release.
    pub series: Vec<DayCount>,
    pub stats: SummaryStatistics,
    /// Releases observed on Saturday or Sunday, which the business-day
    /// series leaves out.
    pub weekend_releases: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekCount {
    pub year: i32,
    pub week: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReport {
    /// Observed weeks only, ascending by `(year, week)`.
    pub series: Vec<WeekCount>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    FastSlow(FastSlowReport),
    Daily(DailyReport),
    Weekly(WeeklyReport),
}

impl Report {
    /// Flattens the report into ordered `(key, label, count)` rows.
    pub fn series_rows(&self) -> Vec<SeriesRow> {
        match self {
            Report::FastSlow(r) => [(ReleaseSpeed::Fast, r.fast), (ReleaseSpeed::Slow, r.slow)]
                .into_iter()
                .map(|(speed, count)| SeriesRow {
                    key: speed.as_str().to_string(),
                    label: speed.label().to_string(),
                    count,
                })
                .collect(),
            Report::Daily(r) => r
                .series
                .iter()
                .map(|day| {
                    let key = day.date.format("%Y-%m-%d").to_string();
                    SeriesRow {
                        label: key.clone(),
                        key,
                        count: day.count,
                    }
                })
                .collect(),
            Report::Weekly(r) => r
                .series
                .iter()
                .map(|week| SeriesRow {
                    key: IsoWeekKey {
                        year: week.year,
                        week: week.week,
                    }
                    .to_string(),
                    label: week.label.clone(),
                    count: week.count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesRow {
    pub key: String,
    pub label: String,
    pub count: usize,
}

/// Result of aggregating one report. `Empty` is the "no data" terminal
/// state: nothing is handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome<T> {
    Ready(T),
    Empty,
}

impl<T> ReportOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReportOutcome<U> {
        match self {
            ReportOutcome::Ready(value) => ReportOutcome::Ready(f(value)),
            ReportOutcome::Empty => ReportOutcome::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ReportOutcome::Empty)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            ReportOutcome::Ready(value) => Some(value),
            ReportOutcome::Empty => None,
        }
    }
}

/// Everything the rendering layer receives for one report.
///
/// Contains no wall-clock data so identical input yields identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportArtifact {
    pub schema_version: u8,
    pub algorithm_version: u8,
    pub kind: ReportKind,
    pub labels: ChartLabels,
    pub report: Report,
    pub diagnostics: Vec<Diagnostic>,
}
