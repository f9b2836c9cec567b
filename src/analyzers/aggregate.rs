use chrono::NaiveDate;
use tracing::debug;

use crate::analyzers::calendar::{
    business_days, is_business_day, iso_week_bounds, reindex, week_range_label,
};
use crate::analyzers::types::{
    Bucket, DailyReport, DayCount, FastSlowReport, IsoWeekKey, ReleaseSpeed, ReportOutcome,
    WeekCount, WeeklyReport,
};
use crate::stats::{SpeedShare, SummaryStatistics};

/// Builds the fast/slow mix. Short-circuits to `Empty` when there are no
/// releases, so percentages are never divided by zero.
pub fn aggregate_fast_slow(bucket: &Bucket<ReleaseSpeed>) -> ReportOutcome<FastSlowReport> {
    let fast = bucket.count(&ReleaseSpeed::Fast);
    let slow = bucket.count(&ReleaseSpeed::Slow);

    match SpeedShare::from_counts(fast, slow) {
        Some(share) => ReportOutcome::Ready(FastSlowReport {
            fast,
            slow,
            total: fast + slow,
            share,
        }),
        None => ReportOutcome::Empty,
    }
}

/// Reindexes daily counts over every business day between the first and
/// last observed release and computes summary statistics over that domain.
pub fn aggregate_daily(bucket: &Bucket<NaiveDate>) -> ReportOutcome<DailyReport> {
    let (Some(&first), Some(&last)) = (bucket.first_key(), bucket.last_key()) else {
        return ReportOutcome::Empty;
    };

    let domain = business_days(first, last);
    let series: Vec<DayCount> = reindex(bucket, &domain)
        .into_iter()
        .map(|(date, count)| DayCount { date, count })
        .collect();

    let weekend_releases: usize = bucket
        .iter()
        .filter(|(date, _)| !is_business_day(**date))
        .map(|(_, count)| count)
        .sum();

    if weekend_releases > 0 {
        debug!(weekend_releases, "Weekend releases left out of business-day series");
    }

    // A range made only of weekend days has no business days to report.
    let Some(stats) = SummaryStatistics::from_series(&series) else {
        return ReportOutcome::Empty;
    };

    debug!(
        days = series.len(),
        total = stats.total,
        mean = stats.mean,
        "Daily series reindexed"
    );

    ReportOutcome::Ready(DailyReport {
        series,
        stats,
        weekend_releases,
    })
}

/// Lists observed ISO weeks in ascending order. Weeks without releases are
/// not synthesized.
pub fn aggregate_weekly(bucket: &Bucket<IsoWeekKey>) -> ReportOutcome<WeeklyReport> {
    if bucket.is_empty() {
        return ReportOutcome::Empty;
    }

    let series: Vec<WeekCount> = bucket
        .iter()
        .map(|(&key, count)| {
            let bounds = iso_week_bounds(key);
            WeekCount {
                year: key.year,
                week: key.week,
                start: bounds.map(|(start, _)| start),
                end: bounds.map(|(_, end)| end),
                label: bounds
                    .map(|(start, end)| week_range_label(start, end))
                    .unwrap_or_else(|| key.to_string()),
                count,
            }
        })
        .collect();

    ReportOutcome::Ready(WeeklyReport {
        total: bucket.total(),
        series,
    })
}
