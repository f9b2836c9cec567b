//! Calendar conventions shared by the daily and weekly reports.
//!
//! The daily report spans business days (Monday to Friday, no holiday
//! calendar). The weekly report groups by ISO-8601 week, and its date-range
//! labels are derived from that same ISO rule.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::analyzers::types::{Bucket, IsoWeekKey};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every business day in `[start, end]`, ascending. Empty if `start > end`.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_business_day(*day))
        .collect()
}

pub fn iso_week_of(date: NaiveDate) -> IsoWeekKey {
    let week = date.iso_week();
    IsoWeekKey {
        year: week.year(),
        week: week.week(),
    }
}

/// Monday and Sunday of an ISO week, or `None` if the week does not exist
/// in that year.
pub fn iso_week_bounds(key: IsoWeekKey) -> Option<(NaiveDate, NaiveDate)> {
    let monday = NaiveDate::from_isoywd_opt(key.year, key.week, Weekday::Mon)?;
    let sunday = monday.checked_add_days(Days::new(6))?;
    Some((monday, sunday))
}

/// Formats an inclusive range as month and day only, e.g. `Oct 14 to Oct 20`.
pub fn week_range_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} to {}", start.format("%b %d"), end.format("%b %d"))
}

/// Expands `bucket` over `domain`, filling keys it never saw with zero.
///
/// Keys in the bucket that are not part of the domain are dropped.
pub fn reindex<K: Ord + Copy>(bucket: &Bucket<K>, domain: &[K]) -> Vec<(K, usize)> {
    domain.iter().map(|key| (*key, bucket.count(key))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_business_days_skip_weekend() {
        // Fri 18 .. Tue 22 October 2024
        let days = business_days(date(2024, 10, 18), date(2024, 10, 22));
        assert_eq!(
            days,
            vec![date(2024, 10, 18), date(2024, 10, 21), date(2024, 10, 22)]
        );
    }

    #[test]
    fn test_business_days_inclusive_bounds() {
        let days = business_days(date(2024, 10, 14), date(2024, 10, 17));
        assert_eq!(days.len(), 4);
        assert_eq!(days.first(), Some(&date(2024, 10, 14)));
        assert_eq!(days.last(), Some(&date(2024, 10, 17)));
    }

    #[test]
    fn test_business_days_weekend_only_range_is_empty() {
        assert!(business_days(date(2024, 10, 19), date(2024, 10, 20)).is_empty());
    }

    #[test]
    fn test_business_days_reversed_range_is_empty() {
        assert!(business_days(date(2024, 10, 17), date(2024, 10, 14)).is_empty());
    }

    #[test]
    fn test_iso_week_year_boundaries() {
        // Friday 1 Jan 2021 still belongs to the last ISO week of 2020.
        assert_eq!(
            iso_week_of(date(2021, 1, 1)),
            IsoWeekKey { year: 2020, week: 53 }
        );
        // Monday 30 Dec 2024 starts ISO week 1 of 2025.
        assert_eq!(
            iso_week_of(date(2024, 12, 30)),
            IsoWeekKey { year: 2025, week: 1 }
        );
        assert_eq!(
            iso_week_of(date(2024, 10, 14)),
            IsoWeekKey { year: 2024, week: 42 }
        );
    }

    #[test]
    fn test_iso_week_bounds_follow_iso_rule() {
        let (monday, sunday) = iso_week_bounds(IsoWeekKey { year: 2024, week: 42 }).unwrap();
        assert_eq!(monday, date(2024, 10, 14));
        assert_eq!(sunday, date(2024, 10, 20));

        // 1 Jan 2020 is a Wednesday, so week 1 starts in the previous year.
        let (monday, _) = iso_week_bounds(IsoWeekKey { year: 2020, week: 1 }).unwrap();
        assert_eq!(monday, date(2019, 12, 30));
    }

    #[test]
    fn test_iso_week_bounds_round_trip_with_grouping() {
        for day in date(2019, 12, 20).iter_days().take(800) {
            let key = iso_week_of(day);
            let (monday, sunday) = iso_week_bounds(key).unwrap();
            assert!(monday <= day && day <= sunday, "{day} not in {key}");
        }
    }

    #[test]
    fn test_iso_week_bounds_rejects_missing_week() {
        // 2024 has 52 ISO weeks.
        assert_eq!(iso_week_bounds(IsoWeekKey { year: 2024, week: 53 }), None);
    }

    #[test]
    fn test_week_range_label() {
        assert_eq!(
            week_range_label(date(2024, 10, 14), date(2024, 10, 20)),
            "Oct 14 to Oct 20"
        );
        assert_eq!(
            week_range_label(date(2019, 12, 30), date(2020, 1, 5)),
            "Dec 30 to Jan 05"
        );
    }

    #[test]
    fn test_reindex_fills_gaps() {
        let bucket: Bucket<NaiveDate> = [
            date(2024, 10, 14),
            date(2024, 10, 14),
            date(2024, 10, 14),
            date(2024, 10, 17),
            date(2024, 10, 17),
        ]
        .into_iter()
        .collect();
        let domain = business_days(date(2024, 10, 14), date(2024, 10, 17));

        let counts: Vec<usize> = reindex(&bucket, &domain).into_iter().map(|(_, c)| c).collect();
        assert_eq!(counts, vec![3, 0, 0, 2]);
    }
}
