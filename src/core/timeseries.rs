use crate::models::{DataPoint, Series};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

/// Sorted, de-duplicated timestamps of a series.
pub fn distinct_timestamps(series: &Series) -> Vec<DateTime<Utc>> {
    series
        .points
        .iter()
        .map(|dp| dp.timestamp)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `periods` timestamps spaced one week apart, starting one week after `last`.
///
/// `None` if any step falls outside the representable date range.
pub fn weekly_after(last: DateTime<Utc>, periods: usize) -> Option<Vec<DateTime<Utc>>> {
    (1..=periods as i64)
        .map(|i| last.checked_add_signed(Duration::weeks(i)))
        .collect()
}

/// Index to predict over: every historical timestamp, then `periods` future weeks.
///
/// Returns an empty index for an empty series, `None` on date overflow.
pub fn make_future_index(series: &Series, periods: usize) -> Option<Vec<DateTime<Utc>>> {
    let mut index = distinct_timestamps(series);
    if let Some(&last) = index.last() {
        index.extend(weekly_after(last, periods)?);
    }
    Some(index)
}

/// Elapsed days from `origin`, fractional for intra-day timestamps
pub fn days_since(origin: DateTime<Utc>, ts: DateTime<Utc>) -> f64 {
    (ts - origin).num_seconds() as f64 / 86_400.0
}

/// Tiny unicode sparkline for terminal display
pub fn sparkline(points: &[DataPoint]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    points
        .iter()
        .map(|p| {
            if range <= 0.0 {
                BARS[3]
            } else {
                let idx = ((p.value - min) / range * (BARS.len() - 1) as f64).round() as usize;
                BARS[idx.min(BARS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(date: &str) -> DateTime<Utc> {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn series(dates: &[&str]) -> Series {
        Series::new(dates.iter().enumerate().map(|(i, d)| DataPoint { timestamp: ts(d), value: i as f64 }).collect())
    }

    #[test]
    fn test_distinct_timestamps_sorts_and_dedups() {
        let s = series(&["2024-01-14", "2024-01-07", "2024-01-14"]);
        assert_eq!(distinct_timestamps(&s), vec![ts("2024-01-07"), ts("2024-01-14")]);
    }

    #[test]
    fn test_future_index_is_weekly() {
        let s = series(&["2024-01-01", "2024-01-03"]);
        let index = make_future_index(&s, 3).unwrap();

        assert_eq!(
            index,
            vec![ts("2024-01-01"), ts("2024-01-03"), ts("2024-01-10"), ts("2024-01-17"), ts("2024-01-24")]
        );
    }

    #[test]
    fn test_future_index_empty_series() {
        assert_eq!(make_future_index(&Series::default(), 4), Some(Vec::new()));
    }

    #[test]
    fn test_weekly_after_overflow() {
        let near_max = DateTime::<Utc>::MAX_UTC - Duration::days(10);
        assert_eq!(weekly_after(near_max, 1).map(|v| v.len()), Some(1));
        assert_eq!(weekly_after(near_max, 2), None);
    }

    #[test]
    fn test_days_since() {
        assert_eq!(days_since(ts("2024-01-01"), ts("2024-01-08")), 7.0);
    }

    #[test]
    fn test_sparkline() {
        let s = series(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(sparkline(&s.points), "▁▅█");
        assert_eq!(sparkline(&[]), "");
    }
}
