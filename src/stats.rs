use crate::structs::Summary;
use chrono::{Datelike, NaiveDate};

/// Computes descriptive statistics over a series that may contain gaps.
///
/// Absent entries (and NaN) are filtered out before any calculation, so a gap
/// never drags the mean towards zero or poses as the minimum.
///
/// # Arguments
///
/// * `values` - Daily or monthly values, `None` where the upstream had no data
///
/// # Returns
///
/// Returns a `Summary` with:
/// - **mean/min/max**: `None` when no value is present
/// - **total**: sum of present values, `0.0` for an empty or all-absent series
/// - **present_count**: number of values that took part
pub fn summarize(values: &[Option<f64>]) -> Summary {
    let present: Vec<f64> = present_values(values).collect();
    if present.is_empty() {
        return Summary {
            mean: None,
            min: None,
            max: None,
            total: 0.0,
            present_count: 0,
        };
    }

    let total = present.iter().sum::<f64>();
    let min = present.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = present.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

    Summary {
        mean: Some(total / present.len() as f64),
        min: Some(min),
        max: Some(max),
        total,
        present_count: present.len(),
    }
}

/// Summarizes the values recorded on a given day of the month across every
/// month in the series (e.g. every 15th).
///
/// `dates` and `values` are parallel; extra entries on either side are ignored.
pub fn day_of_month_summary(dates: &[NaiveDate], values: &[Option<f64>], day: u32) -> Summary {
    let matching: Vec<Option<f64>> = dates
        .iter()
        .zip(values)
        .filter(|(date, _)| date.day() == day)
        .map(|(_, value)| *value)
        .collect();
    summarize(&matching)
}

/// Mean of the present values, `None` when there are none.
pub(crate) fn mean_of(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn present_values(values: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    values.iter().flatten().copied().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_has_zero_total_and_no_extremes() {
        let summary = summarize(&[]);
        assert_eq!(
            summary,
            Summary {
                mean: None,
                min: None,
                max: None,
                total: 0.0,
                present_count: 0,
            }
        );
    }

    #[test]
    fn all_absent_series_behaves_like_empty() {
        let summary = summarize(&[None, None, Some(f64::NAN)]);
        assert_eq!(summary, summarize(&[]));
    }

    #[test]
    fn absent_values_are_skipped() {
        let summary = summarize(&[Some(5.0), None, Some(15.0)]);
        assert_eq!(summary.mean, Some(10.0));
        assert_eq!(summary.min, Some(5.0));
        assert_eq!(summary.max, Some(15.0));
        assert_eq!(summary.total, 20.0);
        assert_eq!(summary.present_count, 2);
    }

    #[test]
    fn zero_is_a_real_value() {
        let summary = summarize(&[Some(0.0), Some(-4.0)]);
        assert_eq!(summary.max, Some(0.0));
        assert_eq!(summary.min, Some(-4.0));
        assert_eq!(summary.mean, Some(-2.0));
    }

    #[test]
    fn summarize_is_idempotent() {
        let values = [Some(1.5), None, Some(2.5), Some(-3.0)];
        assert_eq!(summarize(&values), summarize(&values));
    }

    #[test]
    fn day_of_month_picks_matching_days() {
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        ];
        let values = [Some(10.0), Some(99.0), Some(20.0), None];
        let summary = day_of_month_summary(&dates, &values, 15);
        assert_eq!(summary.present_count, 2);
        assert_eq!(summary.mean, Some(15.0));
        assert_eq!(summary.max, Some(20.0));
    }

    #[test]
    fn mean_of_ignores_gaps() {
        assert_eq!(mean_of([Some(2.0), None, Some(4.0)]), Some(3.0));
        assert_eq!(mean_of([None, None]), None);
    }
}
