use crate::extremes::is_monthly_extreme_day;
use crate::stats::mean_of;
use crate::structs::{DailyRecord, MonthKey, MonthlyAggregate};
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::HashMap;

/// Groups a daily weather series into calendar months.
///
/// Records are bucketed by the (year, month) of their date. Each month then
/// gets the mean of every field computed independently over the days where
/// that field is present, the number of days tripping the monthly extreme
/// thresholds, and the number of days in the bucket.
///
/// # Arguments
///
/// * `records` - Daily records in any order; dates are expected to be unique
///
/// # Returns
///
/// One `MonthlyAggregate` per distinct month, ascending by year then month.
/// An empty input yields an empty vector.
///
/// # Missing data
///
/// A month without a single temperature reading has `mean_temperature: None`,
/// not `Some(0.0)`. The same holds for precipitation and wind speed.
pub fn aggregate(records: &[DailyRecord]) -> Vec<MonthlyAggregate> {
    let mut monthly_data: HashMap<MonthKey, Vec<&DailyRecord>> = HashMap::new();
    for record in records {
        monthly_data
            .entry(month_key(&record.date))
            .or_default()
            .push(record);
    }
    debug!(
        "Grouped {} daily records into {} months",
        records.len(),
        monthly_data.len()
    );

    let mut results: Vec<MonthlyAggregate> = monthly_data
        .into_iter()
        .map(|(key, days)| analyze_month(key, &days))
        .collect();

    results.sort_by(|a, b| a.month.cmp(&b.month));
    results
}

pub fn month_key(date: &NaiveDate) -> MonthKey {
    MonthKey {
        year: date.year(),
        month: date.month(),
    }
}

/// Formats a month as a fixed English abbreviation plus two-digit year, e.g. "Sep 24".
///
/// chrono's `%b` is not locale-aware, so the result is the same everywhere.
pub fn month_label(key: MonthKey) -> String {
    match NaiveDate::from_ymd_opt(key.year, key.month, 1) {
        Some(first) => first.format("%b %y").to_string(),
        None => format!("{:02}/{:02}", key.month, key.year.rem_euclid(100)),
    }
}

fn analyze_month(key: MonthKey, days: &[&DailyRecord]) -> MonthlyAggregate {
    let extreme_days = days.iter().filter(|r| is_monthly_extreme_day(r)).count();

    MonthlyAggregate {
        month: key,
        label: month_label(key),
        mean_temperature: mean_of(days.iter().map(|r| r.temperature)),
        mean_precipitation: mean_of(days.iter().map(|r| r.precipitation)),
        mean_wind_speed: mean_of(days.iter().map(|r| r.wind_speed)),
        extreme_event_count: extreme_days as u32,
        sample_day_count: days.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32, t: Option<f64>, p: Option<f64>, w: Option<f64>) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), t, p, w)
    }

    #[test]
    fn empty_input_yields_no_months() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn two_january_days_form_one_month() {
        let records = vec![
            day(2024, 1, 1, Some(36.0), Some(0.0), Some(5.0)),
            day(2024, 1, 15, Some(-2.0), Some(30.0), Some(25.0)),
        ];
        let months = aggregate(&records);

        assert_eq!(months.len(), 1);
        let january = &months[0];
        assert_eq!(january.month, MonthKey { year: 2024, month: 1 });
        assert_eq!(january.label, "Jan 24");
        assert_eq!(january.mean_temperature, Some(17.0));
        assert_eq!(january.mean_precipitation, Some(15.0));
        assert_eq!(january.mean_wind_speed, Some(15.0));
        assert_eq!(january.extreme_event_count, 2);
        assert_eq!(january.sample_day_count, 2);
    }

    #[test]
    fn months_are_chronological_across_years() {
        let records = vec![
            day(2025, 2, 3, Some(1.0), None, None),
            day(2024, 12, 31, Some(2.0), None, None),
            day(2024, 2, 29, Some(3.0), None, None),
            day(2024, 12, 1, Some(4.0), None, None),
            day(2025, 1, 10, Some(5.0), None, None),
        ];
        let months = aggregate(&records);

        let keys: Vec<(i32, u32)> = months.iter().map(|m| (m.month.year, m.month.month)).collect();
        assert_eq!(keys, vec![(2024, 2), (2024, 12), (2025, 1), (2025, 2)]);
        assert!(months.windows(2).all(|w| w[0].month < w[1].month));
        assert_eq!(months[1].sample_day_count, 2);
        assert_eq!(months[1].mean_temperature, Some(3.0));
        assert_eq!(months[0].label, "Feb 24");
    }

    #[test]
    fn missing_fields_stay_absent() {
        let records = vec![
            day(2024, 9, 1, None, Some(0.0), None),
            day(2024, 9, 2, None, Some(0.0), Some(10.0)),
        ];
        let months = aggregate(&records);

        assert_eq!(months[0].mean_temperature, None);
        assert_eq!(months[0].mean_precipitation, Some(0.0));
        assert_eq!(months[0].mean_wind_speed, Some(10.0));
        assert_eq!(months[0].extreme_event_count, 0);
        assert_eq!(months[0].label, "Sep 24");
    }

    #[test]
    fn day_with_several_conditions_counts_once() {
        let records = vec![day(2024, 5, 5, Some(31.0), Some(50.0), Some(40.0))];
        assert_eq!(aggregate(&records)[0].extreme_event_count, 1);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let records = vec![
            day(2023, 3, 1, Some(10.0), Some(11.0), None),
            day(2023, 4, 1, None, Some(1.0), Some(21.0)),
        ];
        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
