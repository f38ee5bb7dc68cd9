use crate::aggregate::aggregate;
use crate::chart::downsample_with_layout;
use crate::climatology::{DateCheck, check_date};
use crate::error::Result;
use crate::extremes::detect;
use crate::power::records_from_json;
use crate::stats::{day_of_month_summary, summarize};
use crate::structs::{
    ChartSeries, DailyRecord, DayOfMonthStats, ExtremeEvent, MonthlyAggregate, PipelineConfig,
    Summary,
};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Everything the dashboard renders for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub location: String,
    pub day_count: usize,
    pub monthly: Vec<MonthlyAggregate>,
    pub temperature: Summary,
    pub precipitation: Summary,
    pub wind_speed: Summary,
    /// One entry per configured day of the month, in configured order
    pub day_of_month: Vec<DayOfMonthStats>,
    pub events: Vec<ExtremeEvent>,
    pub daily_temperature_chart: ChartSeries,
    pub monthly_temperature_chart: ChartSeries,
    pub date_check: Option<DateCheck>,
}

/// Reads a weather payload from disk into daily records.
///
/// Only file access can fail; a payload that does not decode yields no records.
pub fn load_records(file_path: &Path) -> Result<Vec<DailyRecord>> {
    debug!("Reading payload: {}", file_path.display());
    let json = fs::read_to_string(file_path)?;
    Ok(records_from_json(&json))
}

/// Runs every derivation over one daily series.
///
/// The series is sorted by date first; each output is computed fresh from it.
pub fn build_dashboard(
    mut records: Vec<DailyRecord>,
    config: &PipelineConfig,
    check: Option<NaiveDate>,
) -> Dashboard {
    records.sort_by_key(|r| r.date);

    let temperatures: Vec<Option<f64>> = records.iter().map(|r| r.temperature).collect();
    let precipitation: Vec<Option<f64>> = records.iter().map(|r| r.precipitation).collect();
    let wind: Vec<Option<f64>> = records.iter().map(|r| r.wind_speed).collect();
    let day_labels: Vec<String> = records
        .iter()
        .map(|r| r.date.format("%Y-%m-%d").to_string())
        .collect();

    let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
    let day_of_month = config
        .stats_days
        .iter()
        .map(|&day| DayOfMonthStats {
            day,
            temperature: day_of_month_summary(&dates, &temperatures, day),
            precipitation: day_of_month_summary(&dates, &precipitation, day),
            wind_speed: day_of_month_summary(&dates, &wind, day),
        })
        .collect();

    let monthly = aggregate(&records);
    let monthly_temperatures: Vec<Option<f64>> = monthly.iter().map(|m| m.mean_temperature).collect();
    let month_labels: Vec<String> = monthly.iter().map(|m| m.label.clone()).collect();

    let dashboard = Dashboard {
        location: config.location.clone(),
        day_count: records.len(),
        temperature: summarize(&temperatures),
        precipitation: summarize(&precipitation),
        wind_speed: summarize(&wind),
        day_of_month,
        events: detect(&records, &config.location),
        daily_temperature_chart: downsample_with_layout(
            &temperatures,
            &day_labels,
            config.target_density,
            config.layout,
        ),
        monthly_temperature_chart: downsample_with_layout(
            &monthly_temperatures,
            &month_labels,
            config.target_density,
            config.layout,
        ),
        date_check: check.map(|date| check_date(&records, date, config.window, &config.thresholds)),
        monthly,
    };

    debug!(
        "{}: {} days, {} months, {} extreme events",
        dashboard.location,
        dashboard.day_count,
        dashboard.monthly.len(),
        dashboard.events.len()
    );
    dashboard
}
