use crate::chart::DEFAULT_TARGET_DENSITY;
use chrono::NaiveDate;
use log::{Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple logger implementation
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &LogRecord) {
        println!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// One calendar day of weather at a single location.
///
/// Every field may be missing upstream; a missing value is `None`, never `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Mean air temperature at 2 m, °C
    pub temperature: Option<f64>,
    /// Precipitation, mm/day
    pub precipitation: Option<f64>,
    /// Wind speed at 2 m, km/h
    pub wind_speed: Option<f64>,
}

impl DailyRecord {
    pub fn new(
        date: NaiveDate,
        temperature: Option<f64>,
        precipitation: Option<f64>,
        wind_speed: Option<f64>,
    ) -> Self {
        Self {
            date,
            temperature,
            precipitation,
            wind_speed,
        }
    }
}

/// Calendar (year, month) grouping key. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

/// Per-month summary of daily records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: MonthKey,
    /// Display label such as "Sep 24"
    pub label: String,
    pub mean_temperature: Option<f64>,
    pub mean_precipitation: Option<f64>,
    pub mean_wind_speed: Option<f64>,
    /// Days in the month flagged by the monthly thresholds, each day counted once
    pub extreme_event_count: u32,
    pub sample_day_count: u32,
}

/// Descriptive statistics over a series of optional values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Sum of present values; 0.0 when none are present
    pub total: f64,
    pub present_count: usize,
}

/// Statistics for one day of the month (e.g. every 15th) across the series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOfMonthStats {
    pub day: u32,
    pub temperature: Summary,
    pub precipitation: Summary,
    pub wind_speed: Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtremeKind {
    ExtremeHeat,
    ExtremeCold,
    HeavyRain,
    StrongWind,
}

impl ExtremeKind {
    pub fn title(&self) -> &'static str {
        match self {
            ExtremeKind::ExtremeHeat => "Extreme Heat",
            ExtremeKind::ExtremeCold => "Extreme Cold",
            ExtremeKind::HeavyRain => "Heavy Rain",
            ExtremeKind::StrongWind => "Strong Wind",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Celsius,
    Millimetres,
    KilometresPerHour,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Millimetres => "mm",
            Unit::KilometresPerHour => "km/h",
        }
    }
}

/// A measured value together with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Magnitude {
    pub value: f64,
    pub unit: Unit,
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} {}", self.value, self.unit.symbol())
    }
}

/// A single threshold breach on a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeEvent {
    pub kind: ExtremeKind,
    pub date: NaiveDate,
    pub location: String,
    pub magnitude: Magnitude,
}

/// Horizontal geometry of the chart plot area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub margin: f64,
    pub inner_width: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            margin: 40.0,
            inner_width: 520.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Index into the original series
    pub index: usize,
    pub value: f64,
    /// Horizontal coordinate in the plot area
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPosition {
    pub x: f64,
    pub label: String,
}

/// Down-sampled, chart-ready series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    pub label_positions: Vec<LabelPosition>,
}

/// Thresholds used by the check-date assessment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckThresholds {
    pub hot_c: f64,
    pub cold_c: f64,
    pub rain_mm: f64,
    pub wind_kmh: f64,
}

impl Default for CheckThresholds {
    fn default() -> Self {
        Self {
            hot_c: 35.0,
            cold_c: 5.0,
            rain_mm: 5.0,
            // 10 m/s
            wind_kmh: 36.0,
        }
    }
}

/// Configuration for one dashboard pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub location: String,
    pub target_density: usize,
    pub layout: ChartLayout,
    /// Day-of-year half window for climatology lookups
    pub window: u32,
    pub thresholds: CheckThresholds,
    /// Days of the month to summarize across every month
    pub stats_days: Vec<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            location: "Selected location".to_string(),
            target_density: DEFAULT_TARGET_DENSITY,
            layout: ChartLayout::default(),
            window: 7,
            thresholds: CheckThresholds::default(),
            stats_days: Vec::new(),
        }
    }
}
