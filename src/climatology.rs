use crate::structs::{CheckThresholds, DailyRecord};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Hot/cold probability at which a concern is reported as very likely.
const VERY_LIKELY: f64 = 0.6;
/// Rain/wind probability at which a concern is reported as likely.
const LIKELY: f64 = 0.5;

/// Historical expectation for one future day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOutlook {
    pub date: NaiveDate,
    pub mean: Option<f64>,
    /// Share of historical samples above the threshold
    pub exceed_probability: Option<f64>,
    pub sample_count: usize,
}

/// Historical odds for one parameter around a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionOdds {
    pub sample_count: usize,
    pub mean: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Favourable,
    Caution,
    NotFavourable,
}

/// Assessment of how pleasant a date is likely to be, from history alone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateCheck {
    pub date: NaiveDate,
    pub hot: Option<ConditionOdds>,
    pub cold: Option<ConditionOdds>,
    pub rain: Option<ConditionOdds>,
    pub wind: Option<ConditionOdds>,
    pub concerns: Vec<String>,
    pub verdict: Verdict,
}

pub fn day_of_year(date: &NaiveDate) -> u32 {
    date.ordinal()
}

/// Circular day-of-year distance, so Dec 31 and Jan 1 are one day apart.
fn doy_distance(a: u32, b: u32) -> u32 {
    let diff = a.abs_diff(b);
    diff.min(365u32.saturating_sub(diff))
}

/// Present values of the history whose day of year lies within `window` days of `target`.
fn seasonal_samples(history: &[(NaiveDate, Option<f64>)], target: &NaiveDate, window: u32) -> Vec<f64> {
    let target = day_of_year(target);
    history
        .iter()
        .filter(|(date, _)| doy_distance(day_of_year(date), target) <= window)
        .filter_map(|(_, value)| value.filter(|v| !v.is_nan()))
        .collect()
}

fn odds(samples: &[f64], breach: impl Fn(f64) -> bool) -> Option<ConditionOdds> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    Some(ConditionOdds {
        sample_count: samples.len(),
        mean: samples.iter().sum::<f64>() / n,
        probability: samples.iter().filter(|v| breach(**v)).count() as f64 / n,
    })
}

/// Builds a climatological outlook for `days` consecutive days from `start`.
///
/// Each day's mean and exceedance probability come from every historical
/// value within `window` days of the same day of year, in any year. Days
/// without historical samples get absent mean and probability.
///
/// # Arguments
///
/// * `history` - (date, value) pairs of a single parameter
/// * `start` - First day of the outlook
/// * `days` - Number of days to produce; the outlook stops early at the last
///   representable date
/// * `window` - Half-width of the day-of-year window
/// * `threshold` - Value whose exceedance probability is reported
pub fn daily_outlook(
    history: &[(NaiveDate, Option<f64>)],
    start: NaiveDate,
    days: u32,
    window: u32,
    threshold: f64,
) -> Vec<DailyOutlook> {
    (0..days)
        .map_while(|offset| start.checked_add_days(Days::new(offset.into())))
        .map(|date| {
            let samples = seasonal_samples(history, &date, window);
            let stats = odds(&samples, |v| v > threshold);
            DailyOutlook {
                date,
                mean: stats.as_ref().map(|s| s.mean),
                exceed_probability: stats.as_ref().map(|s| s.probability),
                sample_count: samples.len(),
            }
        })
        .collect()
}

/// Judges a date from the historical records around its day of year.
pub fn check_date(
    records: &[DailyRecord],
    date: NaiveDate,
    window: u32,
    thresholds: &CheckThresholds,
) -> DateCheck {
    let series = |field: fn(&DailyRecord) -> Option<f64>| -> Vec<f64> {
        let history: Vec<(NaiveDate, Option<f64>)> = records.iter().map(|r| (r.date, field(r))).collect();
        seasonal_samples(&history, &date, window)
    };
    let temperatures = series(|r| r.temperature);
    let precipitation = series(|r| r.precipitation);
    let wind = series(|r| r.wind_speed);

    let hot = odds(&temperatures, |t| t > thresholds.hot_c);
    let cold = odds(&temperatures, |t| t < thresholds.cold_c);
    let rain = odds(&precipitation, |p| p > thresholds.rain_mm);
    let wind = odds(&wind, |w| w > thresholds.wind_kmh);

    let mut concerns = Vec::new();
    let mut very_likely = false;
    if let Some(p) = hot.as_ref().map(|o| o.probability).filter(|p| *p >= VERY_LIKELY) {
        very_likely = true;
        concerns.push(format!("Very likely HOT (>{} °C): {:.0}%", thresholds.hot_c, p * 100.0));
    }
    if let Some(p) = cold.as_ref().map(|o| o.probability).filter(|p| *p >= VERY_LIKELY) {
        very_likely = true;
        concerns.push(format!("Very likely COLD (<{} °C): {:.0}%", thresholds.cold_c, p * 100.0));
    }
    if let Some(p) = rain.as_ref().map(|o| o.probability).filter(|p| *p >= LIKELY) {
        concerns.push(format!("Likely rainy (>{} mm/day): {:.0}%", thresholds.rain_mm, p * 100.0));
    }
    if let Some(p) = wind.as_ref().map(|o| o.probability).filter(|p| *p >= LIKELY) {
        concerns.push(format!("Likely windy (>{} km/h): {:.0}%", thresholds.wind_kmh, p * 100.0));
    }

    let verdict = if concerns.is_empty() {
        Verdict::Favourable
    } else if very_likely || concerns.len() >= 2 {
        Verdict::NotFavourable
    } else {
        Verdict::Caution
    };

    DateCheck {
        date,
        hot,
        cold,
        rain,
        wind,
        concerns,
        verdict,
    }
}
