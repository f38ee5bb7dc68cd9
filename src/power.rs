use crate::error::{PipelineError, Result};
use crate::structs::DailyRecord;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const TEMPERATURE: &str = "T2M";
pub const PRECIPITATION: &str = "PRECTOT";
pub const PRECIPITATION_CORRECTED: &str = "PRECTOTCORR";
pub const WIND_SPEED: &str = "WS2M";

/// POWER marks missing samples with this fill value.
const FILL_VALUE: f64 = -999.0;
const MS_TO_KMH: f64 = 3.6;

/// One parameter's series as returned by the dashboard backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSeries {
    pub dates: Vec<String>,
    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

/// Backend response: `{ data: { CODE: { dates, values } | null }, available: [CODE] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerResponse {
    #[serde(default)]
    pub data: HashMap<String, Option<ParameterSeries>>,
    #[serde(default)]
    pub available: Vec<String>,
}

/// Upstream POWER payload: `{ properties: { parameter: { CODE: { "YYYYMMDD": value } } } }`
#[derive(Debug, Clone, Deserialize)]
pub struct RawPowerResponse {
    pub properties: RawProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProperties {
    pub parameter: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl PowerResponse {
    /// Parses either the backend shape or a raw POWER payload.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("properties").is_some() {
            let raw: RawPowerResponse = serde_json::from_value(value)?;
            return Ok(raw.into_response(&[TEMPERATURE, PRECIPITATION, WIND_SPEED]));
        }
        if value.get("data").is_none() {
            return Err(PipelineError::Data(
                "payload has neither `data` nor `properties`".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Series for a parameter, if the backend reported it available.
    pub fn series(&self, code: &str) -> Option<&ParameterSeries> {
        if !self.available.iter().any(|a| a.eq_ignore_ascii_case(code)) {
            return None;
        }
        self.data
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(code))
            .and_then(|(_, series)| series.as_ref())
    }

    /// Joins the per-parameter series into one record per day.
    ///
    /// Dates come from the union of all available series. A parameter that
    /// is unavailable, or whose `values` stops short of its `dates`, is absent
    /// for the uncovered days. Wind speed is converted from m/s to km/h.
    pub fn daily_records(&self) -> Vec<DailyRecord> {
        let temperature = self.series(TEMPERATURE).map(by_date).unwrap_or_default();
        let precipitation = self
            .series(PRECIPITATION)
            .or_else(|| self.series(PRECIPITATION_CORRECTED))
            .map(by_date)
            .unwrap_or_default();
        let wind = self.series(WIND_SPEED).map(by_date).unwrap_or_default();

        let mut dates: Vec<NaiveDate> = temperature
            .keys()
            .chain(precipitation.keys())
            .chain(wind.keys())
            .copied()
            .collect();
        dates.sort();
        dates.dedup();

        let lookup = |map: &BTreeMap<NaiveDate, Option<f64>>, date: &NaiveDate| {
            map.get(date).copied().flatten()
        };
        let records: Vec<DailyRecord> = dates
            .iter()
            .map(|date| {
                DailyRecord::new(
                    *date,
                    lookup(&temperature, date),
                    lookup(&precipitation, date),
                    lookup(&wind, date).map(|ms| ms * MS_TO_KMH),
                )
            })
            .collect();

        debug!(
            "Decoded {} daily records from {} available parameters",
            records.len(),
            self.available.len()
        );
        records
    }
}

impl RawPowerResponse {
    /// Converts to the backend shape, resolving each wanted code to the best matching key.
    pub fn into_response(self, wanted: &[&str]) -> PowerResponse {
        let keys: Vec<String> = self.properties.parameter.keys().cloned().collect();
        let mut response = PowerResponse::default();

        for code in wanted {
            let Some(key) = select_parameter_key(&keys, code) else {
                debug!("No POWER parameter matches {}", code);
                response.data.insert(code.to_string(), None);
                continue;
            };
            let series = self
                .properties
                .parameter
                .get(&key)
                .map(raw_series)
                .filter(|s| !s.dates.is_empty());
            if series.is_some() {
                response.available.push(code.to_string());
            }
            response.data.insert(code.to_string(), series);
        }
        response
    }
}

/// Finds the key in `keys` that best stands for `target`.
///
/// An exact (case-insensitive) match wins. Otherwise the parameter family is
/// matched (precipitation, temperature, wind) and finally any key containing
/// the target.
pub fn select_parameter_key(keys: &[String], target: &str) -> Option<String> {
    if let Some(key) = keys.iter().find(|k| k.eq_ignore_ascii_case(target)) {
        return Some(key.clone());
    }

    let target = target.to_lowercase();
    let family = if target.contains("prec") {
        find_key(keys, |k| k.contains("prec"))
    } else if target.contains("t2") || target.contains("temp") {
        find_key(keys, |k| k.contains("t2m") || k.contains("temp") || k.contains("air_temperature"))
    } else if target.contains("ws") || target.contains("wind") {
        find_key(keys, |k| k.contains("ws2m") || k.contains("wind") || k.contains("ws"))
    } else {
        None
    };
    family.or_else(|| find_key(keys, |k| k.contains(target.as_str())))
}

/// First key whose lowercase form satisfies `pred`.
fn find_key(keys: &[String], pred: impl Fn(&str) -> bool) -> Option<String> {
    keys.iter().find(|k| pred(k.to_lowercase().as_str())).cloned()
}

/// Decodes a payload without failing: malformed input is treated as "no data".
pub fn records_from_json(json: &str) -> Vec<DailyRecord> {
    match PowerResponse::from_json(json) {
        Ok(response) => response.daily_records(),
        Err(e) => {
            warn!("Ignoring malformed weather payload: {}", e);
            Vec::new()
        }
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
}

fn by_date(series: &ParameterSeries) -> BTreeMap<NaiveDate, Option<f64>> {
    let mut skipped = 0;
    let map: BTreeMap<NaiveDate, Option<f64>> = series
        .dates
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let date = parse_date(raw);
            if date.is_none() {
                skipped += 1;
            }
            date.map(|d| (d, series.values.get(i).copied().flatten().and_then(clean_value)))
        })
        .collect();
    if skipped > 0 {
        debug!("Skipped {} unparsable dates", skipped);
    }
    map
}

fn raw_series(values: &BTreeMap<String, serde_json::Value>) -> ParameterSeries {
    // BTreeMap keeps YYYYMMDD keys in date order
    let (dates, values) = values
        .iter()
        .filter(|(key, _)| key.len() == 8 && parse_date(key).is_some())
        .map(|(key, value)| (key.clone(), raw_number(value).and_then(clean_value)))
        .unzip();
    ParameterSeries { dates, values }
}

/// Numbers and numeric strings both count; anything else is absent.
fn raw_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn clean_value(value: f64) -> Option<f64> {
    if value.is_nan() || value == FILL_VALUE {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn backend_payload_becomes_daily_records() {
        let json = r#"{
            "available": ["T2M", "PRECTOT", "WS2M"],
            "data": {
                "T2M": { "dates": ["2024-01-01", "2024-01-02"], "values": [12.5, null] },
                "PRECTOT": { "dates": ["2024-01-01", "2024-01-02"], "values": [0.0, 4.2] },
                "WS2M": { "dates": ["2024-01-01", "2024-01-02"], "values": [5.0, 10.0] }
            },
            "stats": null
        }"#;
        let records = records_from_json(json);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date(2024, 1, 1));
        assert_eq!(records[0].temperature, Some(12.5));
        assert_eq!(records[0].precipitation, Some(0.0));
        assert_eq!(records[0].wind_speed, Some(18.0));
        assert_eq!(records[1].temperature, None);
        assert_eq!(records[1].wind_speed, Some(36.0));
    }

    #[test]
    fn short_values_and_unavailable_params_are_absent() {
        let json = r#"{
            "available": ["T2M", "PRECTOT"],
            "data": {
                "T2M": { "dates": ["20240301", "20240302", "20240303"], "values": [1.0] },
                "PRECTOT": { "dates": ["20240301"], "values": [-999.0] },
                "WS2M": { "dates": ["20240301"], "values": [3.0] }
            }
        }"#;
        let records = records_from_json(json);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].temperature, Some(1.0));
        assert_eq!(records[0].precipitation, None);
        assert_eq!(records[0].wind_speed, None);
        assert_eq!(records[2].temperature, None);
    }

    #[test]
    fn corrected_precipitation_is_a_fallback() {
        let json = r#"{
            "available": ["PRECTOTCORR"],
            "data": { "PRECTOTCORR": { "dates": ["2024-02-29"], "values": [7.5] } }
        }"#;
        let records = records_from_json(json);
        assert_eq!(records[0].date, date(2024, 2, 29));
        assert_eq!(records[0].precipitation, Some(7.5));
    }

    #[test]
    fn malformed_payload_means_no_data() {
        assert!(records_from_json("not json").is_empty());
        assert!(records_from_json("{}").is_empty());
        assert!(records_from_json(r#"{"data": {}, "available": []}"#).is_empty());
        assert!(PowerResponse::from_json("[1, 2]").is_err());
    }

    #[test]
    fn raw_power_payload_is_decoded() {
        let json = r#"{
            "properties": { "parameter": {
                "T2M": { "20240102": 3.5, "20240101": -999, "bogus": 1.0 },
                "PRECTOTCORR": { "20240101": 2.0, "20240102": 0.0 },
                "WS2M": { "20240101": 1.0, "20240102": 2.0 }
            } }
        }"#;
        let response = PowerResponse::from_json(json).unwrap();
        assert_eq!(response.available, vec!["T2M", "PRECTOT", "WS2M"]);

        let records = response.daily_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].temperature, None);
        assert_eq!(records[1].temperature, Some(3.5));
        assert_eq!(records[0].precipitation, Some(2.0));
        assert_eq!(records[1].wind_speed, Some(7.2));
    }

    #[test]
    fn raw_numeric_strings_are_values() {
        let json = r#"{
            "properties": { "parameter": {
                "T2M": { "20240101": "12.5", "20240102": " -999 ", "20240103": "n/a" }
            } }
        }"#;
        let records = records_from_json(json);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].temperature, Some(12.5));
        assert_eq!(records[1].temperature, None);
        assert_eq!(records[2].temperature, None);
    }

    #[test]
    fn parameter_keys_are_matched_by_family() {
        let keys: Vec<String> = ["PRECTOTCORR", "T2M_AVG", "WIND"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(select_parameter_key(&keys, "PRECTOT").as_deref(), Some("PRECTOTCORR"));
        assert_eq!(select_parameter_key(&keys, "T2M").as_deref(), Some("T2M_AVG"));
        assert_eq!(select_parameter_key(&keys, "ws2m").as_deref(), Some("WIND"));
        assert_eq!(select_parameter_key(&keys, "t2m_avg").as_deref(), Some("T2M_AVG"));
        assert_eq!(select_parameter_key(&keys, "ALLSKY"), None);
    }
}
