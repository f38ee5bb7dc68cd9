use crate::structs::{DailyRecord, ExtremeEvent, ExtremeKind, Magnitude, Unit};

/// Daily event thresholds, checked strictly (a value equal to the limit is not extreme).
pub const HEAT_LIMIT_C: f64 = 35.0;
pub const COLD_LIMIT_C: f64 = 0.0;
pub const HEAVY_RAIN_LIMIT_MM: f64 = 25.0;
pub const STRONG_WIND_LIMIT_KMH: f64 = 20.0;

/// Looser thresholds used only to flag a day inside a monthly aggregate.
/// These intentionally differ from the daily event thresholds above.
pub const MONTHLY_WET_LIMIT_MM: f64 = 10.0;
pub const MONTHLY_HOT_LIMIT_C: f64 = 30.0;
pub const MONTHLY_COLD_LIMIT_C: f64 = 5.0;
pub const MONTHLY_WINDY_LIMIT_KMH: f64 = 20.0;

/// Detects extreme weather events in a daily series.
///
/// Each record is checked against every rule independently, so a single day
/// can produce up to three events (heat and cold are mutually exclusive).
///
/// | Kind | Rule |
/// |---|---|
/// | `ExtremeHeat` | temperature > 35.0 °C |
/// | `ExtremeCold` | temperature < 0.0 °C |
/// | `HeavyRain` | precipitation > 25.0 mm |
/// | `StrongWind` | wind speed > 20.0 km/h |
///
/// # Arguments
///
/// * `records` - Daily records in any order
/// * `location` - Display name attached to every event
///
/// # Returns
///
/// Events sorted by date, most recent first. Events of the same day keep the
/// rule order of the table above. Empty when nothing matched.
pub fn detect(records: &[DailyRecord], location: &str) -> Vec<ExtremeEvent> {
    let mut events: Vec<ExtremeEvent> = records
        .iter()
        .flat_map(|record| {
            breaches(record).map(|(kind, magnitude)| ExtremeEvent {
                kind,
                date: record.date,
                location: location.to_string(),
                magnitude,
            })
        })
        .collect();

    // sort_by is stable, same-day events stay in rule order
    events.sort_by(|a, b| b.date.cmp(&a.date));
    events
}

fn breaches(record: &DailyRecord) -> impl Iterator<Item = (ExtremeKind, Magnitude)> {
    let celsius = |value| Magnitude {
        value,
        unit: Unit::Celsius,
    };
    let heat = record
        .temperature
        .filter(|t| *t > HEAT_LIMIT_C)
        .map(|t| (ExtremeKind::ExtremeHeat, celsius(t)));
    let cold = record
        .temperature
        .filter(|t| *t < COLD_LIMIT_C)
        .map(|t| (ExtremeKind::ExtremeCold, celsius(t)));
    let rain = record
        .precipitation
        .filter(|p| *p > HEAVY_RAIN_LIMIT_MM)
        .map(|p| {
            let magnitude = Magnitude {
                value: p,
                unit: Unit::Millimetres,
            };
            (ExtremeKind::HeavyRain, magnitude)
        });
    let wind = record
        .wind_speed
        .filter(|w| *w > STRONG_WIND_LIMIT_KMH)
        .map(|w| {
            let magnitude = Magnitude {
                value: w,
                unit: Unit::KilometresPerHour,
            };
            (ExtremeKind::StrongWind, magnitude)
        });

    [heat, cold, rain, wind].into_iter().flatten()
}

/// Whether a day counts towards a month's `extreme_event_count`.
pub fn is_monthly_extreme_day(record: &DailyRecord) -> bool {
    record.precipitation.is_some_and(|p| p > MONTHLY_WET_LIMIT_MM)
        || record.temperature.is_some_and(|t| t > MONTHLY_HOT_LIMIT_C)
        || record.temperature.is_some_and(|t| t < MONTHLY_COLD_LIMIT_C)
        || record.wind_speed.is_some_and(|w| w > MONTHLY_WINDY_LIMIT_KMH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32, t: Option<f64>, p: Option<f64>, w: Option<f64>) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), t, p, w)
    }

    #[test]
    fn one_record_can_trigger_three_events() {
        let record = day(2024, 7, 4, Some(36.0), Some(30.0), Some(25.0));
        let events = detect(&[record.clone()], "Cairo");

        let kinds: Vec<ExtremeKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ExtremeKind::ExtremeHeat,
                ExtremeKind::HeavyRain,
                ExtremeKind::StrongWind
            ]
        );
        assert!(events.iter().all(|e| e.date == record.date));
        assert!(events.iter().all(|e| e.location == "Cairo"));
        assert_eq!(events[1].magnitude.unit, Unit::Millimetres);
    }

    #[test]
    fn thresholds_are_strict() {
        let record = day(2024, 7, 4, Some(35.0), Some(25.0), Some(20.0));
        assert!(detect(&[record], "x").is_empty());

        let freezing = day(2024, 1, 4, Some(0.0), None, None);
        assert!(detect(&[freezing], "x").is_empty());
    }

    #[test]
    fn absent_values_never_trigger() {
        let record = day(2024, 7, 4, None, None, None);
        assert!(detect(&[record], "x").is_empty());
        assert!(detect(&[], "x").is_empty());
    }

    #[test]
    fn events_are_most_recent_first() {
        let records = vec![
            day(2024, 1, 1, Some(36.0), Some(0.0), Some(5.0)),
            day(2024, 1, 15, Some(-2.0), Some(30.0), Some(25.0)),
        ];
        let events = detect(&records, "Oslo");
        assert_eq!(events.len(), 4);

        let second = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(events[..3].iter().all(|e| e.date == second));
        assert_eq!(events[0].kind, ExtremeKind::ExtremeCold);
        assert_eq!(events[3].kind, ExtremeKind::ExtremeHeat);
        assert_eq!(detect(&records, "Oslo"), events);
    }

    #[test]
    fn monthly_flag_uses_looser_table() {
        // warm but not extreme on the daily table
        let warm = day(2024, 6, 1, Some(31.0), None, None);
        assert!(is_monthly_extreme_day(&warm));
        assert!(detect(&[warm], "x").is_empty());

        let chilly = day(2024, 3, 1, Some(4.0), None, None);
        assert!(is_monthly_extreme_day(&chilly));

        let wet = day(2024, 3, 2, None, Some(12.0), None);
        assert!(is_monthly_extreme_day(&wet));

        let mild = day(2024, 3, 3, Some(18.0), Some(2.0), Some(20.0));
        assert!(!is_monthly_extreme_day(&mild));
    }

    #[test]
    fn magnitude_formats_with_unit() {
        let event = &detect(&[day(2024, 7, 4, Some(36.34), None, None)], "x")[0];
        assert_eq!(event.magnitude.to_string(), "36.3 °C");
    }
}
