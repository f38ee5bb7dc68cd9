use crate::error::Result;
use crate::structs::{ExtremeEvent, MonthlyAggregate};
use arrow_array::{Float64Array, Int32Array, RecordBatch, StringArray, UInt32Array};
use arrow_schema::{DataType, Field, Schema};
use csv::Writer;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::{fs::File, path::Path, sync::Arc};

/// Formats an optional value for tabular output; absent values become an empty cell.
fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// Writes monthly aggregates to a CSV file with formatted numeric values.
///
/// # Arguments
/// * `results` - Slice of MonthlyAggregate structs, in display order
/// * `output_path` - Path where the CSV file will be created
///
/// # Returns
/// Returns `Ok(())` on success.
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_monthly_csv(results: &[MonthlyAggregate], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "Year",
        "Month",
        "Label",
        "Mean_Temp",
        "Mean_Precip",
        "Mean_Wind",
        "Extreme_Days",
        "Days",
    ])?;

    for month in results {
        writer.write_record(&[
            month.month.year.to_string(),
            month.month.month.to_string(),
            month.label.clone(),
            cell(month.mean_temperature),
            cell(month.mean_precipitation),
            cell(month.mean_wind_speed),
            month.extreme_event_count.to_string(),
            month.sample_day_count.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes extreme events to a CSV file, one row per event.
pub fn write_events_csv(events: &[ExtremeEvent], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["Date", "Event", "Location", "Magnitude"])?;
    for event in events {
        writer.write_record(&[
            event.date.format("%Y-%m-%d").to_string(),
            event.kind.title().to_string(),
            event.location.clone(),
            event.magnitude.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes any serializable value to a pretty-formatted JSON file.
///
/// # Errors
/// Returns error if file cannot be created or serialization fails.
pub fn write_json<T: Serialize + ?Sized>(results: &T, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}

/// Writes monthly aggregates to a columnar Parquet file using Arrow format.
///
/// Mean columns are nullable so a month without readings stays distinguishable
/// from a month averaging zero.
///
/// # Errors
/// Returns error if file cannot be created, schema is invalid, or Arrow operations fail.
pub fn write_monthly_parquet(results: &[MonthlyAggregate], output_path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("month", DataType::UInt32, false),
        Field::new("label", DataType::Utf8, false),
        Field::new("mean_temperature", DataType::Float64, true),
        Field::new("mean_precipitation", DataType::Float64, true),
        Field::new("mean_wind_speed", DataType::Float64, true),
        Field::new("extreme_event_count", DataType::UInt32, false),
        Field::new("sample_day_count", DataType::UInt32, false),
    ]));

    let years: Int32Array = results.iter().map(|r| r.month.year).collect();
    let months: UInt32Array = results.iter().map(|r| r.month.month).collect();
    let labels: StringArray = StringArray::from_iter_values(results.iter().map(|r| r.label.as_str()));
    let temps: Float64Array = results.iter().map(|r| r.mean_temperature).collect();
    let precips: Float64Array = results.iter().map(|r| r.mean_precipitation).collect();
    let winds: Float64Array = results.iter().map(|r| r.mean_wind_speed).collect();
    let extremes: UInt32Array = results.iter().map(|r| r.extreme_event_count).collect();
    let days: UInt32Array = results.iter().map(|r| r.sample_day_count).collect();

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(years),
            Arc::new(months),
            Arc::new(labels),
            Arc::new(temps),
            Arc::new(precips),
            Arc::new(winds),
            Arc::new(extremes),
            Arc::new(days),
        ],
    )?;

    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}
