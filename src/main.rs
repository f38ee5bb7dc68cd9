use chrono::{Local, NaiveDate};
use clap::Parser;
use log::debug;
use powerstats::{
    ChartLayout, DailyRecord, Dashboard, PipelineConfig, PipelineError, SimpleLogger,
    build_dashboard, chart::DEFAULT_TARGET_DENSITY, daily_outlook, load_records, write_events_csv, write_json,
    write_monthly_csv, write_monthly_parquet,
};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Weather payload files (dashboard backend JSON or raw NASA POWER JSON)
    #[arg(required = true)]
    input_files: Vec<PathBuf>,

    /// Output base name (will create dir containing .csv, .json, and .parquet files)
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Location name shown on extreme events
    #[arg(short, long, default_value = "Selected location")]
    location: String,

    /// Stride samples kept when down-sampling long series
    #[arg(long, default_value_t = DEFAULT_TARGET_DENSITY)]
    density: usize,

    /// Chart plot-area width in pixels
    #[arg(long, default_value_t = 520.0)]
    chart_width: f64,

    /// Date (YYYY-MM-DD) to assess from historical records
    #[arg(long)]
    check_date: Option<String>,

    /// Days of the month to summarize across every month (e.g. 1,15)
    #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u32).range(1..=31))]
    stats_day: Vec<u32>,

    /// Day-of-year half window for historical lookups
    #[arg(long, default_value_t = 7)]
    window: u32,

    /// Days of temperature outlook to produce from history, starting tomorrow
    #[arg(long, default_value_t = 0)]
    outlook_days: u32,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), PipelineError> {
    // Initialize timer and logger
    let total_start = Instant::now();
    log::set_logger(&LOGGER).map_err(|e| PipelineError::Data(e.to_string()))?;

    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    let check = args
        .check_date
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?;

    println!("powerstats! NASA POWER weather dashboard");
    let config = PipelineConfig {
        location: args.location.clone(),
        target_density: args.density,
        layout: ChartLayout {
            inner_width: args.chart_width,
            ..ChartLayout::default()
        },
        window: args.window,
        stats_days: args.stats_day.clone(),
        ..PipelineConfig::default()
    };
    debug!(
        "Location={} | Density={} | Window={} | Check date={:?}",
        config.location, config.target_density, config.window, check
    );

    let output_dir = PathBuf::from(format!("./output/{}", args.output));
    fs::create_dir_all(&output_dir)?;
    println!("Created output directory: {}", output_dir.display());

    // Payloads are independent, process them side by side
    let processing_start = Instant::now();
    let names = output_names(&args.input_files);
    let dashboards: Vec<(String, Dashboard)> = args
        .input_files
        .par_iter()
        .zip(names)
        .map(|(path, name)| {
            let records = load_records(path)?;
            if args.outlook_days > 0 {
                write_outlook(&records, &output_dir, &name, args.outlook_days, &config)?;
            }
            let dashboard = build_dashboard(records, &config, check);
            write_outputs(&dashboard, &output_dir, &name)?;
            Ok((name, dashboard))
        })
        .collect::<Result<_, PipelineError>>()?;
    println!(
        "Processed {} payloads in {:.2?}",
        dashboards.len(),
        processing_start.elapsed()
    );

    for (name, dashboard) in &dashboards {
        print_summary(name, dashboard);
    }

    println!("\nWrote files to directory: {}", output_dir.display());
    println!("Total runtime: {:.2?}", total_start.elapsed());
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "payload".to_string())
}

/// One output name per input, suffixed with the input's position when its stem
/// is already taken so parallel runs never write the same files.
fn output_names(paths: &[PathBuf]) -> Vec<String> {
    let mut taken = HashSet::new();
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let stem = file_stem(path);
            let mut name = stem.clone();
            let mut suffix = i + 1;
            while taken.contains(&name) {
                name = format!("{}_{}", stem, suffix);
                suffix += 1;
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

fn write_outputs(dashboard: &Dashboard, output_dir: &Path, name: &str) -> Result<(), PipelineError> {
    let io_start = Instant::now();
    let csv_path = output_dir.join(format!("{}_monthly.csv", name));
    let json_path = output_dir.join(format!("{}_monthly.json", name));
    let parquet_path = output_dir.join(format!("{}_monthly.parquet", name));
    let events_path = output_dir.join(format!("{}_events.csv", name));
    let dashboard_path = output_dir.join(format!("{}_dashboard.json", name));

    write_monthly_csv(&dashboard.monthly, &csv_path)?;
    write_json(&dashboard.monthly, &json_path)?;
    write_monthly_parquet(&dashboard.monthly, &parquet_path)?;
    write_events_csv(&dashboard.events, &events_path)?;
    write_json(dashboard, &dashboard_path)?;

    debug!("{}: wrote outputs in {:.2?}", name, io_start.elapsed());
    debug!("  - {}", csv_path.display());
    debug!("  - {}", json_path.display());
    debug!("  - {}", parquet_path.display());
    debug!("  - {}", events_path.display());
    debug!("  - {}", dashboard_path.display());
    Ok(())
}

/// Temperature outlook from tomorrow on; exceedance is measured against the hot threshold.
fn write_outlook(
    records: &[DailyRecord],
    output_dir: &Path,
    name: &str,
    days: u32,
    config: &PipelineConfig,
) -> Result<(), PipelineError> {
    let history: Vec<(NaiveDate, Option<f64>)> =
        records.iter().map(|r| (r.date, r.temperature)).collect();
    let today = Local::now().date_naive();
    let start = today.succ_opt().unwrap_or(today);
    let outlook = daily_outlook(&history, start, days, config.window, config.thresholds.hot_c);
    write_json(&outlook, &output_dir.join(format!("{}_outlook.json", name)))
}

fn print_summary(name: &str, dashboard: &Dashboard) {
    let fmt = |v: Option<f64>| v.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "n/a".to_string());

    println!("\n{} ({})", name, dashboard.location);
    println!(
        "  {} days | {} months | {} extreme events",
        dashboard.day_count,
        dashboard.monthly.len(),
        dashboard.events.len()
    );
    println!(
        "  Temperature avg={} min={} max={} °C",
        fmt(dashboard.temperature.mean),
        fmt(dashboard.temperature.min),
        fmt(dashboard.temperature.max)
    );
    println!(
        "  Precipitation total={:.1} mm avg={} mm/day",
        dashboard.precipitation.total,
        fmt(dashboard.precipitation.mean)
    );
    println!("  Wind avg={} km/h", fmt(dashboard.wind_speed.mean));
    for stats in &dashboard.day_of_month {
        println!(
            "  Day {}: temperature avg={} °C, precipitation total={:.1} mm",
            stats.day,
            fmt(stats.temperature.mean),
            stats.precipitation.total
        );
    }
    for event in dashboard.events.iter().take(5) {
        println!(
            "  {} {} {}",
            event.date,
            event.kind.title(),
            event.magnitude
        );
    }
    if let Some(check) = &dashboard.date_check {
        println!("  {} looks {:?}", check.date, check.verdict);
        for concern in &check.concerns {
            println!("    - {}", concern);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_stems_get_distinct_output_names() {
        let paths: Vec<PathBuf> = ["a/x.json", "b/x.json", "y.json", "c/x.json"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(output_names(&paths), vec!["x", "x_2", "y", "x_4"]);
    }

    #[test]
    fn suffixed_name_does_not_collide_with_a_real_stem() {
        let paths: Vec<PathBuf> = ["x.json", "x_3.json", "b/x.json"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(output_names(&paths), vec!["x", "x_3", "x_4"]);
    }
}
