pub mod aggregate;
pub mod chart;
pub mod climatology;
pub mod dashboard;
pub mod error;
pub mod extremes;
pub mod load;
pub mod power;
pub mod stats;
pub mod structs;

// Re-export public API
pub use aggregate::aggregate;
pub use chart::{downsample, downsample_with_layout};
pub use climatology::{check_date, daily_outlook};
pub use dashboard::{Dashboard, build_dashboard, load_records};
pub use error::{PipelineError, Result};
pub use extremes::detect;
pub use load::{write_events_csv, write_json, write_monthly_csv, write_monthly_parquet};
pub use power::{PowerResponse, records_from_json};
pub use stats::summarize;
pub use structs::{
    ChartLayout, ChartSeries, CheckThresholds, DailyRecord, DayOfMonthStats, ExtremeEvent,
    ExtremeKind, MonthlyAggregate, PipelineConfig, SimpleLogger, Summary,
};
