pub mod chart;
pub mod report_analyzer;

pub use chart::{ChartBuilder, ChartData, ChartKind, Fill, Series, SeriesMode};
pub use report_analyzer::{ColumnStatistics, ReportAnalyzer, ReportSummary};
