use chrono::NaiveDate;
use crate::utils::constants::{DEFAULT_X_AXIS_TITLE, DEFAULT_Y_AXIS_TITLE};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wq-processor")]
#[command(about = "Water-quality lab result processor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pivot every station in a lab export and replace its stored table
    Ingest {
        #[arg(short, long, help = "Long-format lab export (.csv or .xlsx)")]
        input: PathBuf,

        #[arg(long, help = "Write the per-station outcome report as JSON")]
        report: Option<PathBuf>,

        #[arg(long, default_value = ",", help = "Field delimiter of the input")]
        delimiter: char,

        #[arg(long, default_value = "false", help = "Hide the progress spinner")]
        silent: bool,
    },

    /// Show or export a station's report for a date range
    Query {
        #[arg(short, long)]
        station: String,

        #[arg(long, help = "First date, inclusive [default: earliest stored]")]
        start: Option<NaiveDate>,

        #[arg(long, help = "Last date, inclusive [default: latest stored]")]
        end: Option<NaiveDate>,

        #[arg(
            short,
            long,
            num_args = 0..=1,
            help = "Export to CSV, or Excel for a .xlsx path [default: {station}_filtered_data_{start}_{end}.csv]"
        )]
        output: Option<Option<PathBuf>>,

        #[arg(long, requires = "output", help = "Export as Excel (.xlsx)")]
        excel: bool,

        #[arg(long, default_value = "10", help = "Rows to print (0 = none)")]
        sample: usize,
    },

    /// Summary metrics and column statistics of a stored report
    Info {
        #[arg(short, long)]
        station: String,
    },

    /// Build chart series from a station's report
    Chart {
        #[arg(short, long)]
        station: String,

        #[arg(short, long, default_value = "Line Chart", help = "Line, Scatter, Bar or Area")]
        kind: String,

        #[arg(
            long,
            required = true,
            help = "Column ('Data 3') or parameter code ('TSS, IN'); repeat for more"
        )]
        columns: Vec<String>,

        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value = DEFAULT_X_AXIS_TITLE)]
        x_title: String,

        #[arg(long, default_value = DEFAULT_Y_AXIS_TITLE, help = "Y axis title, e.g. the unit")]
        y_title: String,

        #[arg(short, long, help = "Write chart JSON here instead of stdout")]
        output: Option<PathBuf>,
    },

    /// List known stations and their column mappings
    Stations {
        #[arg(long, default_value = "false", help = "Show the Data column mapping")]
        mapping: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_axis_titles() {
        let cli = Cli::try_parse_from([
            "wq-processor",
            "chart",
            "-s",
            "CT",
            "--columns",
            "TSS, IN",
            "--y-title",
            "mg/L",
        ])
        .unwrap();

        match cli.command {
            Commands::Chart {
                x_title, y_title, ..
            } => {
                assert_eq!(x_title, DEFAULT_X_AXIS_TITLE);
                assert_eq!(y_title, "mg/L");
            }
            _ => panic!("expected chart command"),
        }
    }

    #[test]
    fn test_query_excel_export() {
        let cli =
            Cli::try_parse_from(["wq-processor", "query", "-s", "CT", "--output", "--excel"]).unwrap();

        match cli.command {
            Commands::Query { output, excel, .. } => {
                assert_eq!(output, Some(None));
                assert!(excel);
            }
            _ => panic!("expected query command"),
        }

        // Excel applies to an export only
        assert!(Cli::try_parse_from(["wq-processor", "query", "-s", "CT", "--excel"]).is_err());
    }
}
