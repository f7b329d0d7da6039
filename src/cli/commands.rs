use crate::analyzers::{ChartBuilder, ChartKind, ReportAnalyzer};
use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::models::{slot_column_name, ReportTable, StationProfile};
use crate::processors::{BatchProcessor, StationStatus};
use crate::readers::RawReader;
use crate::registry::StationRegistry;
use crate::utils::filename::generate_default_export_filename;
use crate::utils::progress::{ProgressAwareWriter, ProgressReporter};
use crate::writers::{CsvExporter, ParquetStore, ReportStore, XlsxExporter};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use indicatif::MultiProgress;
use std::fs::{self, File};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let bars = MultiProgress::new();
    setup_logging(&cli, &bars)?;

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let registry = StationRegistry::from_config(&config).context("Invalid station profiles")?;
    let store = Arc::new(ParquetStore::from_config(&config.storage)?);
    debug!(
        "Storage root {} (dataset {})",
        store.root().display(),
        config.storage.dataset
    );

    match cli.command {
        Commands::Ingest {
            input,
            report,
            delimiter,
            silent,
        } => {
            let delimiter = u8::try_from(delimiter)
                .with_context(|| format!("Delimiter '{}' is not a single byte", delimiter))?;

            info!("Reading lab export {}", input.display());
            let raw = RawReader::with_delimiter(delimiter)
                .read_table(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let progress =
                ProgressReporter::new_spinner_in(&bars, "Processing upload...", silent);
            let processor = BatchProcessor::new(registry, store);
            let batch = processor.process_upload(&raw, Some(&progress)).await?;

            for outcome in &batch.outcomes {
                if let StationStatus::Stored { diagnostics, .. } = &outcome.status {
                    for diagnostic in diagnostics {
                        debug!("{}: {}", outcome.station_id, diagnostic.describe());
                    }
                }
            }
            println!("{}", batch.summary());

            if let Some(path) = report {
                fs::write(&path, serde_json::to_string_pretty(&batch)?)
                    .with_context(|| format!("Failed to write report {}", path.display()))?;
                println!("Outcome report written to {}", path.display());
            }

            if batch.failed() > 0 {
                bail!("{} of {} stations failed", batch.failed(), batch.outcomes.len());
            }
        }

        Commands::Query {
            station,
            start,
            end,
            output,
            excel,
            sample,
        } => {
            let profile = registry.resolve(&station)?;
            let Some((start, end)) = resolve_range(store.as_ref(), profile, start, end)? else {
                println!("No data stored for {} station", station);
                return Ok(());
            };

            let table = store.query_by_date_range(profile.table_id(), start, end)?;
            println!(
                "{} rows for {} between {} and {}",
                table.len(),
                station,
                start,
                end
            );
            print_sample(&table, profile, sample);

            if let Some(path) = output {
                let path = path.unwrap_or_else(|| {
                    let default = generate_default_export_filename(&station, start, end);
                    if excel {
                        default.with_extension("xlsx")
                    } else {
                        default
                    }
                });
                if excel || path.extension().is_some_and(|e| e.eq_ignore_ascii_case("xlsx")) {
                    XlsxExporter::new().write_to_path(&table, &path)?;
                } else {
                    CsvExporter::new().write_to_path(&table, &path)?;
                }
                println!("Exported {} rows to {}", table.len(), path.display());
            }
        }

        Commands::Info { station } => {
            let profile = registry.resolve(&station)?;
            let file_info = store
                .table_info(profile.table_id())
                .with_context(|| format!("No stored report for {} station", station))?;
            let table = store.read_table(profile.table_id())?;

            let analyzer = ReportAnalyzer::new().with_catalog(profile.catalog());
            println!("{}", analyzer.summarize(&table)?.detailed_summary());

            println!("\nColumn Statistics:");
            for stats in analyzer.describe(&table, &[])? {
                println!("{}", stats.summary_line());
            }

            println!("\nFile Details:");
            println!("{}", file_info.summary());
        }

        Commands::Chart {
            station,
            kind,
            columns,
            start,
            end,
            title,
            x_title,
            y_title,
            output,
        } => {
            let kind: ChartKind = kind.parse()?;
            let profile = registry.resolve(&station)?;
            let Some((start, end)) = resolve_range(store.as_ref(), profile, start, end)? else {
                bail!("No data stored for {} station", station);
            };

            let table = store.query_by_date_range(profile.table_id(), start, end)?;
            let columns = resolve_columns(&table, profile, &columns);
            let title = title.unwrap_or_else(|| format!("{} {}", station, kind.label()));

            let chart = ChartBuilder::new(kind)
                .with_title(&title)
                .with_axis_titles(&x_title, &y_title)
                .build(&table, &columns)?;
            let json = chart.to_json()?;

            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write chart {}", path.display()))?;
                    println!("{} written to {}", kind, path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Stations { mapping } => {
            for profile in registry.profiles() {
                let stored = if store.table_exists(profile.table_id())? {
                    "stored"
                } else {
                    "no data"
                };
                println!(
                    "{:<8} {} ({} parameters, {})",
                    profile.station_id(),
                    profile.table_id(),
                    profile.slot_count(),
                    stored
                );

                if mapping {
                    for (column, code) in profile.catalog().column_mapping() {
                        println!("    {:<8} {}", column, code);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Fill an open-ended date range from the stored table's first and last dates
fn resolve_range(
    store: &ParquetStore,
    profile: &StationProfile,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> anyhow::Result<Option<(NaiveDate, NaiveDate)>> {
    let range = match (start, end) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => store
            .date_range(profile.table_id())
            .with_context(|| format!("No stored report for {} station", profile.station_id()))?
            .map(|(first, last)| (start.unwrap_or(first), end.unwrap_or(last))),
    };

    if let Some((start, end)) = range {
        if start > end {
            bail!("Start date {} is after end date {}", start, end);
        }
    }
    Ok(range)
}

/// Accept parameter codes wherever a `Data i` column name is expected
fn resolve_columns(table: &ReportTable, profile: &StationProfile, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            if table.has_column(column) {
                return column.clone();
            }
            profile
                .catalog()
                .slot_of(column)
                .map(slot_column_name)
                .unwrap_or_else(|| column.clone())
        })
        .collect()
}

fn print_sample(table: &ReportTable, profile: &StationProfile, sample: usize) {
    if sample == 0 || table.is_empty() {
        return;
    }

    println!("\nSample Records (showing {} of {}):", sample.min(table.len()), table.len());
    for (i, row) in table.rows().iter().take(sample).enumerate() {
        let values: Vec<String> = row
            .values()
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| {
                let value = (*value)?;
                let label = profile.catalog().code_at(slot + 1).unwrap_or("?");
                Some(format!("{}={}", label, value))
            })
            .collect();
        println!("{}. {} {}: {}", i + 1, row.station(), row.dates(), values.join("; "));
    }
}

fn setup_logging(cli: &Cli, bars: &MultiProgress) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wq_processor={}", cli.log_level())));

    let file_layer = match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = cli.log_file.is_none().then(|| {
        fmt::layer()
            .with_target(false)
            .with_level(true)
            .with_writer(ProgressAwareWriter::new(bars.clone(), std::io::stderr))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    debug!("Logging initialized at level: {}", cli.log_level());
    Ok(())
}
