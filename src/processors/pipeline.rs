use crate::error::{ProcessingError, Result};
use crate::models::{Diagnostic, DiagnosticCounts, RawTable, ReportTable, StationProfile};
use crate::processors::{PivotEngine, RawCleaner, RecordValidator, ReportAssembler};
use crate::registry::StationRegistry;
use crate::utils::constants::STATION_ID_COLUMN;
use crate::utils::progress::ProgressReporter;
use crate::writers::ReportStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Assembled report for one station plus the record-level drops behind it
#[derive(Debug, Clone, PartialEq)]
pub struct StationReport {
    pub station_id: String,
    pub table_id: String,
    pub table: ReportTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl StationReport {
    pub fn diagnostic_counts(&self) -> DiagnosticCounts {
        DiagnosticCounts::tally(&self.diagnostics)
    }
}

/// validate -> filter to station -> clean -> pivot -> assemble
pub struct StationPipeline {
    cleaner: RawCleaner,
    engine: PivotEngine,
}

impl StationPipeline {
    pub fn new() -> Self {
        Self {
            cleaner: RawCleaner::new(),
            engine: PivotEngine::new(),
        }
    }

    pub fn process(&self, raw: &RawTable, profile: &StationProfile) -> Result<StationReport> {
        RecordValidator::for_profile(profile).validate(raw)?;

        let station_rows = raw.filter_by_value(STATION_ID_COLUMN, profile.station_id());
        if station_rows.is_empty() {
            return Err(ProcessingError::EmptyInput {
                station_id: profile.station_id().to_string(),
            });
        }

        let cleaned = self.cleaner.clean(&station_rows)?;
        debug!(
            "{}: {} rows after cleaning ({} duplicates, {} empty removed)",
            profile.station_id(),
            cleaned.len(),
            cleaned.duplicates_removed(),
            cleaned.empty_rows_removed()
        );

        let pivoted = self.engine.pivot(&cleaned, profile)?;
        let table = ReportAssembler::new(profile.slot_count()).assemble(&pivoted.rows)?;

        Ok(StationReport {
            station_id: profile.station_id().to_string(),
            table_id: profile.table_id().to_string(),
            table,
            diagnostics: pivoted.diagnostics,
        })
    }
}

impl Default for StationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to one station of an upload
#[derive(Debug, Clone, Serialize)]
pub struct StationOutcome {
    pub station_id: String,
    #[serde(flatten)]
    pub status: StationStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StationStatus {
    Stored {
        table_id: String,
        rows: usize,
        counts: DiagnosticCounts,
        diagnostics: Vec<Diagnostic>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

impl StationOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self.status, StationStatus::Stored { .. })
    }

    pub fn summary(&self) -> String {
        match &self.status {
            StationStatus::Stored {
                table_id,
                rows,
                counts,
                ..
            } => format!(
                "{}: stored {} rows in {} ({} records dropped or replaced)",
                self.station_id,
                rows,
                table_id,
                counts.total()
            ),
            StationStatus::Skipped { reason } => format!("{}: skipped, {}", self.station_id, reason),
            StationStatus::Failed { error } => format!("{}: failed, {}", self.station_id, error),
        }
    }
}

/// Per-station outcomes of one upload, in order of first appearance
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total_rows: usize,
    pub outcomes: Vec<StationOutcome>,
}

impl BatchReport {
    pub fn stored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_stored()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StationStatus::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StationStatus::Failed { .. }))
            .count()
    }

    pub fn outcome(&self, station_id: &str) -> Option<&StationOutcome> {
        self.outcomes.iter().find(|o| o.station_id == station_id)
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Upload of {} rows: {} stations stored, {} skipped, {} failed",
            self.total_rows,
            self.stored(),
            self.skipped(),
            self.failed()
        )];
        lines.extend(self.outcomes.iter().map(|o| format!("  {}", o.summary())));
        lines.join("\n")
    }
}

/// Best-effort driver over every station present in an upload.
///
/// Stations run one after another. A station that fails is recorded and the
/// next one is attempted; a stored table is replaced as a whole or not at all.
pub struct BatchProcessor<S: ReportStore + 'static> {
    registry: StationRegistry,
    store: Arc<S>,
    pipeline: StationPipeline,
}

impl<S: ReportStore + 'static> BatchProcessor<S> {
    pub fn new(registry: StationRegistry, store: Arc<S>) -> Self {
        Self {
            registry,
            store,
            pipeline: StationPipeline::new(),
        }
    }

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    pub async fn process_upload(
        &self,
        raw: &RawTable,
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchReport> {
        if !raw.has_column(STATION_ID_COLUMN) {
            return Err(ProcessingError::MissingStationColumn {
                column: STATION_ID_COLUMN.to_string(),
            });
        }

        let stations = raw.distinct_values(STATION_ID_COLUMN);
        info!("Upload of {} rows covers {} stations", raw.len(), stations.len());

        let mut report = BatchReport {
            total_rows: raw.len(),
            outcomes: Vec::with_capacity(stations.len()),
        };

        for (index, station_id) in stations.iter().enumerate() {
            if let Some(p) = progress {
                p.station_started(station_id, index, stations.len());
            }

            let status = match self.registry.resolve(station_id) {
                Ok(profile) => self.process_station(raw, profile).await,
                Err(e) => {
                    warn!("Skipping station {}: {}", station_id, e);
                    StationStatus::Skipped {
                        reason: e.to_string(),
                    }
                }
            };

            report.outcomes.push(StationOutcome {
                station_id: station_id.clone(),
                status,
            });
        }

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Stored {} of {} stations",
                report.stored(),
                stations.len()
            ));
        }

        Ok(report)
    }

    async fn process_station(&self, raw: &RawTable, profile: &StationProfile) -> StationStatus {
        let station_report = match self.pipeline.process(raw, profile) {
            Ok(report) => report,
            Err(e) => return failed(profile.station_id(), e),
        };

        let rows = station_report.table.len();
        let table_id = station_report.table_id.clone();
        let store = Arc::clone(&self.store);
        let table = station_report.table;
        let target = table_id.clone();

        let written = tokio::task::spawn_blocking(move || store.overwrite(&target, &table))
            .await
            .map_err(ProcessingError::from)
            .and_then(|result| result);

        match written {
            Ok(()) => {
                let counts = DiagnosticCounts::tally(&station_report.diagnostics);
                info!(
                    "Stored {} rows for station {} in {} ({} diagnostics)",
                    rows,
                    profile.station_id(),
                    table_id,
                    counts.total()
                );
                StationStatus::Stored {
                    table_id,
                    rows,
                    counts,
                    diagnostics: station_report.diagnostics,
                }
            }
            Err(e) => failed(profile.station_id(), e),
        }
    }
}

fn failed(station_id: &str, e: ProcessingError) -> StationStatus {
    if e.is_station_scoped() {
        warn!("Station {} not processed: {}", station_id, e);
    } else {
        error!("Station {} failed: {}", station_id, e);
    }
    StationStatus::Failed {
        error: e.to_string(),
    }
}
