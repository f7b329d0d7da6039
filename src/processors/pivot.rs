use crate::error::{ProcessingError, Result};
use crate::models::{Diagnostic, DiagnosticKind, LabRecord, ReportRow, SampleDate, StationProfile};
use crate::processors::cleaner::CleanedTable;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Pivoted rows for one station plus every record-level drop made on the way
#[derive(Debug, Clone, PartialEq)]
pub struct PivotOutput {
    pub rows: Vec<ReportRow>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Group under construction: the row and which slots have been written
struct GroupState {
    row: ReportRow,
    written: Vec<bool>,
}

/// Reshapes long-format lab records into one fixed-width row per (station, date)
pub struct PivotEngine;

impl PivotEngine {
    pub fn new() -> Self {
        Self
    }

    /// Pivot the cleaned records of `profile`'s station.
    ///
    /// Records are visited in input order and the last write to a slot wins.
    /// Unknown parameter codes and unparseable dates are skipped and reported
    /// as diagnostics; a group whose records all miss the catalog still yields
    /// an all-empty row.
    pub fn pivot(&self, cleaned: &CleanedTable, profile: &StationProfile) -> Result<PivotOutput> {
        let station_records: Vec<&LabRecord> = cleaned
            .records()
            .iter()
            .filter(|r| r.station_id == profile.station_id())
            .collect();

        if station_records.is_empty() {
            return Err(ProcessingError::EmptyInput {
                station_id: profile.station_id().to_string(),
            });
        }

        let station_rows: HashSet<usize> = station_records.iter().map(|r| r.source_row).collect();
        let mut diagnostics: Vec<Diagnostic> = cleaned
            .diagnostics()
            .iter()
            .filter(|d| station_rows.contains(&d.source_row))
            .cloned()
            .collect();

        let catalog = profile.catalog();
        let width = catalog.len();
        let mut groups: BTreeMap<(&str, NaiveDate), GroupState> = BTreeMap::new();

        for record in station_records {
            let date = match &record.date {
                SampleDate::Valid(date) => *date,
                SampleDate::Unparseable(value) => {
                    debug!(
                        "Skipping row {} for {}: unparseable date '{}'",
                        record.source_row,
                        profile.station_id(),
                        value
                    );
                    diagnostics.push(Diagnostic::new(
                        record.source_row,
                        DiagnosticKind::UnparseableDate {
                            value: value.clone(),
                        },
                    ));
                    continue;
                }
            };

            let group = groups
                .entry((record.station_id.as_str(), date))
                .or_insert_with(|| GroupState {
                    row: ReportRow::empty(&record.station_id, date, width),
                    written: vec![false; width],
                });

            let Some(slot) = catalog.slot_of(&record.parameter_code) else {
                diagnostics.push(Diagnostic::new(
                    record.source_row,
                    DiagnosticKind::UnknownParameter {
                        code: record.parameter_code.clone(),
                    },
                ));
                continue;
            };

            if group.written[slot - 1] {
                diagnostics.push(Diagnostic::new(
                    record.source_row,
                    DiagnosticKind::SupersededResult {
                        code: record.parameter_code.clone(),
                        previous: group.row.slot(slot),
                        replacement: record.result,
                    },
                ));
            }
            group.row.set_slot(slot, record.result);
            group.written[slot - 1] = true;
        }

        let rows: Vec<ReportRow> = groups.into_values().map(|g| g.row).collect();
        diagnostics.sort_by_key(|d| d.source_row);

        debug!(
            "Pivoted {} into {} rows ({} diagnostics)",
            profile.station_id(),
            rows.len(),
            diagnostics.len()
        );

        Ok(PivotOutput { rows, diagnostics })
    }
}

impl Default for PivotEngine {
    fn default() -> Self {
        Self::new()
    }
}
