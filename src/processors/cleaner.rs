use crate::error::{ProcessingError, Result};
use crate::models::{Diagnostic, DiagnosticKind, LabRecord, RawTable, SampleDate};
use crate::utils::constants::{DATE_TIME_COLUMN, PCODE_COLUMN, RESULT_COLUMN, STATION_ID_COLUMN};
use crate::utils::dates::parse_sample_date;
use std::collections::HashSet;
use tracing::debug;

/// Normalised long-format table ready for pivoting
///
/// Keeps every original column (trimmed headers, trimmed parameter codes) next to
/// the derived sample date, plus the typed records the pivot consumes.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    dates: Vec<SampleDate>,
    records: Vec<LabRecord>,
    diagnostics: Vec<Diagnostic>,
    duplicates_removed: usize,
    empty_rows_removed: usize,
}

impl CleanedTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Derived date column, aligned with `rows`
    pub fn dates(&self) -> &[SampleDate] {
        &self.dates
    }

    pub fn records(&self) -> &[LabRecord] {
        &self.records
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }

    pub fn empty_rows_removed(&self) -> usize {
        self.empty_rows_removed
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct RawCleaner;

impl RawCleaner {
    pub fn new() -> Self {
        Self
    }

    pub fn clean(&self, table: &RawTable) -> Result<CleanedTable> {
        // Exact duplicates first, then rows with nothing in them
        let mut seen = HashSet::new();
        let mut duplicates_removed = 0;
        let mut empty_rows_removed = 0;
        let mut kept: Vec<(usize, Vec<Option<String>>)> = Vec::with_capacity(table.len());

        for (row, origin) in table.rows().iter().zip(table.origins()) {
            if !seen.insert(row) {
                duplicates_removed += 1;
                continue;
            }
            if row.iter().all(Option::is_none) {
                empty_rows_removed += 1;
                continue;
            }
            kept.push((*origin, row.clone()));
        }

        let headers: Vec<String> = table.headers().iter().map(|h| h.trim().to_string()).collect();
        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ProcessingError::InvalidFormat(format!("Column '{}' not found in input", name))
            })
        };
        let station_idx = column(STATION_ID_COLUMN)?;
        let timestamp_idx = column(DATE_TIME_COLUMN)?;
        let pcode_idx = column(PCODE_COLUMN)?;
        let result_idx = column(RESULT_COLUMN)?;

        let mut rows = Vec::with_capacity(kept.len());
        let mut dates = Vec::with_capacity(kept.len());
        let mut records = Vec::with_capacity(kept.len());
        let mut diagnostics = Vec::new();

        for (origin, mut row) in kept {
            if let Some(code) = row[pcode_idx].as_mut() {
                if code.trim().len() != code.len() {
                    *code = code.trim().to_string();
                }
            }

            let date = match row[timestamp_idx].as_deref() {
                Some(raw) => match parse_sample_date(raw) {
                    Some(date) => SampleDate::Valid(date),
                    None => SampleDate::Unparseable(raw.to_string()),
                },
                None => SampleDate::Unparseable(String::new()),
            };

            let result = match row[result_idx].as_deref() {
                Some(raw) => match parse_result(raw) {
                    Some(value) => value,
                    None => {
                        diagnostics.push(Diagnostic::new(
                            origin,
                            DiagnosticKind::UnparseableResult {
                                value: raw.to_string(),
                            },
                        ));
                        None
                    }
                },
                None => None,
            };

            records.push(LabRecord {
                source_row: origin,
                station_id: row[station_idx].clone().unwrap_or_default(),
                date: date.clone(),
                parameter_code: row[pcode_idx].clone().unwrap_or_default(),
                result,
            });
            dates.push(date);
            rows.push(row);
        }

        debug!(
            "Cleaned {} rows: {} duplicates and {} empty rows removed",
            rows.len(),
            duplicates_removed,
            empty_rows_removed
        );

        Ok(CleanedTable {
            headers,
            rows,
            dates,
            records,
            diagnostics,
            duplicates_removed,
            empty_rows_removed,
        })
    }
}

impl Default for RawCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// `Some(None)` is an explicit missing value, `None` means the text is not a number
fn parse_result(raw: &str) -> Option<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_nan() => Some(None),
        Ok(value) => Some(Some(value)),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADERS: [&str; 4] = ["Station_ID", "Date_Time", "PCode", "Result"];

    #[test]
    fn test_exact_duplicates_removed() {
        let table = RawTable::from_str_rows(
            &HEADERS,
            &[
                &["CT", "2021-01-05T08:00", "FLOW, IN", "10"],
                &["CT", "2021-01-05T08:00", "FLOW, IN", "10"],
                &["CT", "2021-01-05T08:00", "FLOW, IN", "11"],
            ],
        )
        .unwrap();

        let cleaned = RawCleaner::new().clean(&table).unwrap();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.duplicates_removed(), 1);
        assert_eq!(cleaned.records()[1].result, Some(11.0));
        assert_eq!(cleaned.records()[1].source_row, 2);
    }

    #[test]
    fn test_fully_empty_rows_removed() {
        let table = RawTable::from_str_rows(
            &HEADERS,
            &[
                &["", "", "", ""],
                &["CT", "", "", ""],
                &["", "", "", ""],
            ],
        )
        .unwrap();

        let cleaned = RawCleaner::new().clean(&table).unwrap();
        // The second blank row is an exact duplicate of the first
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.duplicates_removed(), 1);
        assert_eq!(cleaned.empty_rows_removed(), 1);
    }

    #[test]
    fn test_headers_and_codes_trimmed() {
        let table = RawTable::from_str_rows(
            &[" Station_ID", "Date_Time ", " PCode ", "Result", " Notes "],
            &[&["CT", "2021-01-05", "  BOD, IN ", "5", " keep  "]],
        )
        .unwrap();

        let cleaned = RawCleaner::new().clean(&table).unwrap();
        assert_eq!(
            cleaned.headers(),
            &["Station_ID", "Date_Time", "PCode", "Result", "Notes"]
        );
        assert_eq!(cleaned.records()[0].parameter_code, "BOD, IN");
        assert_eq!(cleaned.rows()[0][2].as_deref(), Some("BOD, IN"));
        // Only the parameter code field is trimmed
        assert_eq!(cleaned.rows()[0][4].as_deref(), Some(" keep  "));
    }

    #[test]
    fn test_bad_dates_marked_not_fatal() {
        let table = RawTable::from_str_rows(
            &HEADERS,
            &[
                &["CT", "garbage", "FLOW, IN", "1"],
                &["CT", "", "FLOW, IN", "2"],
                &["CT", "2021-01-05 14:00", "FLOW, IN", "3"],
            ],
        )
        .unwrap();

        let cleaned = RawCleaner::new().clean(&table).unwrap();
        assert_eq!(
            cleaned.dates()[0],
            SampleDate::Unparseable("garbage".to_string())
        );
        assert_eq!(cleaned.dates()[1], SampleDate::Unparseable(String::new()));
        assert_eq!(
            cleaned.dates()[2],
            SampleDate::Valid(NaiveDate::from_ymd_opt(2021, 1, 5).unwrap())
        );
    }

    #[test]
    fn test_non_numeric_results_become_null() {
        let table = RawTable::from_str_rows(
            &HEADERS,
            &[
                &["CT", "2021-01-05", "FC, EFF", "<2"],
                &["CT", "2021-01-05", "PH, IN", " 7.25 "],
                &["CT", "2021-01-05", "TN, L", ""],
            ],
        )
        .unwrap();

        let cleaned = RawCleaner::new().clean(&table).unwrap();
        assert_eq!(cleaned.records()[0].result, None);
        assert_eq!(cleaned.records()[1].result, Some(7.25));
        assert_eq!(cleaned.records()[2].result, None);
        assert_eq!(cleaned.diagnostics().len(), 1);
        assert_eq!(
            cleaned.diagnostics()[0].kind,
            DiagnosticKind::UnparseableResult {
                value: "<2".to_string()
            }
        );
    }

    #[test]
    fn test_missing_columns_after_trim() {
        let table = RawTable::from_str_rows(&["Station_ID", "PCode"], &[&["CT", "PH"]]).unwrap();
        assert!(RawCleaner::new().clean(&table).is_err());
    }
}
