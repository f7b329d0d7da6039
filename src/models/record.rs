use chrono::NaiveDate;
use serde::Serialize;

/// Calendar date derived from a lab timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleDate {
    Valid(NaiveDate),
    /// Timestamp could not be read; the record is kept but never grouped
    Unparseable(String),
}

impl SampleDate {
    pub fn valid(&self) -> Option<NaiveDate> {
        match self {
            SampleDate::Valid(date) => Some(*date),
            SampleDate::Unparseable(_) => None,
        }
    }
}

/// One lab measurement after cleaning
#[derive(Debug, Clone, PartialEq)]
pub struct LabRecord {
    /// Row position in the originally loaded table
    pub source_row: usize,
    pub station_id: String,
    pub date: SampleDate,
    /// Already trimmed
    pub parameter_code: String,
    pub result: Option<f64>,
}

/// A record-level problem that was recovered from rather than raised
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub source_row: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnparseableDate { value: String },
    UnparseableResult { value: String },
    UnknownParameter { code: String },
    SupersededResult {
        code: String,
        previous: Option<f64>,
        replacement: Option<f64>,
    },
}

impl Diagnostic {
    pub fn new(source_row: usize, kind: DiagnosticKind) -> Self {
        Self { source_row, kind }
    }

    pub fn describe(&self) -> String {
        let detail = match &self.kind {
            DiagnosticKind::UnparseableDate { value } => {
                format!("unparseable date '{}', record skipped", value)
            }
            DiagnosticKind::UnparseableResult { value } => {
                format!("non-numeric result '{}' stored as empty", value)
            }
            DiagnosticKind::UnknownParameter { code } => {
                format!("parameter '{}' is not in the catalog, record dropped", code)
            }
            DiagnosticKind::SupersededResult {
                code,
                previous,
                replacement,
            } => format!(
                "'{}' reported twice on the same day, {:?} replaced by {:?}",
                code, previous, replacement
            ),
        };
        format!("row {}: {}", self.source_row + 1, detail)
    }
}

/// Diagnostic totals by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticCounts {
    pub unparseable_dates: usize,
    pub unparseable_results: usize,
    pub unknown_parameters: usize,
    pub superseded_results: usize,
}

impl DiagnosticCounts {
    pub fn tally(diagnostics: &[Diagnostic]) -> Self {
        let mut counts = Self::default();
        for diagnostic in diagnostics {
            match diagnostic.kind {
                DiagnosticKind::UnparseableDate { .. } => counts.unparseable_dates += 1,
                DiagnosticKind::UnparseableResult { .. } => counts.unparseable_results += 1,
                DiagnosticKind::UnknownParameter { .. } => counts.unknown_parameters += 1,
                DiagnosticKind::SupersededResult { .. } => counts.superseded_results += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.unparseable_dates
            + self.unparseable_results
            + self.unknown_parameters
            + self.superseded_results
    }
}
