pub mod catalog;
pub mod raw;
pub mod record;
pub mod report;
pub mod station;

pub use catalog::{slot_column_name, ParameterCatalog};
pub use raw::RawTable;
pub use record::{Diagnostic, DiagnosticCounts, DiagnosticKind, LabRecord, SampleDate};
pub use report::{ReportRow, ReportTable, ReportTableRow};
pub use station::{StationProfile, StationProfileConfig};
