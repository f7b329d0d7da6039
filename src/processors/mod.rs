pub mod assembler;
pub mod cleaner;
pub mod pipeline;
pub mod pivot;
pub mod validator;

pub use assembler::ReportAssembler;
pub use cleaner::{CleanedTable, RawCleaner};
pub use pipeline::{BatchProcessor, BatchReport, StationOutcome, StationPipeline, StationReport, StationStatus};
pub use pivot::{PivotEngine, PivotOutput};
pub use validator::RecordValidator;
