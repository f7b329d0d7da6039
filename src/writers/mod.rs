pub mod csv_export;
pub mod parquet_store;
pub mod xlsx_export;

pub use csv_export::CsvExporter;
pub use parquet_store::{ParquetStore, ReportStore, TableFileInfo};
pub use xlsx_export::XlsxExporter;
