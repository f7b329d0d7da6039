use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Missing required columns for station {station_id}: {missing:?}")]
    Schema {
        station_id: String,
        missing: Vec<String>,
    },

    #[error("Upload must contain a '{column}' column")]
    MissingStationColumn { column: String },

    #[error("Station {station_id} has no registered profile")]
    UnknownStation { station_id: String },

    #[error("No data found for {station_id} station")]
    EmptyInput { station_id: String },

    #[error("Parameter catalog for {station_id} lists '{code}' more than once")]
    DuplicateParameter { station_id: String, code: String },

    #[error("Table {table_id} does not exist")]
    TableNotFound { table_id: String },

    #[error("Unsupported chart type: {0}")]
    UnsupportedChart(String),

    #[error("Spreadsheet error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Excel export error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// Errors that end one station's run without ending the batch.
    pub fn is_station_scoped(&self) -> bool {
        matches!(
            self,
            ProcessingError::Schema { .. }
                | ProcessingError::UnknownStation { .. }
                | ProcessingError::EmptyInput { .. }
        )
    }
}
