/// Raw input column names
pub const STATION_ID_COLUMN: &str = "Station_ID";
pub const DATE_TIME_COLUMN: &str = "Date_Time";
pub const PCODE_COLUMN: &str = "PCode";
pub const RESULT_COLUMN: &str = "Result";

pub const REQUIRED_COLUMNS: [&str; 4] = [
    STATION_ID_COLUMN,
    DATE_TIME_COLUMN,
    PCODE_COLUMN,
    RESULT_COLUMN,
];

/// Report column names
pub const STATION_COLUMN: &str = "Station";
pub const DATES_COLUMN: &str = "Dates";
pub const SLOT_COLUMN_PREFIX: &str = "Data";

/// Canonical report date format
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Built-in stations
pub const STATION_CT: &str = "CT";
pub const STATION_TUS: &str = "TUS";

/// Parameter order shared by the built-in station profiles
pub const DEFAULT_PARAMETER_ORDER: [&str; 25] = [
    "FLOW, IN", "BOD, IN", "TSS, IN", "TEMP, IN", "PH, IN",
    "FLOW, EFF", "BOD, EFF", "TSS, EFF", "TEMP, EFF", "PH, EFF",
    "DO, IN", "DO, EFF", "FC, EFF", "NH4, EFF", "TN, EFF", "TP, EFF",
    "FC, IN", "BOD CALC", "BOD, REM", "TSS, REM", "BOD, L", "TSS, L",
    "NH4, L", "TN, L", "TP, L",
];

/// Storage defaults
pub const DEFAULT_STORAGE_ROOT: &str = "data";
pub const DEFAULT_DATASET: &str = "water_analysis";
pub const TABLE_SUFFIX: &str = "_analysis";
pub const TABLE_FILE_EXTENSION: &str = "parquet";
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Worksheet name of Excel exports
pub const EXPORT_SHEET_NAME: &str = "Data";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "WQ";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Chart axis defaults
pub const DEFAULT_X_AXIS_TITLE: &str = "Date";
pub const DEFAULT_Y_AXIS_TITLE: &str = "Value";
