use crate::utils::constants::{TABLE_FILE_EXTENSION, TABLE_SUFFIX};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Generate default export filename with format: {station}_filtered_data_{start}_{end}.csv
pub fn generate_default_export_filename(
    station_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> PathBuf {
    PathBuf::from(format!(
        "{}_filtered_data_{}_{}.csv",
        station_id, start, end
    ))
}

/// Table identity for a station inside a dataset, e.g. `water_analysis.ct_analysis`
pub fn table_id_for_station(dataset: &str, station_id: &str) -> String {
    format!("{}.{}{}", dataset, station_id.to_lowercase(), TABLE_SUFFIX)
}

/// Resolve a `dataset.table` identity to its Parquet file under the storage root
pub fn table_file_path(root: &Path, table_id: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in table_id.split('.').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path.set_extension(TABLE_FILE_EXTENSION);
    path
}
