use crate::error::{ProcessingError, Result};
use crate::models::{RawTable, StationProfile};

/// Column-presence contract for raw long-format input
pub struct RecordValidator {
    station_id: String,
    required_columns: Vec<String>,
}

impl RecordValidator {
    pub fn new(station_id: &str, required_columns: &[String]) -> Self {
        Self {
            station_id: station_id.to_string(),
            required_columns: required_columns.to_vec(),
        }
    }

    pub fn for_profile(profile: &StationProfile) -> Self {
        Self::new(profile.station_id(), profile.required_columns())
    }

    /// Fail with every required column the table lacks; row values are not inspected
    pub fn validate(&self, table: &RawTable) -> Result<()> {
        let missing: Vec<String> = self
            .required_columns
            .iter()
            .filter(|column| !table.has_column(column))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProcessingError::Schema {
                station_id: self.station_id.clone(),
                missing,
            })
        }
    }
}
