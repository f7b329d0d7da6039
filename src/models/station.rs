use crate::error::Result;
use crate::models::catalog::ParameterCatalog;
use crate::utils::constants::REQUIRED_COLUMNS;
use crate::utils::filename::table_id_for_station;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_required_columns() -> Vec<String> {
    REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// Station profile as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationProfileConfig {
    #[validate(length(min = 1))]
    pub station_id: String,

    #[validate(length(min = 1))]
    pub parameter_order: Vec<String>,

    #[serde(default = "default_required_columns")]
    #[validate(length(min = 1))]
    pub required_columns: Vec<String>,

    /// Output table identity; defaults to `{dataset}.{station}_analysis`
    #[serde(default)]
    pub table: Option<String>,
}

impl StationProfileConfig {
    pub fn new(station_id: &str, parameter_order: &[&str]) -> Self {
        Self {
            station_id: station_id.to_string(),
            parameter_order: parameter_order.iter().map(|p| p.to_string()).collect(),
            required_columns: default_required_columns(),
            table: None,
        }
    }
}

/// Static per-station configuration: input contract, catalog and output table
#[derive(Debug, Clone, PartialEq)]
pub struct StationProfile {
    station_id: String,
    required_columns: Vec<String>,
    catalog: ParameterCatalog,
    table_id: String,
}

impl StationProfile {
    pub fn from_config(config: &StationProfileConfig, dataset: &str) -> Result<Self> {
        config.validate()?;

        let catalog = ParameterCatalog::new(&config.station_id, &config.parameter_order)?;
        let table_id = config
            .table
            .clone()
            .unwrap_or_else(|| table_id_for_station(dataset, &config.station_id));

        Ok(Self {
            station_id: config.station_id.clone(),
            required_columns: config.required_columns.clone(),
            catalog,
            table_id,
        })
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn required_columns(&self) -> &[String] {
        &self.required_columns
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn slot_count(&self) -> usize {
        self.catalog.len()
    }
}
