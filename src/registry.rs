use crate::config::AppConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{StationProfile, StationProfileConfig};
use crate::utils::constants::{DEFAULT_PARAMETER_ORDER, STATION_CT, STATION_TUS};
use std::collections::BTreeMap;
use tracing::debug;

/// Profiles of the stations this deployment knows out of the box
pub fn default_profile_configs() -> Vec<StationProfileConfig> {
    [STATION_CT, STATION_TUS]
        .iter()
        .map(|station| StationProfileConfig::new(station, &DEFAULT_PARAMETER_ORDER))
        .collect()
}

/// Station id to profile lookup, loaded once per process
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    profiles: BTreeMap<String, StationProfile>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in `CT` and `TUS` profiles writing into `dataset`
    pub fn with_defaults(dataset: &str) -> Result<Self> {
        let mut registry = Self::new();
        for config in default_profile_configs() {
            registry.register(StationProfile::from_config(&config, dataset)?);
        }
        Ok(registry)
    }

    /// Built-in profiles overlaid with the configured ones; a configured
    /// station with a built-in id replaces it
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let dataset = &config.storage.dataset;
        let mut registry = Self::with_defaults(dataset)?;

        for station in &config.stations {
            let profile = StationProfile::from_config(station, dataset)?;
            if registry.register(profile).is_some() {
                debug!("Configured profile replaces built-in station {}", station.station_id);
            }
        }

        Ok(registry)
    }

    pub fn register(&mut self, profile: StationProfile) -> Option<StationProfile> {
        self.profiles
            .insert(profile.station_id().to_string(), profile)
    }

    pub fn resolve(&self, station_id: &str) -> Result<&StationProfile> {
        self.profiles
            .get(station_id)
            .ok_or_else(|| ProcessingError::UnknownStation {
                station_id: station_id.to_string(),
            })
    }

    pub fn station_ids(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &StationProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stations() {
        let registry = StationRegistry::with_defaults("water_analysis").unwrap();

        assert_eq!(registry.station_ids(), vec!["CT", "TUS"]);
        let ct = registry.resolve("CT").unwrap();
        assert_eq!(ct.slot_count(), 25);
        assert_eq!(ct.table_id(), "water_analysis.ct_analysis");
        assert_eq!(ct.catalog().slot_of("FLOW, IN"), Some(1));
        assert_eq!(ct.catalog().slot_of("TP, L"), Some(25));
        assert_eq!(
            registry.resolve("TUS").unwrap().table_id(),
            "water_analysis.tus_analysis"
        );
    }

    #[test]
    fn test_unknown_station() {
        let registry = StationRegistry::with_defaults("water_analysis").unwrap();
        let err = registry.resolve("XYZ").unwrap_err();
        assert!(matches!(err, ProcessingError::UnknownStation { ref station_id } if station_id == "XYZ"));
    }

    #[test]
    fn test_config_overrides_and_extends() {
        let config = AppConfig::from_toml_str(
            r#"
            [storage]
            dataset = "lab"

            [[stations]]
            station_id = "TUS"
            parameter_order = ["PH, IN", "FLOW, IN"]

            [[stations]]
            station_id = "NORTH"
            parameter_order = ["DO, EFF"]
            table = "lab.north_plant"
            "#,
        )
        .unwrap();

        let registry = StationRegistry::from_config(&config).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.resolve("CT").unwrap().slot_count(), 25);
        let tus = registry.resolve("TUS").unwrap();
        assert_eq!(tus.slot_count(), 2);
        assert_eq!(tus.catalog().slot_of("FLOW, IN"), Some(2));
        assert_eq!(tus.table_id(), "lab.tus_analysis");
        assert_eq!(registry.resolve("NORTH").unwrap().table_id(), "lab.north_plant");
    }

    #[test]
    fn test_duplicate_codes_in_config_fail() {
        let config = AppConfig::from_toml_str(
            r#"
            [[stations]]
            station_id = "CT"
            parameter_order = ["PH, IN", "PH, IN"]
            "#,
        )
        .unwrap();

        assert!(StationRegistry::from_config(&config).is_err());
    }
}
