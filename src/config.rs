use crate::error::Result;
use crate::models::StationProfileConfig;
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_DATASET, DEFAULT_ROW_GROUP_SIZE, DEFAULT_STORAGE_ROOT, ENV_PREFIX,
};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Where pivoted station tables are stored
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StorageConfig {
    pub root: PathBuf,

    #[validate(length(min = 1))]
    pub dataset: String,

    #[validate(length(min = 1))]
    pub compression: String,

    /// Maximum rows per Parquet row group
    #[validate(range(min = 1))]
    pub row_group_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            dataset: DEFAULT_DATASET.to_string(),
            compression: COMPRESSION_SNAPPY.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }
}

/// Application configuration, built once and passed to the components that need it
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub storage: StorageConfig,

    /// Station profiles that replace or extend the built-in ones
    #[serde(default)]
    #[validate(nested)]
    pub stations: Vec<StationProfileConfig>,
}

impl AppConfig {
    /// Defaults, then an optional TOML file, then `WQ_*` environment variables
    /// (`WQ_STORAGE__ROOT=/srv/wq` sets `storage.root`)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        Self::finish(builder)
    }

    /// Defaults overlaid with an in-memory TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("storage.root", DEFAULT_STORAGE_ROOT)?
            .set_default("storage.dataset", DEFAULT_DATASET)?
            .set_default("storage.compression", COMPRESSION_SNAPPY)?
            .set_default("storage.row_group_size", DEFAULT_ROW_GROUP_SIZE as i64)?)
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
