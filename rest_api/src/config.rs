// rest_api/src/config.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use anyhow::Result;

pub const DEFAULT_REST_API_PORT: u16 = 8082;
pub const DEFAULT_DATA_DIRECTORY: &str = "/tmp/registration_data";

/// Configuration for the REST API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
    pub storage_engine: String,
    pub data_directory: String,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        RestApiConfig {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_REST_API_PORT,
            storage_engine: StorageEngineType::Memory.to_string(),
            data_directory: DEFAULT_DATA_DIRECTORY.to_string(),
        }
    }
}

// Wrapper struct to match the 'rest_api:' key in the YAML config.
#[derive(Debug, Deserialize)]
struct RestApiConfigWrapper {
    rest_api: RestApiConfig,
}

/// Loads the REST API configuration from `rest_api_config.yaml`, falling
/// back to defaults when no config file is present.
pub fn load_rest_api_config(config_file_path: Option<PathBuf>) -> Result<RestApiConfig> {
    let default_config_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("rest_api_config.yaml");
    let path_to_use = config_file_path.unwrap_or(default_config_path);

    if !path_to_use.exists() {
        return Ok(RestApiConfig::default());
    }

    let config_content = fs::read_to_string(&path_to_use).map_err(|e| {
        anyhow::anyhow!("Failed to read config file {}: {}", path_to_use.display(), e)
    })?;
    let wrapper: RestApiConfigWrapper = serde_yaml2::from_str(&config_content).map_err(|e| {
        anyhow::anyhow!("Failed to parse config file {}: {}", path_to_use.display(), e)
    })?;

    Ok(wrapper.rest_api)
}

/// Enum for the supported account store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEngineType {
    Memory,
    Sled,
}

impl FromStr for StorageEngineType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageEngineType::Memory),
            "sled" => Ok(StorageEngineType::Sled),
            _ => Err(anyhow::anyhow!("Unknown storage engine type: {}", s)),
        }
    }
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::Memory => write!(f, "memory"),
            StorageEngineType::Sled => write!(f, "sled"),
        }
    }
}
