//! Configuration schema.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::app::requirements::RefreshSettings;
use crate::impls::{PlainKeyFactory, QualifiedKeyFactory};
use crate::ports::KeyFactory;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub requirements: RequirementsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Qualifier of the alternate store keys. Plain keys when absent.
    pub key_qualifier: Option<String>,
    pub slow_query_threshold_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_qualifier: None,
            slow_query_threshold_ms: 25,
        }
    }
}

impl StorageConfig {
    pub fn key_factory(&self) -> Arc<dyn KeyFactory> {
        match &self.key_qualifier {
            Some(qualifier) => Arc::new(QualifiedKeyFactory::new(qualifier.clone())),
            None => Arc::new(PlainKeyFactory),
        }
    }

    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_threshold_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsConfig {
    pub package: String,
    pub version_file: PathBuf,
    pub output: PathBuf,
    pub python: String,
}

impl Default for RequirementsConfig {
    fn default() -> Self {
        Self {
            package: "pex".to_string(),
            version_file: PathBuf::from("build-support/pex_version"),
            output: PathBuf::from("build-support/requirements.txt"),
            python: "python3".to_string(),
        }
    }
}

impl From<&RequirementsConfig> for RefreshSettings {
    fn from(config: &RequirementsConfig) -> Self {
        RefreshSettings {
            package: config.package.clone(),
            version_file: config.version_file.clone(),
            output: config.output.clone(),
            python: config.python.clone(),
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(qualifier) = &self.storage.key_qualifier {
            require_non_empty("storage.key_qualifier", qualifier)?;
        }
        require_non_empty("requirements.package", &self.requirements.package)?;
        require_non_empty("requirements.python", &self.requirements.python)?;
        Ok(())
    }
}
