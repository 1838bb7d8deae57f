//! Engine configuration parser (`engine.toml`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_PRIORITY: i32 = 1;
pub const DEFAULT_MODEL_FORMAT_WEIGHT: i64 = 10;
pub const DEFAULT_MODEL_FRAMEWORK_WEIGHT: i64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub runtime_selector: Option<RuntimeSelectorSection>,
    pub accelerator_selector: Option<AcceleratorSelectorSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSelectorSection {
    pub default_priority: Option<i32>,
    pub model_format_weight: Option<i64>,
    pub model_framework_weight: Option<i64>,
    pub detailed_logging: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcceleratorSelectorSection {
    pub consider_availability: Option<bool>,
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Fully populated config carrying every default.
    pub fn scaffold() -> Self {
        EngineConfig {
            runtime_selector: Some(RuntimeSelectorSection {
                default_priority: Some(DEFAULT_PRIORITY),
                model_format_weight: Some(DEFAULT_MODEL_FORMAT_WEIGHT),
                model_framework_weight: Some(DEFAULT_MODEL_FRAMEWORK_WEIGHT),
                detailed_logging: Some(false),
            }),
            accelerator_selector: Some(AcceleratorSelectorSection {
                consider_availability: Some(false),
            }),
        }
    }

    pub fn default_priority(&self) -> i32 {
        self.runtime_selector
            .as_ref()
            .and_then(|s| s.default_priority)
            .unwrap_or(DEFAULT_PRIORITY)
    }

    pub fn model_format_weight(&self) -> i64 {
        self.runtime_selector
            .as_ref()
            .and_then(|s| s.model_format_weight)
            .unwrap_or(DEFAULT_MODEL_FORMAT_WEIGHT)
    }

    pub fn model_framework_weight(&self) -> i64 {
        self.runtime_selector
            .as_ref()
            .and_then(|s| s.model_framework_weight)
            .unwrap_or(DEFAULT_MODEL_FRAMEWORK_WEIGHT)
    }

    pub fn detailed_logging(&self) -> bool {
        self.runtime_selector
            .as_ref()
            .and_then(|s| s.detailed_logging)
            .unwrap_or(false)
    }

    pub fn consider_availability(&self) -> bool {
        self.accelerator_selector
            .as_ref()
            .and_then(|s| s.consider_availability)
            .unwrap_or(false)
    }
}
