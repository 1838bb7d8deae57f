//! Resolved runtime selector settings.

use ome_core::EngineConfig;
use ome_core::config::{DEFAULT_MODEL_FORMAT_WEIGHT, DEFAULT_MODEL_FRAMEWORK_WEIGHT, DEFAULT_PRIORITY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSelectorConfig {
    /// Priority used when a supported-format entry sets none.
    pub default_priority: i32,
    /// Format weight used when an entry's weight is zero.
    pub model_format_weight: i64,
    /// Framework weight used when an entry's weight is zero.
    pub model_framework_weight: i64,
    /// Log per-candidate exclusions at info instead of debug.
    pub detailed_logging: bool,
}

impl Default for RuntimeSelectorConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            model_format_weight: DEFAULT_MODEL_FORMAT_WEIGHT,
            model_framework_weight: DEFAULT_MODEL_FRAMEWORK_WEIGHT,
            detailed_logging: false,
        }
    }
}

impl From<&EngineConfig> for RuntimeSelectorConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            default_priority: config.default_priority(),
            model_format_weight: config.model_format_weight(),
            model_framework_weight: config.model_framework_weight(),
            detailed_logging: config.detailed_logging(),
        }
    }
}
