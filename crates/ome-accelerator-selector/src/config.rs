//! Resolved accelerator selector settings.

use ome_core::EngineConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceleratorSelectorConfig {
    /// Reject classes whose live inventory reports no free units.
    pub consider_availability: bool,
}

impl From<&EngineConfig> for AcceleratorSelectorConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            consider_availability: config.consider_availability(),
        }
    }
}
