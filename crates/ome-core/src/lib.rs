//! ome-core: shared data contracts for the OME selection engine.
//!
//! Holds the declarative resources the selectors consume (models, serving
//! runtimes, accelerator classes, inference services), the parameter-size
//! parser, model version comparison and the engine configuration file.

pub mod config;
pub mod size;
pub mod types;
pub mod version;

pub use config::{ConfigError, EngineConfig};
pub use size::{SizeError, parse_model_size};
pub use types::*;
pub use version::{ModelVersion, VersionError};
