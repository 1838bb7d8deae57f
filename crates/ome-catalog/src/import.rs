//! TOML catalog files.
//!
//! ```toml
//! [[namespace_runtimes]]
//! name = "vllm"
//! namespace = "prod"
//!
//! [[cluster_runtimes]]
//! name = "sglang"
//!
//! [[accelerator_classes]]
//! name = "H100"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use ome_core::{AcceleratorClass, ClusterServingRuntime, ServingRuntime};

use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub namespace_runtimes: Vec<ServingRuntime>,
    pub cluster_runtimes: Vec<ClusterServingRuntime>,
    pub accelerator_classes: Vec<AcceleratorClass>,
}

/// Object counts written by [`crate::CatalogStore::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub namespace_runtimes: usize,
    pub cluster_runtimes: usize,
    pub accelerator_classes: usize,
}

impl CatalogFile {
    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::File {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn is_empty(&self) -> bool {
        self.namespace_runtimes.is_empty()
            && self.cluster_runtimes.is_empty()
            && self.accelerator_classes.is_empty()
    }
}
