pub mod accelerator;
pub mod import;
pub mod runtime;

use std::path::Path;

use anyhow::{Context as _, bail};
use ome_accelerator_selector::{AcceleratorSelector, AcceleratorSelectorConfig, CatalogAcceleratorFetcher};
use ome_catalog::{CatalogFile, CatalogStore};
use ome_core::EngineConfig;
use ome_runtime_selector::{CatalogRuntimeFetcher, RuntimeSelector, RuntimeSelectorConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Config, catalog and output settings shared by the selection commands.
pub struct Context {
    pub config: EngineConfig,
    pub store: CatalogStore,
    pub format: OutputFormat,
}

impl Context {
    pub fn load(
        config: Option<&Path>,
        catalog: Option<&Path>,
        db: Option<&Path>,
        format: OutputFormat,
    ) -> anyhow::Result<Self> {
        let config = match config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        let store = match (catalog, db) {
            (Some(_), Some(_)) => bail!("--catalog and --db are mutually exclusive here"),
            (Some(path), None) => {
                let file = CatalogFile::from_file(path)
                    .with_context(|| format!("loading catalog {}", path.display()))?;
                let store = CatalogStore::open_in_memory()?;
                store.import(&file)?;
                store
            }
            (None, Some(path)) => CatalogStore::open(path)
                .with_context(|| format!("opening catalog database {}", path.display()))?,
            (None, None) => bail!("either --catalog or --db is required"),
        };
        debug!(?config, catalog = ?catalog, db = ?db, "loaded selection context");
        Ok(Self { config, store, format })
    }

    pub fn runtime_selector(&self) -> RuntimeSelector {
        RuntimeSelector::new(
            RuntimeSelectorConfig::from(&self.config),
            CatalogRuntimeFetcher::new(self.store.clone()),
        )
    }

    pub fn accelerator_selector(&self) -> AcceleratorSelector {
        AcceleratorSelector::new(
            AcceleratorSelectorConfig::from(&self.config),
            CatalogAcceleratorFetcher::new(self.store.clone()),
        )
    }

    /// Pretty JSON, or the text rendering.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => println!("{}", text()),
        }
        Ok(())
    }
}

pub fn read_toml<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

pub fn init_config() -> anyhow::Result<()> {
    print!("{}", EngineConfig::scaffold().to_toml_string()?);
    Ok(())
}
