//! CatalogStore: redb-backed snapshot of selection candidates.
//!
//! Typed put/get/list over namespace runtimes, cluster runtimes and accelerator
//! classes. Values are JSON-serialized into `&[u8]` columns. Both on-disk
//! and in-memory backends are supported.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use ome_core::{AcceleratorClass, ClusterServingRuntime, ServingRuntime};

use crate::error::{CatalogError, CatalogResult};
use crate::import::{CatalogFile, ImportSummary};
use crate::tables::*;

type Table = TableDefinition<'static, &'static str, &'static [u8]>;

/// Convert any `Display` error into a `CatalogError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| CatalogError::$variant(e.to_string())
    };
}

/// Thread-safe candidate catalog backed by redb.
#[derive(Clone)]
pub struct CatalogStore {
    db: Arc<Database>,
}

impl CatalogStore {
    /// Open (or create) a persistent catalog at the given path.
    pub fn open(path: &Path) -> CatalogResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "catalog opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory catalog.
    pub fn open_in_memory() -> CatalogResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory catalog opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> CatalogResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(NAMESPACE_RUNTIMES).map_err(map_err!(Table))?;
        txn.open_table(CLUSTER_RUNTIMES).map_err(map_err!(Table))?;
        txn.open_table(ACCELERATOR_CLASSES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic table access ───────────────────────────────────────

    fn put<T: Serialize>(&self, table: Table, key: &str, value: &T) -> CatalogResult<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| CatalogError::encode(key, e))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            table
                .insert(key, bytes.as_slice())
                .map_err(map_err!(Storage))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, table: Table, key: &str) -> CatalogResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Storage))? {
            Some(guard) => {
                let value: T =
                    serde_json::from_slice(guard.value()).map_err(|e| CatalogError::decode(key, e))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn list<T: DeserializeOwned>(&self, table: Table, prefix: Option<&str>) -> CatalogResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Storage))? {
            let (key, value) = entry.map_err(map_err!(Storage))?;
            let key = key.value();
            if prefix.is_some_and(|p| !key.starts_with(p)) {
                continue;
            }
            let item: T =
                serde_json::from_slice(value.value()).map_err(|e| CatalogError::decode(key, e))?;
            results.push(item);
        }
        Ok(results)
    }

    // ── Namespace runtimes ─────────────────────────────────────────

    pub fn put_runtime(&self, runtime: &ServingRuntime) -> CatalogResult<()> {
        let key = runtime.table_key();
        self.put(NAMESPACE_RUNTIMES, &key, runtime)?;
        debug!(%key, "runtime stored");
        Ok(())
    }

    pub fn get_runtime(&self, namespace: &str, name: &str) -> CatalogResult<Option<ServingRuntime>> {
        self.get(NAMESPACE_RUNTIMES, &format!("{namespace}/{name}"))
    }

    /// List runtimes in one namespace, in key order.
    pub fn list_runtimes(&self, namespace: &str) -> CatalogResult<Vec<ServingRuntime>> {
        self.list(NAMESPACE_RUNTIMES, Some(&format!("{namespace}/")))
    }

    // ── Cluster runtimes ───────────────────────────────────────────

    pub fn put_cluster_runtime(&self, runtime: &ClusterServingRuntime) -> CatalogResult<()> {
        self.put(CLUSTER_RUNTIMES, &runtime.name, runtime)?;
        debug!(name = %runtime.name, "cluster runtime stored");
        Ok(())
    }

    pub fn get_cluster_runtime(&self, name: &str) -> CatalogResult<Option<ClusterServingRuntime>> {
        self.get(CLUSTER_RUNTIMES, name)
    }

    pub fn list_cluster_runtimes(&self) -> CatalogResult<Vec<ClusterServingRuntime>> {
        self.list(CLUSTER_RUNTIMES, None)
    }

    // ── Accelerator classes ────────────────────────────────────────

    pub fn put_accelerator_class(&self, class: &AcceleratorClass) -> CatalogResult<()> {
        self.put(ACCELERATOR_CLASSES, &class.name, class)?;
        debug!(name = %class.name, "accelerator class stored");
        Ok(())
    }

    pub fn get_accelerator_class(&self, name: &str) -> CatalogResult<Option<AcceleratorClass>> {
        self.get(ACCELERATOR_CLASSES, name)
    }

    pub fn list_accelerator_classes(&self) -> CatalogResult<Vec<AcceleratorClass>> {
        self.list(ACCELERATOR_CLASSES, None)
    }

    // ── Bulk import ────────────────────────────────────────────────

    /// Write every object in `file` in a single transaction.
    ///
    /// Existing objects with the same key are replaced.
    pub fn import(&self, file: &CatalogFile) -> CatalogResult<ImportSummary> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(NAMESPACE_RUNTIMES).map_err(map_err!(Table))?;
            for runtime in &file.namespace_runtimes {
                let key = runtime.table_key();
                let bytes = serde_json::to_vec(runtime).map_err(|e| CatalogError::encode(&key, e))?;
                table
                    .insert(key.as_str(), bytes.as_slice())
                    .map_err(map_err!(Storage))?;
            }
        }
        {
            let mut table = txn.open_table(CLUSTER_RUNTIMES).map_err(map_err!(Table))?;
            for runtime in &file.cluster_runtimes {
                let bytes =
                    serde_json::to_vec(runtime).map_err(|e| CatalogError::encode(&runtime.name, e))?;
                table
                    .insert(runtime.name.as_str(), bytes.as_slice())
                    .map_err(map_err!(Storage))?;
            }
        }
        {
            let mut table = txn.open_table(ACCELERATOR_CLASSES).map_err(map_err!(Table))?;
            for class in &file.accelerator_classes {
                let bytes =
                    serde_json::to_vec(class).map_err(|e| CatalogError::encode(&class.name, e))?;
                table
                    .insert(class.name.as_str(), bytes.as_slice())
                    .map_err(map_err!(Storage))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;

        let summary = ImportSummary {
            namespace_runtimes: file.namespace_runtimes.len(),
            cluster_runtimes: file.cluster_runtimes.len(),
            accelerator_classes: file.accelerator_classes.len(),
        };
        debug!(
            namespace_runtimes = summary.namespace_runtimes,
            cluster_runtimes = summary.cluster_runtimes,
            accelerator_classes = summary.accelerator_classes,
            "catalog imported"
        );
        Ok(summary)
    }
}
