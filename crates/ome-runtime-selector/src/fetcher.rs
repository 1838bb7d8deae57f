//! Runtime collection fetching.

use ome_catalog::CatalogStore;
use tracing::debug;

use crate::error::RuntimeSelectorResult;
use crate::types::{RuntimeCandidate, RuntimeCollection};

/// Reads the runtimes visible from a namespace.
pub trait RuntimeFetcher: Send + Sync {
    /// Namespace and cluster runtimes, each sorted newest first then by name.
    fn fetch_runtimes(&self, namespace: &str) -> RuntimeSelectorResult<RuntimeCollection>;

    /// Look up one runtime, trying the namespace scope before the cluster scope.
    fn get_runtime(
        &self,
        name: &str,
        namespace: &str,
    ) -> RuntimeSelectorResult<Option<RuntimeCandidate>>;
}

/// Creation time descending, then name ascending.
pub fn sort_candidates(candidates: &mut [RuntimeCandidate]) {
    candidates.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Fetcher over a [`CatalogStore`] snapshot.
#[derive(Clone)]
pub struct CatalogRuntimeFetcher {
    store: CatalogStore,
}

impl CatalogRuntimeFetcher {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }
}

impl RuntimeFetcher for CatalogRuntimeFetcher {
    fn fetch_runtimes(&self, namespace: &str) -> RuntimeSelectorResult<RuntimeCollection> {
        let mut namespace_runtimes: Vec<RuntimeCandidate> = self
            .store
            .list_runtimes(namespace)?
            .into_iter()
            .map(RuntimeCandidate::from)
            .collect();
        let mut cluster_runtimes: Vec<RuntimeCandidate> = self
            .store
            .list_cluster_runtimes()?
            .into_iter()
            .map(RuntimeCandidate::from)
            .collect();
        sort_candidates(&mut namespace_runtimes);
        sort_candidates(&mut cluster_runtimes);

        debug!(
            %namespace,
            namespace_runtimes = namespace_runtimes.len(),
            cluster_runtimes = cluster_runtimes.len(),
            "fetched runtimes"
        );
        Ok(RuntimeCollection {
            namespace_runtimes,
            cluster_runtimes,
        })
    }

    fn get_runtime(
        &self,
        name: &str,
        namespace: &str,
    ) -> RuntimeSelectorResult<Option<RuntimeCandidate>> {
        if let Some(runtime) = self.store.get_runtime(namespace, name)? {
            return Ok(Some(runtime.into()));
        }
        Ok(self.store.get_cluster_runtime(name)?.map(RuntimeCandidate::from))
    }
}

/// A fixed snapshot acts as its own fetcher.
///
/// Namespace runtimes whose `namespace` differs from the requested one are
/// not visible.
impl RuntimeFetcher for RuntimeCollection {
    fn fetch_runtimes(&self, namespace: &str) -> RuntimeSelectorResult<RuntimeCollection> {
        let mut namespace_runtimes: Vec<RuntimeCandidate> = self
            .namespace_runtimes
            .iter()
            .filter(|r| r.namespace.as_deref() == Some(namespace))
            .cloned()
            .collect();
        let mut cluster_runtimes = self.cluster_runtimes.clone();
        sort_candidates(&mut namespace_runtimes);
        sort_candidates(&mut cluster_runtimes);
        Ok(RuntimeCollection {
            namespace_runtimes,
            cluster_runtimes,
        })
    }

    fn get_runtime(
        &self,
        name: &str,
        namespace: &str,
    ) -> RuntimeSelectorResult<Option<RuntimeCandidate>> {
        let found = self
            .namespace_runtimes
            .iter()
            .find(|r| r.name == name && r.namespace.as_deref() == Some(namespace))
            .or_else(|| self.cluster_runtimes.iter().find(|r| r.name == name));
        Ok(found.cloned())
    }
}
