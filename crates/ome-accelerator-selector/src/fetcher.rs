//! Accelerator class fetching.

use ome_catalog::CatalogStore;
use ome_core::AcceleratorClass;
use tracing::debug;

use crate::error::AcceleratorSelectorResult;
use crate::types::AcceleratorCandidate;

/// Reads accelerator classes (cluster scoped).
pub trait AcceleratorFetcher: Send + Sync {
    fn get_accelerator_class(&self, name: &str) -> AcceleratorSelectorResult<Option<AcceleratorCandidate>>;

    /// Every class, newest first then by name.
    fn list_accelerator_classes(&self) -> AcceleratorSelectorResult<Vec<AcceleratorCandidate>>;
}

fn sort_candidates(candidates: &mut [AcceleratorCandidate]) {
    candidates.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Fetcher over a [`CatalogStore`].
#[derive(Clone)]
pub struct CatalogAcceleratorFetcher {
    store: CatalogStore,
}

impl CatalogAcceleratorFetcher {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }
}

impl AcceleratorFetcher for CatalogAcceleratorFetcher {
    fn get_accelerator_class(&self, name: &str) -> AcceleratorSelectorResult<Option<AcceleratorCandidate>> {
        Ok(self
            .store
            .get_accelerator_class(name)?
            .map(AcceleratorCandidate::from))
    }

    fn list_accelerator_classes(&self) -> AcceleratorSelectorResult<Vec<AcceleratorCandidate>> {
        let mut candidates: Vec<AcceleratorCandidate> = self
            .store
            .list_accelerator_classes()?
            .into_iter()
            .map(AcceleratorCandidate::from)
            .collect();
        sort_candidates(&mut candidates);
        debug!(count = candidates.len(), "fetched accelerator classes");
        Ok(candidates)
    }
}

/// A fixed snapshot acts as its own fetcher.
impl AcceleratorFetcher for Vec<AcceleratorClass> {
    fn get_accelerator_class(&self, name: &str) -> AcceleratorSelectorResult<Option<AcceleratorCandidate>> {
        Ok(self
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .map(AcceleratorCandidate::from))
    }

    fn list_accelerator_classes(&self) -> AcceleratorSelectorResult<Vec<AcceleratorCandidate>> {
        let mut candidates: Vec<AcceleratorCandidate> =
            self.iter().cloned().map(AcceleratorCandidate::from).collect();
        sort_candidates(&mut candidates);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ome_core::AcceleratorClassSpec;

    fn make_class(name: &str, created_at: u64) -> AcceleratorClass {
        AcceleratorClass {
            name: name.to_string(),
            created_at,
            spec: AcceleratorClassSpec::default(),
            status: None,
        }
    }

    #[test]
    fn catalog_fetch_and_list() {
        let store = CatalogStore::open_in_memory().unwrap();
        store.put_accelerator_class(&make_class("a100", 1)).unwrap();
        store.put_accelerator_class(&make_class("h100", 2)).unwrap();
        store.put_accelerator_class(&make_class("b200", 2)).unwrap();
        let fetcher = CatalogAcceleratorFetcher::new(store);

        let names: Vec<_> = fetcher
            .list_accelerator_classes()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["b200", "h100", "a100"]);

        assert_eq!(fetcher.get_accelerator_class("h100").unwrap().unwrap().name, "h100");
        assert!(fetcher.get_accelerator_class("mi300").unwrap().is_none());
    }

    #[test]
    fn snapshot_fetcher() {
        let snapshot = vec![make_class("x", 1), make_class("y", 5)];
        assert_eq!(snapshot.list_accelerator_classes().unwrap()[0].name, "y");
        assert!(snapshot.get_accelerator_class("x").unwrap().is_some());
        assert!(snapshot.get_accelerator_class("z").unwrap().is_none());
    }
}
