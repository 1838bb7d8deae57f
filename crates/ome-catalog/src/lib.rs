//! ome-catalog: snapshot store of selection candidates.
//!
//! Backed by [redb](https://docs.rs/redb). Holds namespace runtimes, cluster
//! runtimes and accelerator classes; the selectors read from it through
//! their fetcher traits. `CatalogStore` is `Clone + Send + Sync`.

pub mod error;
pub mod import;
pub mod store;
pub mod tables;

pub use error::{CatalogError, CatalogResult};
pub use import::CatalogFile;
pub use store::CatalogStore;
