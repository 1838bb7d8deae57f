//! ome-accelerator-selector: picks the accelerator class a runtime runs on.
//!
//! # Components
//!
//! - **`fetcher`**: reads accelerator classes from the catalog
//! - **`filter`**: hard constraints, first failing check names the reason
//! - **`policy`**: BestFit, Cheapest, MostCapable and FirstAvailable scoring
//! - **`selector`**: name/policy resolution per component and ranking

pub mod config;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod policy;
pub mod selector;
pub mod types;

pub use config::AcceleratorSelectorConfig;
pub use error::{AcceleratorSelectorError, AcceleratorSelectorResult, NoAcceleratorFound};
pub use fetcher::{AcceleratorFetcher, CatalogAcceleratorFetcher};
pub use filter::meets_requirements;
pub use selector::{AcceleratorSelector, AcceleratorSelectorBuilder};
pub use types::{
    AcceleratorCandidate, AcceleratorRanking, AcceleratorSelection, ScoredCandidate,
    SelectionSource,
};
