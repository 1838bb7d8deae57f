//! ome-runtime-selector: picks the serving runtime for a model.
//!
//! # Components
//!
//! - **`fetcher`**: reads namespace and cluster runtimes, newest first
//! - **`matcher`**: compatibility verdicts with reasons and warnings
//! - **`scorer`**: weighted scoring and the ranking comparator
//! - **`selector`**: orchestrates the pipeline and builds exclusion reports

pub mod config;
pub mod error;
pub mod fetcher;
pub mod matcher;
pub mod scorer;
pub mod selector;
pub mod types;

pub use config::RuntimeSelectorConfig;
pub use error::{NoRuntimeFound, RuntimeSelectorError, RuntimeSelectorResult};
pub use fetcher::{CatalogRuntimeFetcher, RuntimeFetcher};
pub use matcher::{DefaultRuntimeMatcher, RuntimeMatcher, required_accelerator_classes};
pub use scorer::{DefaultRuntimeScorer, RuntimeScorer};
pub use selector::{RuntimeSelector, RuntimeSelectorBuilder, validate_model};
pub use types::{
    CompatibilityReport, MatchDetails, RuntimeCandidate, RuntimeCollection, RuntimeMatch,
    RuntimeSelection, RuntimeValidation,
};
