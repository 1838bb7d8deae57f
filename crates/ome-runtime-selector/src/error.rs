//! Runtime selection error types.

use std::collections::BTreeMap;
use std::fmt;

use ome_catalog::CatalogError;
use ome_core::RuntimeScope;
use serde::Serialize;
use thiserror::Error;

pub type RuntimeSelectorResult<T> = Result<T, RuntimeSelectorError>;

#[derive(Debug, Error)]
pub enum RuntimeSelectorError {
    #[error("invalid model specification: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("runtime {name} not found in namespace {namespace} or cluster scope")]
    NotFound { name: String, namespace: String },

    #[error("{scope} runtime {name} is disabled")]
    Disabled { name: String, scope: RuntimeScope },

    #[error("runtime {runtime} does not support model format {model_format}: {reason}")]
    Compatibility {
        runtime: String,
        model_format: String,
        reason: String,
    },

    #[error("{0}")]
    NoneFound(Box<NoRuntimeFound>),

    #[error("runtime selector misconfigured: {0}")]
    Configuration(String),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl RuntimeSelectorError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled { .. })
    }

    pub fn is_compatibility(&self) -> bool {
        matches!(self, Self::Compatibility { .. })
    }

    pub fn is_none_found(&self) -> bool {
        matches!(self, Self::NoneFound(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Exclusion details when automatic selection came up empty.
    pub fn none_found(&self) -> Option<&NoRuntimeFound> {
        match self {
            Self::NoneFound(details) => Some(details),
            _ => None,
        }
    }
}

/// Why automatic selection found nothing, per candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoRuntimeFound {
    pub model_format: String,
    pub namespace: String,
    pub total_runtimes: usize,
    pub namespace_runtimes: usize,
    pub cluster_runtimes: usize,
    /// Runtime name to first exclusion reason. Cluster runtimes whose name
    /// collides with a namespace runtime are keyed `cluster/{name}`.
    pub excluded_runtimes: BTreeMap<String, String>,
}

impl fmt::Display for NoRuntimeFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no runtime found for model format {} in namespace {} (checked {} runtimes: {} namespace, {} cluster)",
            self.model_format,
            self.namespace,
            self.total_runtimes,
            self.namespace_runtimes,
            self.cluster_runtimes
        )?;
        if !self.excluded_runtimes.is_empty() {
            f.write_str("; excluded:")?;
            for (name, reason) in &self.excluded_runtimes {
                write!(f, " {name}: {reason};")?;
            }
        }
        Ok(())
    }
}
