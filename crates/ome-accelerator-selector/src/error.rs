//! Accelerator selection error types.

use std::collections::BTreeMap;
use std::fmt;

use ome_catalog::CatalogError;
use ome_core::AcceleratorSelectionPolicy;
use serde::Serialize;
use thiserror::Error;

pub type AcceleratorSelectorResult<T> = Result<T, AcceleratorSelectorError>;

#[derive(Debug, Error)]
pub enum AcceleratorSelectorError {
    #[error("accelerator class {0} not found")]
    NotFound(String),

    #[error("{0}")]
    NoneFound(Box<NoAcceleratorFound>),

    #[error("accelerator selector misconfigured: {0}")]
    Configuration(String),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl AcceleratorSelectorError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_none_found(&self) -> bool {
        matches!(self, Self::NoneFound(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn none_found(&self) -> Option<&NoAcceleratorFound> {
        match self {
            Self::NoneFound(details) => Some(details),
            _ => None,
        }
    }
}

/// Why a policy could not pick any accelerator class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoAcceleratorFound {
    pub policy: AcceleratorSelectionPolicy,
    pub total_candidates: usize,
    pub eligible_candidates: usize,
    /// Class name to exclusion reason.
    pub excluded: BTreeMap<String, String>,
}

impl fmt::Display for NoAcceleratorFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no accelerator class selected by {} policy ({} candidates, {} eligible)",
            self.policy, self.total_candidates, self.eligible_candidates
        )?;
        if !self.excluded.is_empty() {
            f.write_str("; excluded:")?;
            for (name, reason) in &self.excluded {
                write!(f, " {name}: {reason};")?;
            }
        }
        Ok(())
    }
}
