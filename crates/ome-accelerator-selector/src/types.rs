//! Accelerator candidates and selection results.

use std::collections::BTreeMap;

use ome_core::{
    AcceleratorClass, AcceleratorClassSpec, AcceleratorClassStatus, AcceleratorSelectionPolicy,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceleratorCandidate {
    pub name: String,
    pub created_at: u64,
    pub spec: AcceleratorClassSpec,
    pub status: Option<AcceleratorClassStatus>,
}

impl From<AcceleratorClass> for AcceleratorCandidate {
    fn from(class: AcceleratorClass) -> Self {
        Self {
            name: class.name,
            created_at: class.created_at,
            spec: class.spec,
            status: class.status,
        }
    }
}

/// A candidate's policy score. For `Cheapest` the score is the price and
/// lower ranks first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub name: String,
    pub score: f64,
    pub reason: String,
}

/// Where the chosen class name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    ComponentOverride,
    WorkloadSelector,
    Policy(AcceleratorSelectionPolicy),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceleratorSelection {
    pub name: String,
    pub spec: AcceleratorClassSpec,
    pub source: SelectionSource,
}

/// Full policy ranking, for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceleratorRanking {
    pub policy: AcceleratorSelectionPolicy,
    /// Best first.
    pub ranked: Vec<ScoredCandidate>,
    /// Class name to exclusion reason.
    pub excluded: BTreeMap<String, String>,
}
