//! Candidates, selections and match reports.

use ome_core::{ClusterServingRuntime, RuntimeScope, ServingRuntime, ServingRuntimeSpec};
use serde::Serialize;

/// A runtime from either scope, normalized for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeCandidate {
    pub name: String,
    /// Set for namespace-scoped runtimes only.
    pub namespace: Option<String>,
    pub scope: RuntimeScope,
    pub created_at: u64,
    pub spec: ServingRuntimeSpec,
}

impl From<ServingRuntime> for RuntimeCandidate {
    fn from(runtime: ServingRuntime) -> Self {
        Self {
            name: runtime.name,
            namespace: Some(runtime.namespace),
            scope: RuntimeScope::Namespace,
            created_at: runtime.created_at,
            spec: runtime.spec,
        }
    }
}

impl From<ClusterServingRuntime> for RuntimeCandidate {
    fn from(runtime: ClusterServingRuntime) -> Self {
        Self {
            name: runtime.name,
            namespace: None,
            scope: RuntimeScope::Cluster,
            created_at: runtime.created_at,
            spec: runtime.spec,
        }
    }
}

/// Every runtime visible from one namespace, split by scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuntimeCollection {
    pub namespace_runtimes: Vec<RuntimeCandidate>,
    pub cluster_runtimes: Vec<RuntimeCandidate>,
}

impl RuntimeCollection {
    pub fn total(&self) -> usize {
        self.namespace_runtimes.len() + self.cluster_runtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Namespace runtimes first, then cluster runtimes.
    pub fn iter(&self) -> impl Iterator<Item = &RuntimeCandidate> {
        self.namespace_runtimes
            .iter()
            .chain(self.cluster_runtimes.iter())
    }
}

/// The chosen runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeSelection {
    pub name: String,
    pub scope: RuntimeScope,
    pub score: i64,
    pub spec: ServingRuntimeSpec,
}

impl RuntimeSelection {
    pub fn is_cluster(&self) -> bool {
        self.scope.is_cluster()
    }
}

/// Which sub-checks of the first matching supported-format entry passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchDetails {
    pub format_match: bool,
    pub framework_match: bool,
    pub architecture_match: bool,
    pub quantization_match: bool,
    pub size_match: bool,
    pub priority: i32,
    /// Accumulated `weight × priority` of the matched entry.
    pub weight: i64,
    pub auto_select_enabled: bool,
    pub reasons: Vec<String>,
}

/// A ranked runtime with the details that qualified it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeMatch {
    pub selection: RuntimeSelection,
    pub match_details: MatchDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    pub compatible: bool,
    pub match_details: MatchDetails,
    pub reasons: Vec<String>,
    pub warnings: Vec<String>,
}

impl CompatibilityReport {
    pub fn incompatible(reason: impl Into<String>) -> Self {
        Self {
            reasons: vec![reason.into()],
            ..Self::default()
        }
    }

    pub fn first_reason(&self) -> Option<&str> {
        self.reasons.first().map(String::as_str)
    }
}

/// Outcome of validating a named runtime against a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeValidation {
    pub name: String,
    pub scope: RuntimeScope,
    /// Whether the runtime could also be picked by automatic selection.
    pub auto_select: bool,
    pub warnings: Vec<String>,
}
