//! AcceleratorSelector: fetch → hard filter → policy score → rank.

use std::collections::{BTreeMap, BTreeSet};

use ome_core::{
    AcceleratorConstraints, AcceleratorSelectionPolicy, ComponentType, InferenceService,
    ServingRuntimeSpec,
};
use tracing::{debug, info, warn};

use crate::config::AcceleratorSelectorConfig;
use crate::error::{AcceleratorSelectorError, AcceleratorSelectorResult, NoAcceleratorFound};
use crate::fetcher::AcceleratorFetcher;
use crate::filter::filter_candidates;
use crate::policy::{self, REASON_NO_COST};
use crate::types::{AcceleratorCandidate, AcceleratorRanking, AcceleratorSelection, SelectionSource};

pub const REASON_NOT_FOUND: &str = "accelerator class not found";

pub struct AcceleratorSelector {
    config: AcceleratorSelectorConfig,
    fetcher: Box<dyn AcceleratorFetcher>,
}

#[derive(Default)]
pub struct AcceleratorSelectorBuilder {
    config: Option<AcceleratorSelectorConfig>,
    fetcher: Option<Box<dyn AcceleratorFetcher>>,
}

impl AcceleratorSelectorBuilder {
    pub fn config(mut self, config: AcceleratorSelectorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn fetcher(mut self, fetcher: impl AcceleratorFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn build(self) -> AcceleratorSelectorResult<AcceleratorSelector> {
        let fetcher = self.fetcher.ok_or_else(|| {
            AcceleratorSelectorError::Configuration("accelerator fetcher is required".to_string())
        })?;
        Ok(AcceleratorSelector {
            config: self.config.unwrap_or_default(),
            fetcher,
        })
    }
}

/// Candidates after loading and filtering, before the policy runs.
struct Evaluation {
    total: usize,
    eligible: Vec<AcceleratorCandidate>,
    excluded: BTreeMap<String, String>,
}

impl AcceleratorSelector {
    pub fn builder() -> AcceleratorSelectorBuilder {
        AcceleratorSelectorBuilder::default()
    }

    pub fn new(config: AcceleratorSelectorConfig, fetcher: impl AcceleratorFetcher + 'static) -> Self {
        Self {
            config,
            fetcher: Box::new(fetcher),
        }
    }

    /// Choose the accelerator class for one component of `workload`
    /// running on `runtime`.
    ///
    /// An explicit class name (component override, then workload selector)
    /// wins over any policy. Without a name the policy (same precedence)
    /// picks among the runtime's declared classes. `Ok(None)` when the
    /// runtime declares no classes or neither a name nor a policy is given.
    pub fn select_accelerator_class(
        &self,
        workload: &InferenceService,
        runtime: &ServingRuntimeSpec,
        component: ComponentType,
    ) -> AcceleratorSelectorResult<Option<AcceleratorSelection>> {
        let declared = runtime.accelerator_classes();
        if declared.is_empty() {
            debug!(workload = %workload.name, %component, "runtime declares no accelerator classes");
            return Ok(None);
        }

        let component_override = workload.accelerator_override(component);
        let selector = workload.selector();
        let explicit = |class: Option<&String>| class.filter(|c| !c.is_empty()).cloned();

        let (name, source) = if let Some(name) =
            explicit(component_override.and_then(|o| o.accelerator_class.as_ref()))
        {
            (name, SelectionSource::ComponentOverride)
        } else if let Some(name) = explicit(selector.and_then(|s| s.accelerator_class.as_ref())) {
            (name, SelectionSource::WorkloadSelector)
        } else {
            let policy = component_override
                .and_then(|o| o.policy)
                .or_else(|| selector.and_then(|s| s.policy));
            let Some(policy) = policy else {
                debug!(workload = %workload.name, %component, "no accelerator class or policy requested");
                return Ok(None);
            };
            let name = self.select_by_policy(policy, declared, workload.constraints())?;
            (name, SelectionSource::Policy(policy))
        };

        let candidate = self.fetch_accelerator_class(&name)?;
        info!(
            workload = %workload.name,
            %component,
            accelerator_class = %candidate.name,
            ?source,
            "selected accelerator class"
        );
        Ok(Some(AcceleratorSelection {
            name: candidate.name,
            spec: candidate.spec,
            source,
        }))
    }

    /// Run `policy` over the named classes and return the winner.
    ///
    /// `FirstAvailable` returns the first name as declared without looking
    /// the classes up. A lone eligible candidate wins without scoring.
    pub fn select_by_policy(
        &self,
        policy: AcceleratorSelectionPolicy,
        class_names: &[String],
        constraints: Option<&AcceleratorConstraints>,
    ) -> AcceleratorSelectorResult<String> {
        if policy == AcceleratorSelectionPolicy::FirstAvailable {
            if let Some(first) = class_names.first() {
                return Ok(first.clone());
            }
        }

        let evaluation = self.evaluate(class_names, constraints)?;
        if let [only] = evaluation.eligible.as_slice() {
            debug!(%policy, accelerator_class = %only.name, "single eligible accelerator class");
            return Ok(only.name.clone());
        }

        let ranking = self.ranking(policy, evaluation.eligible.iter().collect(), evaluation.excluded, constraints);
        if let Some(best) = ranking.ranked.first() {
            info!(%policy, accelerator_class = %best.name, score = best.score, "policy selected accelerator class");
            return Ok(best.name.clone());
        }

        let details = NoAcceleratorFound {
            policy,
            total_candidates: evaluation.total,
            eligible_candidates: evaluation.eligible.len(),
            excluded: ranking.excluded,
        };
        warn!(
            %policy,
            total = details.total_candidates,
            eligible = details.eligible_candidates,
            "no accelerator class found"
        );
        Err(AcceleratorSelectorError::NoneFound(Box::new(details)))
    }

    /// Every eligible class with its policy score, best first, plus the
    /// reason each other class was left out.
    pub fn rank_candidates(
        &self,
        policy: AcceleratorSelectionPolicy,
        class_names: &[String],
        constraints: Option<&AcceleratorConstraints>,
    ) -> AcceleratorSelectorResult<AcceleratorRanking> {
        let evaluation = self.evaluate(class_names, constraints)?;
        Ok(self.ranking(policy, evaluation.eligible.iter().collect(), evaluation.excluded, constraints))
    }

    pub fn fetch_accelerator_class(&self, name: &str) -> AcceleratorSelectorResult<AcceleratorCandidate> {
        self.fetcher
            .get_accelerator_class(name)?
            .ok_or_else(|| AcceleratorSelectorError::NotFound(name.to_string()))
    }

    // ── Internals ──────────────────────────────────────────────────

    /// Look up each distinct name (first occurrence order) and apply the
    /// hard filter. Unknown names are recorded as excluded.
    fn evaluate(
        &self,
        class_names: &[String],
        constraints: Option<&AcceleratorConstraints>,
    ) -> AcceleratorSelectorResult<Evaluation> {
        let mut seen = BTreeSet::new();
        let mut candidates = Vec::new();
        let mut excluded = BTreeMap::new();
        for name in class_names {
            if !seen.insert(name.as_str()) {
                continue;
            }
            match self.fetcher.get_accelerator_class(name)? {
                Some(candidate) => candidates.push(candidate),
                None => {
                    debug!(accelerator_class = %name, "accelerator class not found, skipping");
                    excluded.insert(name.clone(), REASON_NOT_FOUND.to_string());
                }
            }
        }

        let (eligible, filtered) =
            filter_candidates(&candidates, constraints, self.config.consider_availability);
        let eligible: Vec<AcceleratorCandidate> = eligible.into_iter().cloned().collect();
        excluded.extend(filtered);
        Ok(Evaluation {
            total: seen.len(),
            eligible,
            excluded,
        })
    }

    fn ranking(
        &self,
        policy: AcceleratorSelectionPolicy,
        eligible: Vec<&AcceleratorCandidate>,
        mut excluded: BTreeMap<String, String>,
        constraints: Option<&AcceleratorConstraints>,
    ) -> AcceleratorRanking {
        let ranked = policy::rank(policy, &eligible, constraints);
        if ranked.len() < eligible.len() {
            for candidate in eligible {
                if !ranked.iter().any(|r| r.name == candidate.name) {
                    excluded.insert(candidate.name.clone(), REASON_NO_COST.to_string());
                }
            }
        }
        AcceleratorRanking {
            policy,
            ranked,
            excluded,
        }
    }
}
