//! RuntimeSelector: fetch → match → score → rank.

use std::collections::BTreeMap;

use ome_core::{BaseModelSpec, InferenceService, RuntimeScope, parse_model_size};
use tracing::{debug, info, warn};

use crate::config::RuntimeSelectorConfig;
use crate::error::{NoRuntimeFound, RuntimeSelectorError, RuntimeSelectorResult};
use crate::fetcher::RuntimeFetcher;
use crate::matcher::{DefaultRuntimeMatcher, REASON_DISABLED, RuntimeMatcher, WARNING_NO_AUTO_SELECT};
use crate::scorer::{DefaultRuntimeScorer, RuntimeScorer};
use crate::types::{RuntimeCandidate, RuntimeCollection, RuntimeMatch, RuntimeSelection, RuntimeValidation};

pub const REASON_ZERO_SCORE: &str = "no auto-select enabled supported format matches the model";

pub struct RuntimeSelector {
    config: RuntimeSelectorConfig,
    fetcher: Box<dyn RuntimeFetcher>,
    matcher: Box<dyn RuntimeMatcher>,
    scorer: Box<dyn RuntimeScorer>,
}

#[derive(Default)]
pub struct RuntimeSelectorBuilder {
    config: Option<RuntimeSelectorConfig>,
    fetcher: Option<Box<dyn RuntimeFetcher>>,
    matcher: Option<Box<dyn RuntimeMatcher>>,
    scorer: Option<Box<dyn RuntimeScorer>>,
}

impl RuntimeSelectorBuilder {
    pub fn config(mut self, config: RuntimeSelectorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn fetcher(mut self, fetcher: impl RuntimeFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn matcher(mut self, matcher: impl RuntimeMatcher + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    pub fn scorer(mut self, scorer: impl RuntimeScorer + 'static) -> Self {
        self.scorer = Some(Box::new(scorer));
        self
    }

    /// Matcher and scorer default to the built-in implementations; the
    /// fetcher is required.
    pub fn build(self) -> RuntimeSelectorResult<RuntimeSelector> {
        let fetcher = self.fetcher.ok_or_else(|| {
            RuntimeSelectorError::Configuration("runtime fetcher is required".to_string())
        })?;
        let config = self.config.unwrap_or_default();
        let matcher = self
            .matcher
            .unwrap_or_else(|| Box::new(DefaultRuntimeMatcher::new(config.clone())));
        let scorer = self
            .scorer
            .unwrap_or_else(|| Box::new(DefaultRuntimeScorer::new(config.clone())));
        Ok(RuntimeSelector {
            config,
            fetcher,
            matcher,
            scorer,
        })
    }
}

impl RuntimeSelector {
    pub fn builder() -> RuntimeSelectorBuilder {
        RuntimeSelectorBuilder::default()
    }

    /// Selector with the default matcher and scorer.
    pub fn new(config: RuntimeSelectorConfig, fetcher: impl RuntimeFetcher + 'static) -> Self {
        Self {
            matcher: Box::new(DefaultRuntimeMatcher::new(config.clone())),
            scorer: Box::new(DefaultRuntimeScorer::new(config.clone())),
            fetcher: Box::new(fetcher),
            config,
        }
    }

    /// Pick the best runtime for `model` among those visible from `namespace`.
    pub fn select_runtime(
        &self,
        model: &BaseModelSpec,
        workload: Option<&InferenceService>,
        namespace: &str,
    ) -> RuntimeSelectorResult<RuntimeSelection> {
        info!(model_format = %model.model_format.name, %namespace, "selecting runtime");
        validate_model(model)?;

        let collection = self.fetcher.fetch_runtimes(namespace)?;
        let (matches, excluded) = self.evaluate_collection(&collection, model, workload);

        let Some(best) = matches.into_iter().next() else {
            let details = NoRuntimeFound {
                model_format: model.model_format.name.clone(),
                namespace: namespace.to_string(),
                total_runtimes: collection.total(),
                namespace_runtimes: collection.namespace_runtimes.len(),
                cluster_runtimes: collection.cluster_runtimes.len(),
                excluded_runtimes: excluded,
            };
            warn!(
                model_format = %details.model_format,
                %namespace,
                total = details.total_runtimes,
                "no runtime found"
            );
            return Err(RuntimeSelectorError::NoneFound(Box::new(details)));
        };

        info!(
            runtime = %best.selection.name,
            score = best.selection.score,
            scope = %best.selection.scope,
            "selected runtime"
        );
        Ok(best.selection)
    }

    /// Every auto-selectable compatible runtime, best first. Namespace
    /// runtimes always precede cluster runtimes.
    pub fn get_compatible_runtimes(
        &self,
        model: &BaseModelSpec,
        workload: Option<&InferenceService>,
        namespace: &str,
    ) -> RuntimeSelectorResult<Vec<RuntimeMatch>> {
        validate_model(model)?;
        let collection = self.fetcher.fetch_runtimes(namespace)?;
        let (matches, _) = self.evaluate_collection(&collection, model, workload);
        info!(
            model_format = %model.model_format.name,
            count = matches.len(),
            "found compatible runtimes"
        );
        Ok(matches)
    }

    /// Check that a named runtime can serve `model`. Auto-select does not
    /// apply here; its absence is reported as a warning.
    pub fn validate_runtime(
        &self,
        name: &str,
        model: &BaseModelSpec,
        workload: Option<&InferenceService>,
        namespace: &str,
    ) -> RuntimeSelectorResult<RuntimeValidation> {
        debug!(runtime = %name, model_format = %model.model_format.name, %namespace, "validating runtime");
        validate_model(model)?;

        let runtime = self.get_runtime(name, namespace)?;
        if runtime.spec.is_disabled() {
            return Err(RuntimeSelectorError::Disabled {
                name: name.to_string(),
                scope: runtime.scope,
            });
        }

        let report = self
            .matcher
            .compatibility_report(&runtime.spec, model, workload, name);
        if !report.compatible {
            return Err(RuntimeSelectorError::Compatibility {
                runtime: name.to_string(),
                model_format: model.model_format.name.clone(),
                reason: report
                    .first_reason()
                    .unwrap_or("incompatible model format")
                    .to_string(),
            });
        }

        let mut warnings = report.warnings;
        let auto_select = runtime.spec.has_auto_select() && {
            let score = self.scorer.score(&runtime.spec, model);
            if score <= 0 {
                warnings.push(REASON_ZERO_SCORE.to_string());
            }
            score > 0
        };
        if !auto_select {
            debug!(runtime = %name, "runtime is compatible but not auto-selectable");
        }
        Ok(RuntimeValidation {
            name: name.to_string(),
            scope: runtime.scope,
            auto_select,
            warnings,
        })
    }

    /// Direct lookup, namespace scope first.
    pub fn get_runtime(&self, name: &str, namespace: &str) -> RuntimeSelectorResult<RuntimeCandidate> {
        self.fetcher
            .get_runtime(name, namespace)?
            .ok_or_else(|| RuntimeSelectorError::NotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }

    // ── Evaluation ─────────────────────────────────────────────────

    /// Ranked matches plus one exclusion reason per rejected candidate.
    fn evaluate_collection(
        &self,
        collection: &RuntimeCollection,
        model: &BaseModelSpec,
        workload: Option<&InferenceService>,
    ) -> (Vec<RuntimeMatch>, BTreeMap<String, String>) {
        let mut excluded = BTreeMap::new();
        let mut namespace_matches = Vec::new();
        let mut cluster_matches = Vec::new();

        for candidate in collection.iter() {
            match self.evaluate(candidate, model, workload) {
                Ok(found) => match candidate.scope {
                    RuntimeScope::Namespace => namespace_matches.push(found),
                    RuntimeScope::Cluster => cluster_matches.push(found),
                },
                Err(reason) => {
                    self.log_exclusion(candidate, &reason);
                    let key = if candidate.scope.is_cluster() && excluded.contains_key(&candidate.name) {
                        format!("cluster/{}", candidate.name)
                    } else {
                        candidate.name.clone()
                    };
                    excluded.insert(key, reason);
                }
            }
        }

        namespace_matches.sort_by(|a, b| self.scorer.compare(&a.selection, &b.selection, model));
        cluster_matches.sort_by(|a, b| self.scorer.compare(&a.selection, &b.selection, model));
        namespace_matches.extend(cluster_matches);
        (namespace_matches, excluded)
    }

    fn evaluate(
        &self,
        candidate: &RuntimeCandidate,
        model: &BaseModelSpec,
        workload: Option<&InferenceService>,
    ) -> Result<RuntimeMatch, String> {
        if candidate.spec.is_disabled() {
            return Err(REASON_DISABLED.to_string());
        }

        let report = self
            .matcher
            .compatibility_report(&candidate.spec, model, workload, &candidate.name);
        if !report.compatible {
            return Err(report
                .first_reason()
                .unwrap_or("incompatible model format")
                .to_string());
        }
        if !candidate.spec.has_auto_select() {
            return Err(WARNING_NO_AUTO_SELECT.to_string());
        }

        let score = self.scorer.score(&candidate.spec, model);
        if score <= 0 {
            return Err(REASON_ZERO_SCORE.to_string());
        }

        debug!(runtime = %candidate.name, scope = %candidate.scope, score, "runtime qualified");
        Ok(RuntimeMatch {
            selection: RuntimeSelection {
                name: candidate.name.clone(),
                scope: candidate.scope,
                score,
                spec: candidate.spec.clone(),
            },
            match_details: report.match_details,
        })
    }

    fn log_exclusion(&self, candidate: &RuntimeCandidate, reason: &str) {
        if self.config.detailed_logging {
            info!(runtime = %candidate.name, scope = %candidate.scope, %reason, "runtime excluded");
        } else {
            debug!(runtime = %candidate.name, scope = %candidate.scope, %reason, "runtime excluded");
        }
    }
}

/// Reject malformed model descriptors before any fetch.
pub fn validate_model(model: &BaseModelSpec) -> RuntimeSelectorResult<()> {
    if model.model_format.name.trim().is_empty() {
        return Err(RuntimeSelectorError::Validation {
            field: "model_format.name".to_string(),
            message: "model format name is required".to_string(),
        });
    }
    if let Some(size) = &model.model_parameter_size {
        parse_model_size(size).map_err(|err| RuntimeSelectorError::Validation {
            field: "model_parameter_size".to_string(),
            message: err.to_string(),
        })?;
    }
    Ok(())
}
