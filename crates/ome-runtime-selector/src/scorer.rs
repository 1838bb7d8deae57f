//! Runtime scoring and ranking.
//!
//! A runtime's score is the best `weight × priority` across its
//! auto-select entries. Zero means the runtime does not take part in
//! automatic selection.

use std::cmp::Ordering;

use ome_core::version;
use ome_core::{BaseModelSpec, ModelFormat, ServingRuntimeSpec, SupportedModelFormat, parse_model_size};
use tracing::trace;

use crate::config::RuntimeSelectorConfig;
use crate::matcher::effective_weight;
use crate::types::RuntimeSelection;

pub trait RuntimeScorer: Send + Sync {
    /// Score ≥ 0; zero disqualifies.
    fn score(&self, runtime: &ServingRuntimeSpec, model: &BaseModelSpec) -> i64;

    /// `Less` when `a` ranks before `b`.
    fn compare(&self, a: &RuntimeSelection, b: &RuntimeSelection, model: &BaseModelSpec) -> Ordering;
}

#[derive(Debug, Clone, Default)]
pub struct DefaultRuntimeScorer {
    config: RuntimeSelectorConfig,
}

impl DefaultRuntimeScorer {
    pub fn new(config: RuntimeSelectorConfig) -> Self {
        Self { config }
    }

    fn entry_score(&self, model: &BaseModelSpec, entry: &SupportedModelFormat) -> i64 {
        let Some(format) = &entry.model_format else {
            return 0;
        };
        if !loosely_matches(format, &model.model_format) {
            return 0;
        }

        let priority = i64::from(entry.priority.unwrap_or(self.config.default_priority));
        let mut score =
            effective_weight(format.weight, self.config.model_format_weight).saturating_mul(priority);

        match (&entry.model_framework, &model.model_framework) {
            (None, _) => {}
            (Some(_), None) => return 0,
            (Some(supported), Some(framework)) => {
                if !loosely_matches(supported, framework) {
                    return 0;
                }
                score = score.saturating_add(
                    effective_weight(supported.weight, self.config.model_framework_weight)
                        .saturating_mul(priority),
                );
            }
        }
        score
    }
}

impl RuntimeScorer for DefaultRuntimeScorer {
    fn score(&self, runtime: &ServingRuntimeSpec, model: &BaseModelSpec) -> i64 {
        let score = runtime
            .supported_model_formats
            .iter()
            .filter(|entry| entry.auto_select_enabled())
            .map(|entry| self.entry_score(model, entry))
            .max()
            .unwrap_or(0)
            .max(0);
        trace!(model_format = %model.model_format.name, score, "scored runtime");
        score
    }

    fn compare(&self, a: &RuntimeSelection, b: &RuntimeSelection, model: &BaseModelSpec) -> Ordering {
        b.score
            .cmp(&a.score)
            .then_with(|| {
                size_distance(&a.spec, model)
                    .partial_cmp(&size_distance(&b.spec, model))
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.scope.is_cluster().cmp(&b.scope.is_cluster()))
            .then_with(|| b.name.cmp(&a.name))
    }
}

/// Name equality plus a version check only when both sides carry one.
fn loosely_matches(supported: &ModelFormat, model: &ModelFormat) -> bool {
    if supported.name != model.name {
        return false;
    }
    match (&supported.version, &model.version) {
        (Some(s), Some(m)) => version::satisfies(s, m, supported.operator()),
        _ => true,
    }
}

/// `|min − size| + |max − size|`, or 0 without a range or model size.
pub fn size_distance(runtime: &ServingRuntimeSpec, model: &BaseModelSpec) -> f64 {
    let (Some(range), Some(size)) = (&runtime.model_size_range, &model.model_parameter_size) else {
        return 0.0;
    };
    let parse = |s: Option<&String>| s.and_then(|s| parse_model_size(s).ok()).unwrap_or(0.0);
    let size = parse(Some(size));
    let min = parse(range.min.as_ref());
    let max = parse(range.max.as_ref());
    (min - size).abs() + (max - size).abs()
}
