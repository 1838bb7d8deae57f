//! Policy scoring for eligible accelerator classes.
//!
//! `BestFit` and `MostCapable` rank by descending score, `Cheapest` by
//! ascending price. Ties keep the candidates' input order.

use std::fmt;

use ome_core::{AcceleratorConstraints, AcceleratorSelectionPolicy, Precision};
use serde::Serialize;
use tracing::debug;

use crate::types::{AcceleratorCandidate, ScoredCandidate};

const BEST_FIT_MEMORY_WEIGHT: f64 = 0.70;
const BEST_FIT_COMPUTE_WEIGHT: f64 = 0.30;

const CAPABLE_MEMORY_WEIGHT: f64 = 0.5;
const CAPABLE_BANDWIDTH_WEIGHT: f64 = 0.3;
const CAPABLE_THROUGHPUT_WEIGHT: f64 = 0.2;

/// Reference ceilings used to normalise `MostCapable` terms.
const REFERENCE_MEMORY_GB: f64 = 100.0;
const REFERENCE_BANDWIDTH_GBPS: f64 = 3000.0;
const REFERENCE_THROUGHPUT: f64 = 2000.0;

pub const REASON_NO_COST: &str = "no cost data available";

// ── Scores ─────────────────────────────────────────────────────────

/// Throughput against a requirement: 0 without throughput, 1 without a
/// requirement or when it is met, linear partial credit otherwise.
pub fn tflops_ratio(actual: u64, required: u64) -> f64 {
    if actual == 0 {
        return 0.0;
    }
    if required == 0 || actual >= required {
        return 1.0;
    }
    actual as f64 / required as f64
}

/// Reciprocal of the memory over-provisioning ratio, uncapped.
pub fn memory_fit_score(
    candidate: &AcceleratorCandidate,
    constraints: Option<&AcceleratorConstraints>,
) -> f64 {
    let Some(required) = constraints.and_then(|c| c.min_memory) else {
        return 1.0;
    };
    let Some(memory) = candidate.spec.capabilities.memory_gb else {
        return 0.0;
    };
    if memory < required {
        return 0.0;
    }
    if memory == required || required == 0 {
        return 1.0;
    }
    required as f64 / memory as f64
}

/// Throughput score with preferred-precision fallback.
///
/// Each skipped preferred precision halves the result. When none of them
/// has data, fp16 is tried at the degraded penalty unless it was listed.
pub fn compute_score(
    candidate: &AcceleratorCandidate,
    constraints: Option<&AcceleratorConstraints>,
) -> f64 {
    let Some(performance) = &candidate.spec.capabilities.performance else {
        return 0.0;
    };
    let required = constraints
        .and_then(|c| c.min_compute_performance_tflops)
        .unwrap_or(0);
    let preferred = constraints
        .map(|c| c.preferred_precisions.as_slice())
        .unwrap_or_default();

    if preferred.is_empty() {
        return tflops_ratio(performance.max_throughput(), required);
    }

    let mut penalty = 1.0;
    for precision in preferred {
        let throughput = performance.throughput_for(precision);
        if throughput > 0 {
            return tflops_ratio(throughput, required) * penalty;
        }
        penalty *= 0.5;
    }

    let fp16_listed = preferred
        .iter()
        .any(|p| Precision::parse(p) == Some(Precision::Fp16));
    if !fp16_listed {
        let throughput = performance.throughput(Precision::Fp16);
        if throughput > 0 {
            return tflops_ratio(throughput, required) * penalty;
        }
    }
    0.0
}

pub fn best_fit_score(
    candidate: &AcceleratorCandidate,
    constraints: Option<&AcceleratorConstraints>,
) -> f64 {
    BEST_FIT_MEMORY_WEIGHT * memory_fit_score(candidate, constraints)
        + BEST_FIT_COMPUTE_WEIGHT * compute_score(candidate, constraints)
}

/// Composite of memory, bandwidth and throughput against fixed ceilings.
///
/// Throughput uses the first preferred precision (fp16 when none are
/// given), then the remaining preferences in order.
pub fn capability_score(candidate: &AcceleratorCandidate, preferred: &[String]) -> f64 {
    let capabilities = &candidate.spec.capabilities;
    let throughput = capabilities
        .performance
        .as_ref()
        .map(|perf| {
            if preferred.is_empty() {
                perf.throughput(Precision::Fp16)
            } else {
                preferred
                    .iter()
                    .map(|p| perf.throughput_for(p))
                    .find(|t| *t > 0)
                    .unwrap_or(0)
            }
        })
        .unwrap_or(0);
    let memory = capabilities.memory_gb.unwrap_or(0);
    let bandwidth = capabilities.memory_bandwidth_gbps.unwrap_or(0);

    CAPABLE_MEMORY_WEIGHT * (memory as f64 / REFERENCE_MEMORY_GB)
        + CAPABLE_BANDWIDTH_WEIGHT * (bandwidth as f64 / REFERENCE_BANDWIDTH_GBPS)
        + CAPABLE_THROUGHPUT_WEIGHT * (throughput as f64 / REFERENCE_THROUGHPUT)
}

// ── Cost ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceKind {
    SpotHourly,
    Hourly,
    PerMillionTokens,
    Tier,
}

impl fmt::Display for PriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PriceKind::SpotHourly => "spot-hourly",
            PriceKind::Hourly => "hourly",
            PriceKind::PerMillionTokens => "per-million-tokens",
            PriceKind::Tier => "tier",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Price {
    pub value: f64,
    pub kind: PriceKind,
}

/// Spot, then on-demand hourly, then per-million-tokens, then the tier.
/// Non-finite prices are skipped.
pub fn candidate_price(candidate: &AcceleratorCandidate) -> Option<Price> {
    let cost = candidate.spec.cost.as_ref()?;
    let price = |value, kind| Some(Price { value, kind });
    let finite = |value: Option<f64>| value.filter(|v| v.is_finite());

    if let Some(spot) = finite(cost.spot_per_hour) {
        return price(spot, PriceKind::SpotHourly);
    }
    if let Some(hourly) = finite(cost.per_hour) {
        return price(hourly, PriceKind::Hourly);
    }
    if let Some(tokens) = finite(cost.per_million_tokens) {
        return price(tokens, PriceKind::PerMillionTokens);
    }
    let tier = cost.tier.as_deref().filter(|t| !t.is_empty())?;
    let value = match tier.to_ascii_lowercase().as_str() {
        "low" => 1.0,
        "high" => 3.0,
        _ => 2.0,
    };
    price(value, PriceKind::Tier)
}

// ── Ranking ────────────────────────────────────────────────────────

/// Scores eligible candidates under a policy, best first.
///
/// `Cheapest` drops candidates without any price. `FirstAvailable` does
/// not score and keeps the input order with a zero score.
pub fn rank(
    policy: AcceleratorSelectionPolicy,
    candidates: &[&AcceleratorCandidate],
    constraints: Option<&AcceleratorConstraints>,
) -> Vec<ScoredCandidate> {
    let scored = |candidate: &AcceleratorCandidate, score: f64, reason: String| ScoredCandidate {
        name: candidate.name.clone(),
        score,
        reason,
    };

    let mut ranked: Vec<ScoredCandidate> = match policy {
        AcceleratorSelectionPolicy::BestFit => candidates
            .iter()
            .copied()
            .map(|c| {
                let memory = memory_fit_score(c, constraints);
                let compute = compute_score(c, constraints);
                let reason = format!("memory fit {memory:.3}, compute {compute:.3}");
                scored(c, best_fit_score(c, constraints), reason)
            })
            .collect(),
        AcceleratorSelectionPolicy::MostCapable => {
            let preferred = constraints
                .map(|c| c.preferred_precisions.as_slice())
                .unwrap_or_default();
            candidates
                .iter()
                .copied()
                .map(|c| scored(c, capability_score(c, preferred), "capability".to_string()))
                .collect()
        }
        AcceleratorSelectionPolicy::Cheapest => candidates
            .iter()
            .copied()
            .filter_map(|c| {
                candidate_price(c).map(|p| scored(c, p.value, format!("{} price", p.kind)))
            })
            .collect(),
        AcceleratorSelectionPolicy::FirstAvailable => candidates
            .iter()
            .copied()
            .map(|c| scored(c, 0.0, "declared order".to_string()))
            .collect(),
    };

    match policy {
        AcceleratorSelectionPolicy::Cheapest => {
            ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
        }
        AcceleratorSelectionPolicy::FirstAvailable => {}
        _ => {
            ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        }
    }

    for candidate in &ranked {
        debug!(
            %policy,
            accelerator_class = %candidate.name,
            score = candidate.score,
            reason = %candidate.reason,
            "scored accelerator class"
        );
    }
    ranked
}
