//! Hard eligibility filter for accelerator classes.
//!
//! Checks run in a fixed order and the first failure supplies the reason.
//! Minimum compute performance is scored, never filtered.

use std::collections::{BTreeMap, BTreeSet};

use ome_core::AcceleratorConstraints;
use tracing::debug;

use crate::types::AcceleratorCandidate;

pub const REASON_EXCLUDED: &str = "explicitly excluded";
pub const REASON_UNAVAILABLE: &str = "no accelerators currently available";

/// `Err(reason)` when the candidate fails a hard constraint.
///
/// Without constraints every candidate is eligible, availability included.
pub fn meets_requirements(
    candidate: &AcceleratorCandidate,
    constraints: Option<&AcceleratorConstraints>,
    consider_availability: bool,
) -> Result<(), String> {
    let Some(constraints) = constraints else {
        return Ok(());
    };
    let spec = &candidate.spec;
    let capabilities = &spec.capabilities;

    if constraints.excluded_classes.iter().any(|c| *c == candidate.name) {
        return Err(REASON_EXCLUDED.to_string());
    }

    if !constraints.architecture_families.is_empty() {
        let family = spec.family.to_lowercase();
        let vendor_family = format!("{}-{}", spec.vendor.to_lowercase(), family);
        let allowed = constraints.architecture_families.iter().any(|entry| {
            if entry.contains('-') {
                entry.eq_ignore_ascii_case(&vendor_family)
            } else {
                entry.eq_ignore_ascii_case(&family)
            }
        });
        if !allowed {
            return Err(format!("architecture family {family} not in allowed list"));
        }
    }

    if let Some(min) = constraints.min_memory {
        let Some(memory) = capabilities.memory_gb else {
            return Err("missing memory specification for MinMemory check".to_string());
        };
        if memory < min {
            return Err(format!("memory {memory}GB < required {min}GB"));
        }
    }

    if let Some(max) = constraints.max_memory {
        let Some(memory) = capabilities.memory_gb else {
            return Err("missing memory specification for MaxMemory check".to_string());
        };
        if memory > max {
            return Err(format!("memory {memory}GB > max allowed {max}GB"));
        }
    }

    if !constraints.required_features.is_empty() {
        let features: BTreeSet<String> =
            capabilities.features.iter().map(|f| f.to_lowercase()).collect();
        if let Some(missing) = constraints
            .required_features
            .iter()
            .find(|f| !features.contains(&f.to_lowercase()))
        {
            return Err(format!("missing required feature: {missing}"));
        }
    }

    if let Some(required) = &constraints.min_architecture_version {
        let actual = capabilities
            .compute_capability
            .as_deref()
            .filter(|c| !c.is_empty());
        let Some(actual) = actual else {
            return Err("missing compute capability for architecture version check".to_string());
        };
        // Plain string order; only meaningful for same-shaped versions.
        if actual < required.as_str() {
            return Err(format!("compute capability {actual} < required {required}"));
        }
    }

    if consider_availability
        && candidate
            .status
            .as_ref()
            .is_some_and(|s| s.available_accelerators <= 0)
    {
        return Err(REASON_UNAVAILABLE.to_string());
    }

    Ok(())
}

/// Split candidates into the eligible ones (input order kept) and a
/// name to reason map for the rest.
pub fn filter_candidates<'a>(
    candidates: &'a [AcceleratorCandidate],
    constraints: Option<&AcceleratorConstraints>,
    consider_availability: bool,
) -> (Vec<&'a AcceleratorCandidate>, BTreeMap<String, String>) {
    let mut eligible = Vec::with_capacity(candidates.len());
    let mut excluded = BTreeMap::new();
    for candidate in candidates {
        match meets_requirements(candidate, constraints, consider_availability) {
            Ok(()) => eligible.push(candidate),
            Err(reason) => {
                debug!(accelerator_class = %candidate.name, %reason, "filtered accelerator class");
                excluded.insert(candidate.name.clone(), reason);
            }
        }
    }
    (eligible, excluded)
}
