//! End-to-end accelerator class selection over a catalog snapshot.

use ome_accelerator_selector::{
    AcceleratorCandidate, AcceleratorSelector, AcceleratorSelectorConfig,
    CatalogAcceleratorFetcher, SelectionSource, policy,
};
use ome_catalog::CatalogStore;
use ome_core::{
    AcceleratorCapabilities, AcceleratorClass, AcceleratorClassSpec, AcceleratorConstraints,
    AcceleratorCost, AcceleratorPerformance, AcceleratorRequirements, AcceleratorSelectionPolicy,
    ComponentType, InferenceService, InferenceServiceSpec, ServingRuntimeSpec,
};

// ── Fixtures ──────────────────────────────────────────────────────

fn class(name: &str, family: &str, memory_gb: u64) -> AcceleratorClass {
    AcceleratorClass {
        name: name.to_string(),
        created_at: 1,
        spec: AcceleratorClassSpec {
            vendor: "nvidia".to_string(),
            family: family.to_string(),
            model: name.to_string(),
            capabilities: AcceleratorCapabilities {
                memory_gb: Some(memory_gb),
                ..AcceleratorCapabilities::default()
            },
            cost: None,
        },
        status: None,
    }
}

fn hourly(mut class: AcceleratorClass, per_hour: f64) -> AcceleratorClass {
    class.spec.cost = Some(AcceleratorCost {
        per_hour: Some(per_hour),
        ..AcceleratorCost::default()
    });
    class
}

fn seeded(classes: &[AcceleratorClass]) -> AcceleratorSelector {
    let store = CatalogStore::open_in_memory().unwrap();
    for class in classes {
        store.put_accelerator_class(class).unwrap();
    }
    AcceleratorSelector::new(
        AcceleratorSelectorConfig::default(),
        CatalogAcceleratorFetcher::new(store),
    )
}

fn runtime(classes: &[&str]) -> ServingRuntimeSpec {
    ServingRuntimeSpec {
        accelerator_requirements: Some(AcceleratorRequirements {
            accelerator_classes: classes.iter().map(|c| c.to_string()).collect(),
        }),
        ..ServingRuntimeSpec::default()
    }
}

fn workload(policy: AcceleratorSelectionPolicy, constraints: AcceleratorConstraints) -> InferenceService {
    InferenceService {
        name: "llama".to_string(),
        namespace: "prod".to_string(),
        spec: InferenceServiceSpec {
            accelerator_selector: Some(ome_core::AcceleratorSelector {
                accelerator_class: None,
                policy: Some(policy),
                constraints: Some(constraints),
            }),
            ..InferenceServiceSpec::default()
        },
        ..InferenceService::default()
    }
}

// ── Scenarios ─────────────────────────────────────────────────────

#[test]
fn best_fit_prefers_right_sized_memory() {
    let sel = seeded(&[class("a100-40", "ampere", 40), class("a100-80", "ampere", 80)]);
    let isvc = workload(
        AcceleratorSelectionPolicy::BestFit,
        AcceleratorConstraints {
            min_memory: Some(40),
            ..AcceleratorConstraints::default()
        },
    );

    let chosen = sel
        .select_accelerator_class(&isvc, &runtime(&["a100-80", "a100-40"]), ComponentType::Engine)
        .unwrap()
        .unwrap();
    assert_eq!(chosen.name, "a100-40");
    assert_eq!(chosen.source, SelectionSource::Policy(AcceleratorSelectionPolicy::BestFit));
}

#[test]
fn cheapest_picks_lowest_hourly_price() {
    let sel = seeded(&[
        hourly(class("h100", "hopper", 80), 4.0),
        hourly(class("a100", "ampere", 80), 2.0),
        hourly(class("l4", "ada", 24), 1.0),
    ]);
    let isvc = workload(AcceleratorSelectionPolicy::Cheapest, AcceleratorConstraints::default());

    let chosen = sel
        .select_accelerator_class(&isvc, &runtime(&["h100", "a100", "l4"]), ComponentType::Engine)
        .unwrap()
        .unwrap();
    assert_eq!(chosen.name, "l4");
}

#[test]
fn second_preferred_precision_halves_compute_term() {
    let mut candidate = class("l40s", "ada", 48);
    candidate.spec.capabilities.performance = Some(AcceleratorPerformance {
        fp16_tflops: Some(100),
        ..AcceleratorPerformance::default()
    });
    let constraints = AcceleratorConstraints {
        preferred_precisions: vec!["fp8".to_string(), "fp16".to_string()],
        min_compute_performance_tflops: Some(100),
        ..AcceleratorConstraints::default()
    };
    let candidate: AcceleratorCandidate = candidate.into();
    assert_eq!(policy::compute_score(&candidate, Some(&constraints)), 0.5);
    // No memory floor, so memory fit is perfect.
    let expected = 0.7 + 0.3 * 0.5;
    assert!((policy::best_fit_score(&candidate, Some(&constraints)) - expected).abs() < 1e-9);
}

// ── Properties ────────────────────────────────────────────────────

#[test]
fn ranking_is_idempotent() {
    let classes: Vec<_> = (0..6)
        .map(|i| hourly(class(&format!("gpu-{i}"), "hopper", 40 + 20 * i), (i % 3) as f64))
        .collect();
    let names: Vec<String> = classes.iter().map(|c| c.name.clone()).collect();
    let sel = seeded(&classes);
    let constraints = AcceleratorConstraints {
        min_memory: Some(40),
        ..AcceleratorConstraints::default()
    };

    for policy in [
        AcceleratorSelectionPolicy::BestFit,
        AcceleratorSelectionPolicy::Cheapest,
        AcceleratorSelectionPolicy::MostCapable,
    ] {
        let first = sel.rank_candidates(policy, &names, Some(&constraints)).unwrap();
        let second = sel.rank_candidates(policy, &names, Some(&constraints)).unwrap();
        assert_eq!(first, second, "{policy} ranking changed between calls");
        assert_eq!(
            sel.select_by_policy(policy, &names, Some(&constraints)).unwrap(),
            first.ranked[0].name
        );
    }
}

#[test]
fn exclusions_name_every_filtered_class() {
    let mut busy = class("busy", "hopper", 80);
    busy.status = Some(ome_core::AcceleratorClassStatus {
        total_accelerators: 8,
        available_accelerators: 0,
    });
    let store = CatalogStore::open_in_memory().unwrap();
    for c in [
        class("small", "hopper", 24),
        class("amd", "cdna3", 192),
        class("banned", "hopper", 80),
        busy,
    ] {
        store.put_accelerator_class(&c).unwrap();
    }
    let sel = AcceleratorSelector::new(
        AcceleratorSelectorConfig {
            consider_availability: true,
        },
        CatalogAcceleratorFetcher::new(store),
    );
    let constraints = AcceleratorConstraints {
        excluded_classes: vec!["banned".to_string()],
        architecture_families: vec!["hopper".to_string()],
        min_memory: Some(40),
        ..AcceleratorConstraints::default()
    };
    let names: Vec<String> = ["small", "amd", "banned", "busy", "gone"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let err = sel
        .select_by_policy(AcceleratorSelectionPolicy::BestFit, &names, Some(&constraints))
        .unwrap_err();
    let details = err.none_found().unwrap();
    assert_eq!(details.total_candidates, 5);
    assert_eq!(details.eligible_candidates, 0);
    assert_eq!(details.excluded.len(), 5);
    assert_eq!(details.excluded["small"], "memory 24GB < required 40GB");
    assert_eq!(details.excluded["amd"], "architecture family cdna3 not in allowed list");
    assert_eq!(details.excluded["banned"], "explicitly excluded");
    assert_eq!(details.excluded["busy"], "no accelerators currently available");
    assert_eq!(details.excluded["gone"], "accelerator class not found");
}

#[test]
fn catalog_import_feeds_selection() {
    let store = CatalogStore::open_in_memory().unwrap();
    let catalog = ome_catalog::CatalogFile::from_toml_str(
        r#"
[[accelerator_classes]]
name = "h100"

[accelerator_classes.spec]
vendor = "nvidia"
family = "hopper"
model = "H100-SXM"

[accelerator_classes.spec.capabilities]
memory_gb = 80
memory_bandwidth_gbps = 3350
features = ["nvlink"]

[[accelerator_classes]]
name = "l4"

[accelerator_classes.spec]
vendor = "nvidia"
family = "ada"
model = "L4"

[accelerator_classes.spec.capabilities]
memory_gb = 24
memory_bandwidth_gbps = 300
"#,
    )
    .unwrap();
    store.import(&catalog).unwrap();
    let sel = AcceleratorSelector::new(
        AcceleratorSelectorConfig::default(),
        CatalogAcceleratorFetcher::new(store),
    );

    let isvc = workload(AcceleratorSelectionPolicy::MostCapable, AcceleratorConstraints::default());
    let chosen = sel
        .select_accelerator_class(&isvc, &runtime(&["l4", "h100"]), ComponentType::Decoder)
        .unwrap()
        .unwrap();
    assert_eq!(chosen.name, "h100");
    assert_eq!(chosen.spec.model, "H100-SXM");
}
