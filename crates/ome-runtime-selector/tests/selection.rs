//! End-to-end runtime selection over a catalog snapshot.
//!
//! Each test seeds an in-memory `CatalogStore`, wires it into a
//! `RuntimeSelector` through `CatalogRuntimeFetcher` and checks the
//! selection, listing or validation outcome.

use ome_catalog::CatalogStore;
use ome_core::{
    AcceleratorRequirements, AcceleratorSelector, BaseModelSpec, ClusterServingRuntime,
    InferenceService, InferenceServiceSpec, ModelFormat, ModelSizeRange, RuntimeScope,
    RuntimeSelectorOperator, ServingRuntime, ServingRuntimeSpec, SupportedModelFormat,
};
use ome_runtime_selector::{CatalogRuntimeFetcher, RuntimeSelector, RuntimeSelectorConfig};

// ── Fixtures ──────────────────────────────────────────────────────

fn entry(format: ModelFormat, auto_select: bool) -> SupportedModelFormat {
    SupportedModelFormat {
        model_format: Some(format),
        auto_select: Some(auto_select),
        ..SupportedModelFormat::default()
    }
}

fn spec(entries: Vec<SupportedModelFormat>) -> ServingRuntimeSpec {
    ServingRuntimeSpec {
        supported_model_formats: entries,
        ..ServingRuntimeSpec::default()
    }
}

fn put_runtime(store: &CatalogStore, name: &str, created_at: u64, spec: ServingRuntimeSpec) {
    store
        .put_runtime(&ServingRuntime {
            name: name.to_string(),
            namespace: "prod".to_string(),
            created_at,
            spec,
        })
        .unwrap();
}

fn put_cluster_runtime(store: &CatalogStore, name: &str, created_at: u64, spec: ServingRuntimeSpec) {
    store
        .put_cluster_runtime(&ClusterServingRuntime {
            name: name.to_string(),
            created_at,
            spec,
        })
        .unwrap();
}

fn selector(store: &CatalogStore) -> RuntimeSelector {
    RuntimeSelector::new(
        RuntimeSelectorConfig::default(),
        CatalogRuntimeFetcher::new(store.clone()),
    )
}

fn safetensors() -> BaseModelSpec {
    BaseModelSpec::new(ModelFormat::new("safetensors").with_version("1.0.0"))
}

// ── Scenarios ─────────────────────────────────────────────────────

#[test]
fn required_accelerator_class_outside_allow_list() {
    let store = CatalogStore::open_in_memory().unwrap();
    let mut runtime = spec(vec![entry(
        ModelFormat::new("safetensors").with_version("1.0.0"),
        true,
    )]);
    runtime.accelerator_requirements = Some(AcceleratorRequirements {
        accelerator_classes: vec!["A100".to_string()],
    });
    put_runtime(&store, "vllm", 1, runtime);

    let workload = InferenceService {
        name: "llama".to_string(),
        namespace: "prod".to_string(),
        spec: InferenceServiceSpec {
            accelerator_selector: Some(AcceleratorSelector {
                accelerator_class: Some("H100".to_string()),
                ..AcceleratorSelector::default()
            }),
            ..InferenceServiceSpec::default()
        },
        ..InferenceService::default()
    };

    let sel = selector(&store);
    let err = sel
        .select_runtime(&safetensors(), Some(&workload), "prod")
        .unwrap_err();
    let reason = &err.none_found().unwrap().excluded_runtimes["vllm"];
    assert!(reason.contains("required accelerator class"), "got: {reason}");

    let err = sel
        .validate_runtime("vllm", &safetensors(), Some(&workload), "prod")
        .unwrap_err();
    assert!(err.is_compatibility());
}

#[test]
fn manual_only_runtime_fails_auto_selection_but_validates() {
    let store = CatalogStore::open_in_memory().unwrap();
    put_runtime(
        &store,
        "manual",
        1,
        spec(vec![
            entry(ModelFormat::new("safetensors").with_version("1.0.0"), false),
            entry(ModelFormat::new("onnx"), true),
        ]),
    );

    let sel = selector(&store);
    let err = sel.select_runtime(&safetensors(), None, "prod").unwrap_err();
    assert!(err.is_none_found());
    assert!(err.none_found().unwrap().excluded_runtimes.contains_key("manual"));

    let validation = sel
        .validate_runtime("manual", &safetensors(), None, "prod")
        .unwrap();
    assert_eq!(validation.scope, RuntimeScope::Namespace);
    assert!(!validation.auto_select);
    assert_eq!(
        validation.warnings,
        vec![ome_runtime_selector::selector::REASON_ZERO_SCORE]
    );
}

#[test]
fn unofficial_versions_force_equality() {
    let store = CatalogStore::open_in_memory().unwrap();
    put_runtime(
        &store,
        "nightly",
        1,
        spec(vec![entry(
            ModelFormat::new("safetensors")
                .with_version("1.8.0-alpha")
                .with_operator(RuntimeSelectorOperator::GreaterThan),
            true,
        )]),
    );

    let model = BaseModelSpec::new(ModelFormat::new("safetensors").with_version("1.8.0-dev"));
    let err = selector(&store).select_runtime(&model, None, "prod").unwrap_err();
    assert!(err.is_none_found());
}

// ── Ranking properties ────────────────────────────────────────────

#[test]
fn namespace_runtime_outranks_equal_cluster_runtime() {
    let store = CatalogStore::open_in_memory().unwrap();
    let shared = spec(vec![entry(
        ModelFormat::new("safetensors").with_version("1.0.0"),
        true,
    )]);
    put_cluster_runtime(&store, "aaa-cluster", 10, shared.clone());
    put_runtime(&store, "zzz-local", 1, shared);

    let chosen = selector(&store)
        .select_runtime(&safetensors(), None, "prod")
        .unwrap();
    assert_eq!(chosen.name, "zzz-local");
    assert_eq!(chosen.scope, RuntimeScope::Namespace);
}

#[test]
fn size_proximity_breaks_score_ties() {
    let store = CatalogStore::open_in_memory().unwrap();
    let ranged = |min: &str, max: &str| {
        let mut s = spec(vec![entry(ModelFormat::new("safetensors"), true)]);
        s.model_size_range = Some(ModelSizeRange {
            min: Some(min.to_string()),
            max: Some(max.to_string()),
        });
        s
    };
    put_runtime(&store, "wide", 1, ranged("1B", "405B"));
    put_runtime(&store, "snug", 1, ranged("7B", "13B"));

    let mut model = BaseModelSpec::new(ModelFormat::new("safetensors"));
    model.model_parameter_size = Some("8B".to_string());

    let matches = selector(&store)
        .get_compatible_runtimes(&model, None, "prod")
        .unwrap();
    let names: Vec<_> = matches.iter().map(|m| m.selection.name.as_str()).collect();
    assert_eq!(names, vec!["snug", "wide"]);
    assert!(matches[0].match_details.size_match);
}

#[test]
fn selection_is_idempotent() {
    let store = CatalogStore::open_in_memory().unwrap();
    for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
        let mut s = spec(vec![entry(ModelFormat::new("safetensors"), true)]);
        s.supported_model_formats[0].priority = Some((i % 2) as i32 + 1);
        put_runtime(&store, name, i as u64, s.clone());
        put_cluster_runtime(&store, name, i as u64, s);
    }

    let sel = selector(&store);
    let model = BaseModelSpec::new(ModelFormat::new("safetensors"));
    let first = sel.get_compatible_runtimes(&model, None, "prod").unwrap();
    let second = sel.get_compatible_runtimes(&model, None, "prod").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 8);
    assert!(first[..4].iter().all(|m| !m.selection.is_cluster()));
}

#[test]
fn exclusion_map_names_every_candidate() {
    let store = CatalogStore::open_in_memory().unwrap();
    let mut disabled = spec(vec![entry(ModelFormat::new("safetensors"), true)]);
    disabled.disabled = Some(true);
    put_runtime(&store, "disabled", 1, disabled);
    put_runtime(&store, "onnx-only", 2, spec(vec![entry(ModelFormat::new("onnx"), true)]));
    put_cluster_runtime(&store, "onnx-only", 3, spec(vec![entry(ModelFormat::new("onnx"), true)]));
    put_cluster_runtime(&store, "empty", 4, spec(vec![]));

    let err = selector(&store)
        .select_runtime(&safetensors(), None, "prod")
        .unwrap_err();
    let details = err.none_found().unwrap();
    assert_eq!(details.total_runtimes, 4);
    let keys: Vec<_> = details.excluded_runtimes.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["cluster/onnx-only", "disabled", "empty", "onnx-only"]);
}

#[test]
fn catalog_import_feeds_selection() {
    let store = CatalogStore::open_in_memory().unwrap();
    let catalog = ome_catalog::CatalogFile::from_toml_str(
        r#"
[[cluster_runtimes]]
name = "sglang"
created_at = 5

[[cluster_runtimes.spec.supported_model_formats]]
auto_select = true

[cluster_runtimes.spec.supported_model_formats.model_format]
name = "safetensors"
version = "1.0.0"
operator = "GreaterThanOrEqual"
"#,
    )
    .unwrap();
    store.import(&catalog).unwrap();

    let chosen = selector(&store)
        .select_runtime(&safetensors(), None, "prod")
        .unwrap();
    assert_eq!(chosen.name, "sglang");
    assert!(chosen.is_cluster());
    assert_eq!(chosen.score, 10);
}
