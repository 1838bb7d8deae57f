//! Runtime/model compatibility checks.
//!
//! The matcher answers yes or no with reasons and never scores. Checks
//! short-circuit in order: disabled, accelerator classes, supported-format
//! entries, then model size range.

use std::collections::BTreeSet;

use ome_core::version;
use ome_core::{
    BaseModelSpec, ComponentType, InferenceService, ModelFormat, ServingRuntimeSpec,
    SupportedModelFormat, parse_model_size,
};
use tracing::debug;

use crate::config::RuntimeSelectorConfig;
use crate::types::{CompatibilityReport, MatchDetails};

pub const REASON_DISABLED: &str = "runtime is disabled";
pub const WARNING_NO_AUTO_SELECT: &str =
    "runtime does not have auto-select enabled for any supported format";
pub const WARNING_NO_MODEL_SIZE: &str =
    "model does not specify size, but runtime has size constraints";

pub trait RuntimeMatcher: Send + Sync {
    fn compatibility_report(
        &self,
        runtime: &ServingRuntimeSpec,
        model: &BaseModelSpec,
        workload: Option<&InferenceService>,
        runtime_name: &str,
    ) -> CompatibilityReport;

    fn is_compatible(
        &self,
        runtime: &ServingRuntimeSpec,
        model: &BaseModelSpec,
        workload: Option<&InferenceService>,
        runtime_name: &str,
    ) -> bool {
        self.compatibility_report(runtime, model, workload, runtime_name)
            .compatible
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultRuntimeMatcher {
    config: RuntimeSelectorConfig,
}

impl DefaultRuntimeMatcher {
    pub fn new(config: RuntimeSelectorConfig) -> Self {
        Self { config }
    }

    /// Sub-check results for one supported-format entry.
    pub fn evaluate_entry(&self, model: &BaseModelSpec, entry: &SupportedModelFormat) -> MatchDetails {
        let priority = entry.priority.unwrap_or(self.config.default_priority);
        let mut details = MatchDetails {
            priority,
            auto_select_enabled: entry.auto_select_enabled(),
            size_match: true,
            ..MatchDetails::default()
        };

        details.architecture_match = optional_eq(
            model.model_architecture.as_ref(),
            entry.model_architecture.as_ref(),
        );
        if !details.architecture_match {
            details.reasons.push(match (&model.model_architecture, &entry.model_architecture) {
                (Some(m), Some(r)) => format!("architecture mismatch: model={m}, runtime={r}"),
                _ => "architecture requirement mismatch".to_string(),
            });
        }

        details.quantization_match =
            optional_eq(model.quantization.as_ref(), entry.quantization.as_ref());
        if !details.quantization_match {
            details.reasons.push(match (&model.quantization, &entry.quantization) {
                (Some(m), Some(r)) => format!("quantization mismatch: model={m}, runtime={r}"),
                _ => "quantization requirement mismatch".to_string(),
            });
        }

        details.format_match = entry
            .model_format
            .as_ref()
            .is_some_and(|supported| reference_matches(supported, &model.model_format));
        if details.format_match {
            if let Some(supported) = &entry.model_format {
                details.weight = details.weight.saturating_add(
                    effective_weight(supported.weight, self.config.model_format_weight)
                        .saturating_mul(i64::from(priority)),
                );
            }
        } else {
            details.reasons.push(format!(
                "model format {} not supported by entry",
                model.model_format.name
            ));
        }

        details.framework_match = match (&entry.model_framework, &model.model_framework) {
            (Some(supported), Some(framework)) => reference_matches(supported, framework),
            (None, None) => true,
            _ => false,
        };
        if details.framework_match {
            if let Some(supported) = &entry.model_framework {
                details.weight = details.weight.saturating_add(
                    effective_weight(supported.weight, self.config.model_framework_weight)
                        .saturating_mul(i64::from(priority)),
                );
            }
        } else {
            details.reasons.push("framework requirement mismatch".to_string());
        }

        details
    }
}

impl RuntimeMatcher for DefaultRuntimeMatcher {
    fn compatibility_report(
        &self,
        runtime: &ServingRuntimeSpec,
        model: &BaseModelSpec,
        workload: Option<&InferenceService>,
        runtime_name: &str,
    ) -> CompatibilityReport {
        if runtime.is_disabled() {
            return CompatibilityReport::incompatible(REASON_DISABLED);
        }

        if let Some(missing) = workload.and_then(|w| unsupported_accelerator_class(runtime, w)) {
            return CompatibilityReport::incompatible(format!(
                "runtime does not support the required accelerator class '{missing}'"
            ));
        }

        let Some(entry) = runtime
            .supported_model_formats
            .iter()
            .find(|entry| entry_matches(model, entry))
        else {
            return CompatibilityReport::incompatible(format!(
                "model format '{}' not in supported formats",
                model.format_label()
            ));
        };

        let mut report = CompatibilityReport {
            match_details: self.evaluate_entry(model, entry),
            ..CompatibilityReport::default()
        };

        if let Some(range) = &runtime.model_size_range {
            match &model.model_parameter_size {
                Some(size) => {
                    let Ok(model_size) = parse_model_size(size) else {
                        report.match_details.size_match = false;
                        report
                            .reasons
                            .push(format!("model size {size} cannot be parsed"));
                        return report;
                    };
                    let min = parse_bound(range.min.as_deref(), 0.0, &mut report.warnings);
                    let max = parse_bound(range.max.as_deref(), f64::INFINITY, &mut report.warnings);
                    if model_size < min || model_size > max {
                        report.match_details.size_match = false;
                        report.reasons.push(format!(
                            "model size {size} is outside supported range [{}, {}]",
                            range.min.as_deref().unwrap_or("0"),
                            range.max.as_deref().unwrap_or("unbounded"),
                        ));
                        return report;
                    }
                }
                None => report.warnings.push(WARNING_NO_MODEL_SIZE.to_string()),
            }
        }

        report.compatible = true;
        if !runtime.has_auto_select() {
            report.warnings.push(WARNING_NO_AUTO_SELECT.to_string());
        }

        debug!(
            runtime = %runtime_name,
            model_format = %model.model_format.name,
            compatible = report.compatible,
            warnings = report.warnings.len(),
            "compatibility check completed"
        );
        report
    }
}

/// All of format, framework, architecture and quantization match (or are
/// absent on both sides).
pub fn entry_matches(model: &BaseModelSpec, entry: &SupportedModelFormat) -> bool {
    let Some(supported) = &entry.model_format else {
        return false;
    };
    if !reference_matches(supported, &model.model_format) {
        return false;
    }
    let framework = match (&entry.model_framework, &model.model_framework) {
        (Some(supported), Some(framework)) => reference_matches(supported, framework),
        (None, None) => true,
        _ => false,
    };
    framework
        && optional_eq(
            model.model_architecture.as_ref(),
            entry.model_architecture.as_ref(),
        )
        && optional_eq(model.quantization.as_ref(), entry.quantization.as_ref())
}

/// Same name and, when both sides carry a version, the supported version
/// satisfies the model's under the entry's operator. A version on only one
/// side is a mismatch.
fn reference_matches(supported: &ModelFormat, model: &ModelFormat) -> bool {
    if supported.name != model.name {
        return false;
    }
    match (&supported.version, &model.version) {
        (Some(s), Some(m)) => version::satisfies(s, m, supported.operator()),
        (None, None) => true,
        _ => false,
    }
}

fn optional_eq<T: PartialEq>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    }
}

pub(crate) fn effective_weight(weight: i64, default: i64) -> i64 {
    if weight == 0 { default } else { weight }
}

fn parse_bound(bound: Option<&str>, default: f64, warnings: &mut Vec<String>) -> f64 {
    match bound {
        None => default,
        Some(raw) => parse_model_size(raw).unwrap_or_else(|err| {
            warnings.push(format!("ignoring size range bound: {err}"));
            default
        }),
    }
}

/// Accelerator classes the workload requires.
///
/// Per present component the first non-empty of component override,
/// workload selector and annotation applies. Without components the
/// selector and then the annotation apply.
pub fn required_accelerator_classes(workload: &InferenceService) -> BTreeSet<String> {
    let workload_class = workload
        .selector()
        .and_then(|s| s.accelerator_class.as_deref())
        .filter(|c| !c.is_empty())
        .or_else(|| workload.annotated_accelerator_class());

    let mut required = BTreeSet::new();
    let mut has_component = false;
    for component in ComponentType::ALL {
        if workload.component(component).is_none() {
            continue;
        }
        has_component = true;
        let class = workload
            .accelerator_override(component)
            .and_then(|o| o.accelerator_class.as_deref())
            .filter(|c| !c.is_empty())
            .or(workload_class);
        if let Some(class) = class {
            required.insert(class.to_string());
        }
    }
    if !has_component {
        if let Some(class) = workload_class {
            required.insert(class.to_string());
        }
    }
    required
}

/// First required class missing from the runtime's allow-list.
fn unsupported_accelerator_class(
    runtime: &ServingRuntimeSpec,
    workload: &InferenceService,
) -> Option<String> {
    let supported = runtime.accelerator_classes();
    required_accelerator_classes(workload)
        .into_iter()
        .find(|class| !supported.contains(class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ome_core::{
        ACCELERATOR_CLASS_ANNOTATION, AcceleratorOverride, AcceleratorRequirements,
        AcceleratorSelector, ComponentSpec, ModelQuantization, ModelSizeRange,
        RuntimeSelectorOperator,
    };

    fn make_entry(format: ModelFormat, auto_select: bool) -> SupportedModelFormat {
        SupportedModelFormat {
            model_format: Some(format),
            auto_select: Some(auto_select),
            ..SupportedModelFormat::default()
        }
    }

    fn make_runtime(entries: Vec<SupportedModelFormat>) -> ServingRuntimeSpec {
        ServingRuntimeSpec {
            supported_model_formats: entries,
            ..ServingRuntimeSpec::default()
        }
    }

    fn make_model(name: &str, version: &str) -> BaseModelSpec {
        BaseModelSpec::new(ModelFormat::new(name).with_version(version))
    }

    fn matcher() -> DefaultRuntimeMatcher {
        DefaultRuntimeMatcher::default()
    }

    fn workload_with_class(class: &str) -> InferenceService {
        InferenceService {
            spec: ome_core::InferenceServiceSpec {
                accelerator_selector: Some(AcceleratorSelector {
                    accelerator_class: Some(class.to_string()),
                    ..AcceleratorSelector::default()
                }),
                ..Default::default()
            },
            ..InferenceService::default()
        }
    }

    // ── Format / version ───────────────────────────────────────────

    #[test]
    fn exact_format_match_is_compatible() {
        let runtime = make_runtime(vec![make_entry(
            ModelFormat::new("safetensors").with_version("1.0.0"),
            true,
        )]);
        let report = matcher().compatibility_report(
            &runtime,
            &make_model("safetensors", "1.0.0"),
            None,
            "vllm",
        );
        assert!(report.compatible, "reasons: {:?}", report.reasons);
        assert!(report.match_details.format_match);
        assert!(report.match_details.framework_match);
        assert_eq!(report.match_details.weight, 10);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn version_on_one_side_only_is_mismatch() {
        let runtime = make_runtime(vec![make_entry(ModelFormat::new("safetensors"), true)]);
        let report = matcher().compatibility_report(
            &runtime,
            &make_model("safetensors", "1.0.0"),
            None,
            "vllm",
        );
        assert!(!report.compatible);
        assert_eq!(
            report.first_reason(),
            Some("model format 'mt:safetensors:1.0.0' not in supported formats")
        );
    }

    #[test]
    fn operator_applies_to_supported_version() {
        let runtime = make_runtime(vec![make_entry(
            ModelFormat::new("onnx")
                .with_version("1.2.0")
                .with_operator(RuntimeSelectorOperator::GreaterThanOrEqual),
            true,
        )]);
        assert!(matcher().is_compatible(&runtime, &make_model("onnx", "1.1.0"), None, "rt"));
        assert!(!matcher().is_compatible(&runtime, &make_model("onnx", "1.3.0"), None, "rt"));
    }

    #[test]
    fn unofficial_versions_do_not_order() {
        let runtime = make_runtime(vec![make_entry(
            ModelFormat::new("safetensors")
                .with_version("1.8.0-alpha")
                .with_operator(RuntimeSelectorOperator::GreaterThan),
            true,
        )]);
        let model = make_model("safetensors", "1.8.0-dev");
        assert!(!matcher().is_compatible(&runtime, &model, None, "rt"));
    }

    #[test]
    fn empty_entry_matches_nothing() {
        let runtime = make_runtime(vec![SupportedModelFormat::default()]);
        assert!(!matcher().is_compatible(&runtime, &make_model("onnx", "1"), None, "rt"));
        let runtime = make_runtime(vec![]);
        assert!(!matcher().is_compatible(&runtime, &make_model("onnx", "1"), None, "rt"));
    }

    // ── Framework / architecture / quantization ────────────────────

    #[test]
    fn framework_presence_must_agree() {
        let mut entry = make_entry(ModelFormat::new("safetensors"), true);
        entry.model_framework = Some(ModelFormat::new("transformers"));
        let runtime = make_runtime(vec![entry]);

        let model = BaseModelSpec::new(ModelFormat::new("safetensors"));
        assert!(!matcher().is_compatible(&runtime, &model, None, "rt"));

        let mut model = model;
        model.model_framework = Some(ModelFormat::new("transformers"));
        let report = matcher().compatibility_report(&runtime, &model, None, "rt");
        assert!(report.compatible);
        assert_eq!(report.match_details.weight, 15);
    }

    #[test]
    fn architecture_and_quantization_need_both_or_neither() {
        let mut entry = make_entry(ModelFormat::new("safetensors"), true);
        entry.model_architecture = Some("LlamaForCausalLM".to_string());
        entry.quantization = Some(ModelQuantization::Fp8);
        let runtime = make_runtime(vec![entry]);

        let mut model = BaseModelSpec::new(ModelFormat::new("safetensors"));
        model.model_architecture = Some("LlamaForCausalLM".to_string());
        assert!(!matcher().is_compatible(&runtime, &model, None, "rt"));

        model.quantization = Some(ModelQuantization::Fp8);
        assert!(matcher().is_compatible(&runtime, &model, None, "rt"));

        model.model_architecture = Some("MistralForCausalLM".to_string());
        let report = matcher().compatibility_report(&runtime, &model, None, "rt");
        assert!(!report.compatible);
        assert!(report.first_reason().unwrap().contains("MistralForCausalLM"));
    }

    #[test]
    fn evaluate_entry_records_mismatch_reasons() {
        let mut entry = make_entry(ModelFormat::new("safetensors"), false);
        entry.model_architecture = Some("LlamaForCausalLM".to_string());
        entry.priority = Some(3);
        let details = matcher().evaluate_entry(
            &BaseModelSpec::new(ModelFormat::new("safetensors")),
            &entry,
        );
        assert!(details.format_match);
        assert!(!details.architecture_match);
        assert!(!details.auto_select_enabled);
        assert_eq!(details.priority, 3);
        assert_eq!(details.weight, 30);
        assert_eq!(details.reasons, vec!["architecture requirement mismatch"]);
    }

    #[test]
    fn entry_weight_saturates() {
        let mut entry = make_entry(
            ModelFormat::new("safetensors").with_weight(i64::MAX / 2 + 1),
            true,
        );
        entry.priority = Some(2);
        let details = matcher().evaluate_entry(
            &BaseModelSpec::new(ModelFormat::new("safetensors")),
            &entry,
        );
        assert_eq!(details.weight, i64::MAX);
    }

    // ── Disabled / auto-select ─────────────────────────────────────

    #[test]
    fn disabled_short_circuits() {
        let mut runtime = make_runtime(vec![make_entry(ModelFormat::new("onnx"), true)]);
        runtime.disabled = Some(true);
        let report = matcher().compatibility_report(
            &runtime,
            &BaseModelSpec::new(ModelFormat::new("onnx")),
            None,
            "rt",
        );
        assert!(!report.compatible);
        assert_eq!(report.reasons, vec![REASON_DISABLED]);
    }

    #[test]
    fn no_auto_select_is_warning_not_reason() {
        let runtime = make_runtime(vec![make_entry(ModelFormat::new("onnx"), false)]);
        let report = matcher().compatibility_report(
            &runtime,
            &BaseModelSpec::new(ModelFormat::new("onnx")),
            None,
            "rt",
        );
        assert!(report.compatible);
        assert_eq!(report.warnings, vec![WARNING_NO_AUTO_SELECT]);
    }

    // ── Size range ─────────────────────────────────────────────────

    #[test]
    fn size_range_is_inclusive() {
        let mut runtime = make_runtime(vec![make_entry(ModelFormat::new("safetensors"), true)]);
        runtime.model_size_range = Some(ModelSizeRange {
            min: Some("1B".to_string()),
            max: Some("70B".to_string()),
        });
        let mut model = BaseModelSpec::new(ModelFormat::new("safetensors"));

        for size in ["1B", "7B", "70B"] {
            model.model_parameter_size = Some(size.to_string());
            let report = matcher().compatibility_report(&runtime, &model, None, "rt");
            assert!(report.compatible, "{size} should fit");
            assert!(report.match_details.size_match);
        }

        model.model_parameter_size = Some("405B".to_string());
        let report = matcher().compatibility_report(&runtime, &model, None, "rt");
        assert!(!report.compatible);
        assert!(!report.match_details.size_match);
        assert_eq!(
            report.first_reason(),
            Some("model size 405B is outside supported range [1B, 70B]")
        );
    }

    #[test]
    fn missing_model_size_warns() {
        let mut runtime = make_runtime(vec![make_entry(ModelFormat::new("safetensors"), true)]);
        runtime.model_size_range = Some(ModelSizeRange {
            min: Some("1B".to_string()),
            max: None,
        });
        let report = matcher().compatibility_report(
            &runtime,
            &BaseModelSpec::new(ModelFormat::new("safetensors")),
            None,
            "rt",
        );
        assert!(report.compatible);
        assert_eq!(report.warnings, vec![WARNING_NO_MODEL_SIZE]);
    }

    // ── Accelerator classes ────────────────────────────────────────

    #[test]
    fn required_class_must_be_in_allow_list() {
        let mut runtime = make_runtime(vec![make_entry(ModelFormat::new("safetensors"), true)]);
        runtime.accelerator_requirements = Some(AcceleratorRequirements {
            accelerator_classes: vec!["A100".to_string()],
        });
        let model = BaseModelSpec::new(ModelFormat::new("safetensors"));

        let report =
            matcher().compatibility_report(&runtime, &model, Some(&workload_with_class("H100")), "rt");
        assert!(!report.compatible);
        assert!(report.first_reason().unwrap().contains("required accelerator class"));

        assert!(matcher().is_compatible(&runtime, &model, Some(&workload_with_class("A100")), "rt"));
        assert!(matcher().is_compatible(&runtime, &model, Some(&InferenceService::default()), "rt"));
    }

    #[test]
    fn required_class_against_empty_allow_list_fails() {
        let runtime = make_runtime(vec![make_entry(ModelFormat::new("safetensors"), true)]);
        let model = BaseModelSpec::new(ModelFormat::new("safetensors"));
        assert!(!matcher().is_compatible(&runtime, &model, Some(&workload_with_class("A100")), "rt"));
    }

    #[test]
    fn component_override_beats_selector_and_annotation() {
        let mut workload = workload_with_class("A100");
        workload
            .annotations
            .insert(ACCELERATOR_CLASS_ANNOTATION.to_string(), "L4".to_string());
        workload.spec.engine = Some(ComponentSpec {
            accelerator_override: Some(AcceleratorOverride {
                accelerator_class: Some("H100".to_string()),
                policy: None,
            }),
        });
        workload.spec.decoder = Some(ComponentSpec::default());

        let required = required_accelerator_classes(&workload);
        assert_eq!(
            required.into_iter().collect::<Vec<_>>(),
            vec!["A100".to_string(), "H100".to_string()]
        );
    }

    #[test]
    fn annotation_is_last_resort() {
        let mut workload = InferenceService::default();
        workload
            .annotations
            .insert(ACCELERATOR_CLASS_ANNOTATION.to_string(), "L4".to_string());
        let required = required_accelerator_classes(&workload);
        assert!(required.contains("L4"));
        assert_eq!(required.len(), 1);
    }
}
