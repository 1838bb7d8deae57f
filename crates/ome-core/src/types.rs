//! Declarative resources consumed by the selection engine.
//!
//! These types mirror the serving-runtime, accelerator-class and
//! inference-service resources of the control plane. Optional fields are
//! `Option<T>` throughout: several compatibility checks depend on telling
//! "absent" apart from "present but empty".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Annotation carrying a fallback accelerator-class name on a workload.
pub const ACCELERATOR_CLASS_ANNOTATION: &str = "ome.io/accelerator-class";

// ── Model ──────────────────────────────────────────────────────────

/// Comparison operator applied to a supported-format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuntimeSelectorOperator {
    #[default]
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
}

/// A named, optionally versioned format or framework reference.
///
/// Models use `name`/`version`; runtimes additionally set `operator` and
/// `weight` on their supported-format entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelFormat {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<RuntimeSelectorOperator>,
    pub weight: i64,
}

/// Framework references share the format shape.
pub type ModelFramework = ModelFormat;

impl ModelFormat {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_operator(mut self, operator: RuntimeSelectorOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// The effective operator; unset means `Equal`.
    pub fn operator(&self) -> RuntimeSelectorOperator {
        self.operator.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelQuantization {
    Fp8,
    FbgemmFp8,
    Int4,
}

impl ModelQuantization {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelQuantization::Fp8 => "fp8",
            ModelQuantization::FbgemmFp8 => "fbgemm_fp8",
            ModelQuantization::Int4 => "int4",
        }
    }
}

impl fmt::Display for ModelQuantization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requirements a model places on the runtime that serves it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseModelSpec {
    pub model_format: ModelFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_framework: Option<ModelFramework>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantization: Option<ModelQuantization>,
    /// Parameter count, e.g. "7B" or "1.5T".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_parameter_size: Option<String>,
}

impl BaseModelSpec {
    pub fn new(model_format: ModelFormat) -> Self {
        Self {
            model_format,
            ..Self::default()
        }
    }

    /// Canonical `mt:` label: format, version, architecture, quantization,
    /// framework and framework version, joined by ':' where present.
    pub fn format_label(&self) -> String {
        let mut label = format!("mt:{}", self.model_format.name);
        if let Some(version) = &self.model_format.version {
            label.push(':');
            label.push_str(version);
        }
        if let Some(arch) = &self.model_architecture {
            label.push(':');
            label.push_str(arch);
        }
        if let Some(quant) = &self.quantization {
            label.push(':');
            label.push_str(quant.as_str());
        }
        if let Some(framework) = &self.model_framework {
            label.push(':');
            label.push_str(&framework.name);
            if let Some(version) = &framework.version {
                label.push(':');
                label.push_str(version);
            }
        }
        label
    }
}

// ── Serving runtime ────────────────────────────────────────────────

/// One format/framework combination a runtime can serve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportedModelFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_format: Option<ModelFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_framework: Option<ModelFramework>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantization: Option<ModelQuantization>,
    /// Only entries with `Some(true)` take part in automatic selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_select: Option<bool>,
    /// Priority multiplier for automatic selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl SupportedModelFormat {
    pub fn auto_select_enabled(&self) -> bool {
        self.auto_select == Some(true)
    }
}

/// Inclusive model-size bounds in parameter-size notation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSizeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorRequirements {
    /// Accelerator classes this runtime can run on, in preference order.
    pub accelerator_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingRuntimeSpec {
    pub supported_model_formats: Vec<SupportedModelFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_size_range: Option<ModelSizeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator_requirements: Option<AcceleratorRequirements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl ServingRuntimeSpec {
    pub fn is_disabled(&self) -> bool {
        self.disabled.unwrap_or(false)
    }

    /// Declared accelerator allow-list (empty when absent).
    pub fn accelerator_classes(&self) -> &[String] {
        self.accelerator_requirements
            .as_ref()
            .map(|r| r.accelerator_classes.as_slice())
            .unwrap_or_default()
    }

    /// True if at least one supported format is eligible for auto-selection.
    pub fn has_auto_select(&self) -> bool {
        self.supported_model_formats
            .iter()
            .any(SupportedModelFormat::auto_select_enabled)
    }
}

/// Whether a runtime came from the namespace or the cluster scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeScope {
    Namespace,
    Cluster,
}

impl RuntimeScope {
    pub fn is_cluster(&self) -> bool {
        matches!(self, RuntimeScope::Cluster)
    }
}

impl fmt::Display for RuntimeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeScope::Namespace => f.write_str("namespace"),
            RuntimeScope::Cluster => f.write_str("cluster"),
        }
    }
}

/// Namespace-scoped serving runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingRuntime {
    pub name: String,
    pub namespace: String,
    /// Unix timestamp (seconds) when this runtime was created.
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub spec: ServingRuntimeSpec,
}

impl ServingRuntime {
    /// Build the composite key for the namespace runtimes table.
    pub fn table_key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// Cluster-scoped serving runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterServingRuntime {
    pub name: String,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub spec: ServingRuntimeSpec,
}

// ── Accelerator class ──────────────────────────────────────────────

/// Numeric precision used to look up accelerator throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Fp32,
    Fp16,
    Int8,
    Fp8,
    Int4,
}

impl Precision {
    /// Case-insensitive lookup; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fp32" => Some(Precision::Fp32),
            "fp16" => Some(Precision::Fp16),
            "int8" => Some(Precision::Int8),
            "fp8" => Some(Precision::Fp8),
            "int4" => Some(Precision::Int4),
            _ => None,
        }
    }
}

/// Peak throughput per precision (TFLOPS, or TOPS for integer precisions).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorPerformance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fp32_tflops: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fp16_tflops: Option<u64>,
    /// Shared by int8 and fp8.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub int8_tops: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub int4_tops: Option<u64>,
}

impl AcceleratorPerformance {
    pub fn throughput(&self, precision: Precision) -> u64 {
        let value = match precision {
            Precision::Fp32 => self.fp32_tflops,
            Precision::Fp16 => self.fp16_tflops,
            Precision::Int8 | Precision::Fp8 => self.int8_tops,
            Precision::Int4 => self.int4_tops,
        };
        value.unwrap_or(0)
    }

    /// Throughput for a precision given by name (0 for unknown names).
    pub fn throughput_for(&self, precision: &str) -> u64 {
        Precision::parse(precision)
            .map(|p| self.throughput(p))
            .unwrap_or(0)
    }

    pub fn max_throughput(&self) -> u64 {
        [
            self.fp32_tflops,
            self.fp16_tflops,
            self.int8_tops,
            self.int4_tops,
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_bandwidth_gbps: Option<u64>,
    /// Architecture version, e.g. "8.0" (Ampere) or "9.0" (Hopper).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_capability: Option<String>,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<AcceleratorPerformance>,
}

/// Pricing for an accelerator class, in dollars.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorCost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_hour: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_million_tokens: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_per_hour: Option<f64>,
    /// Qualitative tier: "low", "medium" or "high".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorClassSpec {
    pub vendor: String,
    pub family: String,
    pub model: String,
    pub capabilities: AcceleratorCapabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<AcceleratorCost>,
}

/// Live inventory reported for an accelerator class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorClassStatus {
    pub total_accelerators: i32,
    pub available_accelerators: i32,
}

/// Cluster-scoped accelerator class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceleratorClass {
    pub name: String,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub spec: AcceleratorClassSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AcceleratorClassStatus>,
}

// ── Workload ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcceleratorSelectionPolicy {
    BestFit,
    Cheapest,
    MostCapable,
    FirstAvailable,
}

impl fmt::Display for AcceleratorSelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcceleratorSelectionPolicy::BestFit => "BestFit",
            AcceleratorSelectionPolicy::Cheapest => "Cheapest",
            AcceleratorSelectionPolicy::MostCapable => "MostCapable",
            AcceleratorSelectionPolicy::FirstAvailable => "FirstAvailable",
        };
        f.write_str(name)
    }
}

impl FromStr for AcceleratorSelectionPolicy {
    type Err = String;

    /// Accepts `BestFit`, `best-fit`, `best_fit` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "bestfit" => Ok(AcceleratorSelectionPolicy::BestFit),
            "cheapest" => Ok(AcceleratorSelectionPolicy::Cheapest),
            "mostcapable" => Ok(AcceleratorSelectionPolicy::MostCapable),
            "firstavailable" => Ok(AcceleratorSelectionPolicy::FirstAvailable),
            _ => Err(format!("unknown accelerator selection policy: {s}")),
        }
    }
}

/// Hard constraints and soft preferences for accelerator selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorConstraints {
    pub excluded_classes: Vec<String>,
    /// Family names ("hopper") or vendor-family composites ("nvidia-hopper").
    pub architecture_families: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_memory: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory: Option<u64>,
    pub required_features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_architecture_version: Option<String>,
    /// Scored, never filtered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_compute_performance_tflops: Option<u64>,
    pub preferred_precisions: Vec<String>,
}

/// Workload-level accelerator selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<AcceleratorSelectionPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<AcceleratorConstraints>,
}

/// Component-level accelerator override.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<AcceleratorSelectionPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator_override: Option<AcceleratorOverride>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Engine,
    Decoder,
}

impl ComponentType {
    pub const ALL: [ComponentType; 2] = [ComponentType::Engine, ComponentType::Decoder];
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentType::Engine => f.write_str("engine"),
            ComponentType::Decoder => f.write_str("decoder"),
        }
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "engine" => Ok(ComponentType::Engine),
            "decoder" => Ok(ComponentType::Decoder),
            _ => Err(format!("unknown component: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceServiceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<ComponentSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder: Option<ComponentSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator_selector: Option<AcceleratorSelector>,
}

/// The workload a runtime and accelerator are being chosen for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceService {
    pub name: String,
    pub namespace: String,
    pub annotations: BTreeMap<String, String>,
    pub spec: InferenceServiceSpec,
}

impl InferenceService {
    pub fn component(&self, component: ComponentType) -> Option<&ComponentSpec> {
        match component {
            ComponentType::Engine => self.spec.engine.as_ref(),
            ComponentType::Decoder => self.spec.decoder.as_ref(),
        }
    }

    pub fn accelerator_override(&self, component: ComponentType) -> Option<&AcceleratorOverride> {
        self.component(component)
            .and_then(|c| c.accelerator_override.as_ref())
    }

    pub fn selector(&self) -> Option<&AcceleratorSelector> {
        self.spec.accelerator_selector.as_ref()
    }

    pub fn constraints(&self) -> Option<&AcceleratorConstraints> {
        self.selector().and_then(|s| s.constraints.as_ref())
    }

    pub fn annotated_accelerator_class(&self) -> Option<&str> {
        self.annotations
            .get(ACCELERATOR_CLASS_ANNOTATION)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}
