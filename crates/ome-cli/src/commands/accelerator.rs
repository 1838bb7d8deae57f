use std::fmt::Write as _;
use std::path::Path;

use ome_core::{AcceleratorSelectionPolicy, ComponentType, InferenceService};

use super::{Context, read_toml};

pub fn select(
    ctx: &Context,
    workload: &Path,
    runtime: &str,
    namespace: &str,
    component: ComponentType,
) -> anyhow::Result<()> {
    let workload: InferenceService = read_toml(workload)?;
    let runtime = ctx.runtime_selector().get_runtime(runtime, namespace)?;
    let selection = ctx
        .accelerator_selector()
        .select_accelerator_class(&workload, &runtime.spec, component)?;

    ctx.emit(&selection, || match &selection {
        Some(s) => format!(
            "✓ {component}: accelerator class {} ({} {} {}, via {:?})",
            s.name, s.spec.vendor, s.spec.family, s.spec.model, s.source
        ),
        None => format!("{component}: no accelerator class selected for runtime {}", runtime.name),
    })
}

pub fn rank(
    ctx: &Context,
    runtime: &str,
    namespace: &str,
    policy: AcceleratorSelectionPolicy,
    workload: Option<&Path>,
) -> anyhow::Result<()> {
    let workload: Option<InferenceService> = workload.map(read_toml).transpose()?;
    let runtime = ctx.runtime_selector().get_runtime(runtime, namespace)?;
    let constraints = workload.as_ref().and_then(|w| w.constraints());
    let ranking = ctx.accelerator_selector().rank_candidates(
        policy,
        runtime.spec.accelerator_classes(),
        constraints,
    )?;

    ctx.emit(&ranking, || {
        let mut out = format!("{policy} ranking for runtime {}:", runtime.name);
        for (i, c) in ranking.ranked.iter().enumerate() {
            let _ = write!(out, "\n  {}. {:<24} {:>10.4}  {}", i + 1, c.name, c.score, c.reason);
        }
        for (name, reason) in &ranking.excluded {
            let _ = write!(out, "\n  ✗ {name:<24} {reason}");
        }
        out
    })
}
