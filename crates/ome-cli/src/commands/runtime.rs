use std::fmt::Write as _;
use std::path::Path;

use ome_core::{BaseModelSpec, InferenceService};

use super::{Context, read_toml};

fn load_inputs(
    model: &Path,
    workload: Option<&Path>,
) -> anyhow::Result<(BaseModelSpec, Option<InferenceService>)> {
    let model = read_toml(model)?;
    let workload = workload.map(read_toml).transpose()?;
    Ok((model, workload))
}

pub fn select(
    ctx: &Context,
    model: &Path,
    workload: Option<&Path>,
    namespace: &str,
) -> anyhow::Result<()> {
    let (model, workload) = load_inputs(model, workload)?;
    let selection = ctx
        .runtime_selector()
        .select_runtime(&model, workload.as_ref(), namespace)?;

    ctx.emit(&selection, || {
        format!(
            "✓ Selected runtime {} ({} scope, score {})",
            selection.name, selection.scope, selection.score
        )
    })
}

pub fn list(
    ctx: &Context,
    model: &Path,
    workload: Option<&Path>,
    namespace: &str,
) -> anyhow::Result<()> {
    let (model, workload) = load_inputs(model, workload)?;
    let matches = ctx
        .runtime_selector()
        .get_compatible_runtimes(&model, workload.as_ref(), namespace)?;

    ctx.emit(&matches, || {
        if matches.is_empty() {
            return format!("No compatible runtimes for {}", model.format_label());
        }
        let mut out = format!("Compatible runtimes for {}:", model.format_label());
        for (rank, m) in matches.iter().enumerate() {
            let _ = write!(
                out,
                "\n  {}. {:<32} {:<9} score={:<5} priority={}",
                rank + 1,
                m.selection.name,
                m.selection.scope,
                m.selection.score,
                m.match_details.priority
            );
        }
        out
    })
}

pub fn validate(
    ctx: &Context,
    name: &str,
    model: &Path,
    workload: Option<&Path>,
    namespace: &str,
) -> anyhow::Result<()> {
    let (model, workload) = load_inputs(model, workload)?;
    let validation = ctx
        .runtime_selector()
        .validate_runtime(name, &model, workload.as_ref(), namespace)?;

    ctx.emit(&validation, || {
        let mut out = format!(
            "✓ Runtime {} ({} scope) supports {}",
            validation.name,
            validation.scope,
            model.format_label()
        );
        if !validation.auto_select {
            out.push_str("\n  auto-select: no (must be named explicitly)");
        }
        for warning in &validation.warnings {
            let _ = write!(out, "\n  warning: {warning}");
        }
        out
    })
}
