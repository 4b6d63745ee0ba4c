use action_flow::BatchSummary;
use action_primitives::ActionOutcome;
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Renders a batch for stdout. Machine formats carry the wire report.
pub fn render_summary(summary: &BatchSummary, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(render_human(summary)),
        other => render_value(&summary.to_report(), other),
    }
}

pub fn render_value<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        _ => serde_json::to_string_pretty(value)?,
    })
}

fn render_human(summary: &BatchSummary) -> String {
    let mut out = String::new();
    for result in &summary.results {
        let (tag, detail) = match &result.outcome {
            ActionOutcome::Success => ("ok  ", String::new()),
            ActionOutcome::Skipped(reason) => ("skip", format!(" ({})", reason)),
            ActionOutcome::Failed(error) => ("FAIL", format!(" ({})", error)),
        };
        out.push_str(&format!(
            "[{}] #{:<3} {}{}\n",
            tag,
            result.index,
            describe(&result.action),
            detail
        ));
    }
    out.push_str(&format!(
        "run {}: {} succeeded, {} failed, {} skipped in {} ms -> {}\n",
        summary.run_id,
        summary.success_count,
        summary.fail_count,
        summary.skip_count,
        summary.duration_ms(),
        if summary.success() { "success" } else { "failure" }
    ));
    out
}

fn describe(action: &serde_json::Value) -> String {
    match action_flow::normalize_action(action) {
        Ok(action) => match action.value {
            Some(value) => format!("{} {} = {:?}", action.kind, action.selector, value),
            None => format!("{} {}", action.kind, action.selector),
        },
        Err(_) => action.to_string(),
    }
}
