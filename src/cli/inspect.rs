use std::path::PathBuf;

use action_flow::normalize_action;
use action_primitives::Action;
use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use super::output::{render_value, OutputFormat};
use super::run::read_action_file;

#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    /// JSON action list (bare array or an object with `actions`)
    #[arg(short, long, value_name = "FILE")]
    pub actions: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct InspectedEntry {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn cmd_inspect(args: InspectArgs, output: OutputFormat) -> Result<()> {
    let entries = read_action_file(&args.actions).await?;
    let inspected: Vec<InspectedEntry> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match normalize_action(entry) {
            Ok(action) => InspectedEntry {
                index,
                action: Some(action),
                error: None,
            },
            Err(err) => InspectedEntry {
                index,
                action: None,
                error: Some(err.to_string()),
            },
        })
        .collect();

    match output {
        OutputFormat::Human => {
            for entry in &inspected {
                match (&entry.action, &entry.error) {
                    (Some(action), _) => println!(
                        "#{:<3} {:<15} {}{}",
                        entry.index,
                        action.kind,
                        action.selector,
                        action
                            .value
                            .as_ref()
                            .map(|v| format!(" = {:?}", v))
                            .unwrap_or_default()
                    ),
                    (None, Some(error)) => println!("#{:<3} error: {}", entry.index, error),
                    (None, None) => {}
                }
            }
        }
        other => println!("{}", render_value(&inspected, &other)?.trim_end()),
    }

    let malformed = inspected.iter().filter(|e| e.error.is_some()).count();
    if malformed > 0 {
        bail!("{} of {} entries are malformed", malformed, inspected.len());
    }
    Ok(())
}
