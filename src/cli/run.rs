use std::path::{Path, PathBuf};
use std::sync::Arc;

use action_flow::{parse_action_list, BatchRunner};
use anyhow::{bail, Context, Result};
use clap::Args;
use dom_adapter::launch_page;
use serde_json::Value;
use tokio::fs;
use tracing::info;

use super::output::{render_summary, OutputFormat};
use crate::config::Config;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Page holding the form
    #[arg(long)]
    pub url: String,

    /// JSON action list (bare array or an object with `actions`)
    #[arg(short, long, value_name = "FILE")]
    pub actions: PathBuf,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Override Chrome/Chromium executable path (defaults to FORMPILOT_CHROME or system path)
    #[arg(long)]
    pub chrome: Option<PathBuf>,
}

pub async fn read_action_file(path: &Path) -> Result<Vec<Value>> {
    let payload = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read action list {}", path.display()))?;
    parse_action_list(&payload).with_context(|| format!("in {}", path.display()))
}

pub async fn cmd_run(args: RunArgs, config: &Config, output: OutputFormat) -> Result<()> {
    let entries = read_action_file(&args.actions).await?;

    let mut browser = config.browser.clone();
    if args.headed {
        browser.headless = false;
    }
    if let Some(path) = args.chrome {
        browser.executable = Some(path);
    }

    info!(url = %args.url, actions = entries.len(), "Launching browser");
    let session = launch_page(&browser, &args.url)
        .await
        .context("Failed to open page")?;

    let runner = BatchRunner::for_dom(Arc::new(session.dom()), config.timing.clone());
    let summary = runner.run(&entries).await;
    session.close().await;

    println!("{}", render_summary(&summary, &output)?.trim_end());
    if !summary.success() {
        bail!(
            "{} of {} actions failed",
            summary.fail_count,
            summary.results.len()
        );
    }
    Ok(())
}
