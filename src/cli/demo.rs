use std::sync::Arc;

use action_flow::BatchRunner;
use action_primitives::ExecutorTiming;
use anyhow::{bail, Result};
use clap::Args;

use super::output::{render_summary, OutputFormat};
use crate::config::Config;
use crate::demo::{demo_actions, demo_form};

#[derive(Args, Clone, Debug)]
pub struct DemoArgs {
    /// Use the configured delays instead of running without pauses
    #[arg(long)]
    pub paced: bool,
}

pub async fn cmd_demo(args: DemoArgs, config: &Config, output: OutputFormat) -> Result<()> {
    let timing = if args.paced {
        config.timing.clone()
    } else {
        ExecutorTiming::immediate()
    };
    let runner = BatchRunner::for_dom(Arc::new(demo_form()), timing);
    let summary = runner.run(&demo_actions()).await;

    println!("{}", render_summary(&summary, &output)?.trim_end());
    if !summary.success() {
        bail!("demo batch reported {} failures", summary.fail_count);
    }
    Ok(())
}
