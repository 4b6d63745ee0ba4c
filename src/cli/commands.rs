use clap::Subcommand;

use super::demo::DemoArgs;
use super::inspect::InspectArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Replay an action list against a live Chromium page
    Run(RunArgs),

    /// Normalize an action list and report malformed entries, without a browser
    Inspect(InspectArgs),

    /// Run the built-in action list against the built-in sample form
    Demo(DemoArgs),
}
