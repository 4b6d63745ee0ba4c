use anyhow::Result;

use super::demo::cmd_demo;
use super::env::CliArgs;
use super::inspect::cmd_inspect;
use super::run::cmd_run;
use crate::cli::commands::Commands;
use crate::config::Config;

pub async fn dispatch(cli: &CliArgs, config: &Config) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, config, cli.output.clone()).await,
        Commands::Inspect(args) => cmd_inspect(args, cli.output.clone()).await,
        Commands::Demo(args) => cmd_demo(args, config, cli.output.clone()).await,
    }
}
