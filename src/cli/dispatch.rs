use anyhow::Result;

use super::check::cmd_check;
use super::demo::cmd_demo;
use super::env::CliArgs;
use super::info::cmd_info;
use super::key::cmd_key;
use super::toggle::cmd_toggle;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Check(args) => cmd_check(args, ctx).await,
        Commands::Demo(args) => cmd_demo(args, ctx).await,
        Commands::Key(args) => cmd_key(args, ctx).await,
        Commands::Toggle(args) => cmd_toggle(args, ctx).await,
        Commands::Info => cmd_info(ctx).await,
    }
}
