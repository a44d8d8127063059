use std::sync::Arc;

use anyhow::Result;
use clap::{Args, ValueEnum};
use extensions_bridge::{BridgeRequest, HttpSpellService};

use super::context::CliContext;
use super::runtime::BridgeRuntime;
use crate::errors::CliError;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ToggleState {
    On,
    Off,
}

#[derive(Args, Clone)]
pub struct ToggleArgs {
    #[arg(value_enum)]
    pub state: ToggleState,
}

pub async fn cmd_toggle(args: ToggleArgs, ctx: &CliContext) -> Result<()> {
    let service = Arc::new(HttpSpellService::new(&ctx.config().bridge).map_err(CliError::from)?);
    let runtime = BridgeRuntime::persistent(ctx.config(), service)?;
    let enabled = matches!(args.state, ToggleState::On);
    runtime
        .expect_ack(BridgeRequest::ToggleExtension { enabled })
        .await?;
    if enabled {
        println!("Spell checking enabled");
    } else {
        println!("Spell checking disabled");
    }
    if ctx.config().force_disabled {
        println!("Note: SOULSPELL_DISABLED is set and keeps checking off for this shell");
    }
    Ok(())
}
