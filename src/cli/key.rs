use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use extensions_bridge::{BridgeRequest, HttpSpellService};
use serde::Serialize;

use super::context::CliContext;
use super::output;
use super::runtime::BridgeRuntime;
use crate::errors::CliError;

#[derive(Args, Clone)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub action: KeyAction,
}

#[derive(Subcommand, Clone)]
pub enum KeyAction {
    /// Store an API key
    Set {
        /// The key issued for the speller service
        key: String,
    },
    /// Forget the stored API key
    Clear,
    /// Report whether a key is stored
    Status,
}

#[derive(Debug, Serialize)]
struct KeyStatus {
    configured: bool,
}

pub async fn cmd_key(args: KeyArgs, ctx: &CliContext) -> Result<()> {
    let service = Arc::new(HttpSpellService::new(&ctx.config().bridge).map_err(CliError::from)?);
    match args.action {
        KeyAction::Set { key } => {
            let runtime = BridgeRuntime::persistent(ctx.config(), service)?;
            runtime
                .expect_ack(BridgeRequest::SetApiKey { api_key: key })
                .await?;
            println!("API key stored");
        }
        KeyAction::Clear => {
            let runtime = BridgeRuntime::persistent(ctx.config(), service)?;
            runtime.expect_ack(BridgeRequest::ClearApiKey).await?;
            println!("API key cleared");
        }
        KeyAction::Status => {
            let runtime = BridgeRuntime::start(ctx.config(), service).await?;
            let reply = runtime.send(BridgeRequest::CheckSetup).await?;
            let status = KeyStatus {
                configured: reply.is_setup.unwrap_or(false),
            };
            output::emit(ctx.output(), &status, |status| {
                if status.configured {
                    println!("API key: configured");
                } else {
                    println!("API key: not configured");
                }
            })?;
        }
    }
    Ok(())
}
