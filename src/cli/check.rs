use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use dom_overlay::Document;
use extensions_bridge::{CannedSpellService, HttpSpellService, SpellService};
use overlay_controller::CheckOutcome;
use serde::Serialize;
use spell_model::SpellError;
use tokio::fs;

use super::context::CliContext;
use super::output;
use super::runtime::BridgeRuntime;
use crate::errors::CliError;
use crate::session::PageSession;

#[derive(Args, Clone)]
pub struct CheckArgs {
    /// Text to check
    #[arg(required_unless_present = "file")]
    pub text: Option<String>,

    /// Read the text from a file instead
    #[arg(long, value_name = "FILE", conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Parse a saved speller response instead of calling the service
    #[arg(long, value_name = "FILE")]
    pub payload: Option<PathBuf>,

    /// Host of the page the text lives on; the denylist applies
    #[arg(long, default_value = "localhost")]
    pub host: String,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub text: String,
    pub outcome: CheckOutcome,
    pub errors: Vec<SpellError>,
}

pub(crate) async fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).await.map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub async fn cmd_check(args: CheckArgs, ctx: &CliContext) -> Result<()> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_file(path).await?,
        (None, None) => bail!(CliError::EmptyText),
    };

    let service: Arc<dyn SpellService> = match &args.payload {
        Some(path) => Arc::new(CannedSpellService::new(read_file(path).await?)),
        None => Arc::new(HttpSpellService::new(&ctx.config().bridge).map_err(CliError::from)?),
    };
    let runtime = BridgeRuntime::start(ctx.config(), service).await?;

    let report = check_text(ctx, &runtime, &args.host, &text).await?;
    output::emit(ctx.output(), &report, print_report)?;

    if let CheckOutcome::Failed(reason) = &report.outcome {
        return Err(CliError::Rejected {
            action: "checkSpelling",
            reason: reason.clone(),
        }
        .into());
    }
    Ok(())
}

/// Runs one check of `text` in a throwaway single-textarea page.
pub async fn check_text(
    ctx: &CliContext,
    runtime: &BridgeRuntime,
    host: &str,
    text: &str,
) -> Result<CheckReport, CliError> {
    let mut doc = Document::new(host);
    let body = doc.body();
    let area = doc.create_element("textarea");
    doc.set_value(area, text);
    doc.append_child(body, area);

    let mut session = PageSession::new(doc, ctx.controller(runtime.channel())?);
    let outcome = session.check_now(area).await?;
    let errors = session
        .controller()
        .displayed_errors(area)
        .map(<[SpellError]>::to_vec)
        .unwrap_or_default();
    Ok(CheckReport {
        text: text.to_string(),
        outcome,
        errors,
    })
}

fn print_report(report: &CheckReport) {
    match &report.outcome {
        CheckOutcome::Displayed { .. } => {
            println!("{} issue(s) found", report.errors.len());
            for error in &report.errors {
                println!(
                    "  [{}..{}] {} ({})",
                    error.start,
                    error.end,
                    error.hover_hint(),
                    error.category.label()
                );
                for line in error.display_description().lines() {
                    println!("      {line}");
                }
            }
        }
        CheckOutcome::Clean { .. } => println!("No issues found"),
        CheckOutcome::NeedsSetup => {
            println!("No API key configured. Run `soulspell key set <KEY>` first.")
        }
        CheckOutcome::Disabled => {
            println!("Spell checking is turned off. Run `soulspell toggle on`.")
        }
        CheckOutcome::Rejected(message) => println!("Speller declined the text: {message}"),
        CheckOutcome::Failed(message) => println!("Check failed: {message}"),
        CheckOutcome::Skipped(reason) => println!("Check skipped: {reason:?}"),
        CheckOutcome::Invalidated => println!("Background context went away"),
    }
}
