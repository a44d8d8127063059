use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use extensions_bridge::{BridgeRequest, CannedSpellService, MemoryStore};
use overlay_controller::CheckOutcome;
use serde::Serialize;
use tracing::info;

use super::check::read_file;
use super::context::CliContext;
use super::output;
use super::runtime::BridgeRuntime;
use crate::errors::CliError;
use crate::sample::{sample_page, SAMPLE_PAYLOAD};
use crate::session::PageSession;

const DEMO_KEY: &str = "demo-key";

#[derive(Args, Clone)]
pub struct DemoArgs {
    /// Apply the first suggestion of the first issue in each target
    #[arg(long)]
    pub apply: bool,

    /// Use a saved speller response instead of the built-in one
    #[arg(long, value_name = "FILE")]
    pub payload: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct DemoTarget {
    pub name: &'static str,
    pub eligible: bool,
    pub outcome: Option<CheckOutcome>,
    pub text_after: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub targets: Vec<DemoTarget>,
    pub html: String,
}

pub async fn cmd_demo(args: DemoArgs, ctx: &CliContext) -> Result<()> {
    let payload = match &args.payload {
        Some(path) => read_file(path).await?,
        None => SAMPLE_PAYLOAD.to_string(),
    };
    let report = run_demo(ctx, payload, args.apply).await?;
    output::emit(ctx.output(), &report, |report| {
        for target in &report.targets {
            match (&target.outcome, target.eligible) {
                (Some(outcome), _) => println!("{:<16} {:?}", target.name, outcome),
                (None, false) => println!("{:<16} excluded", target.name),
                (None, true) => println!("{:<16} not checked", target.name),
            }
            if let Some(text) = &target.text_after {
                println!("{:<16} -> {}", "", text);
            }
        }
        println!();
        println!("{}", report.html);
    })
}

/// Checks every target of the sample page against `payload` using an
/// in-memory background, optionally applying one correction per target.
pub async fn run_demo(ctx: &CliContext, payload: String, apply: bool) -> Result<DemoReport, CliError> {
    let runtime = BridgeRuntime::with_store(
        MemoryStore::new(),
        Arc::new(CannedSpellService::new(payload)),
    );
    runtime
        .expect_ack(BridgeRequest::SetApiKey {
            api_key: DEMO_KEY.to_string(),
        })
        .await?;

    let page = sample_page();
    let mut session = PageSession::new(page.doc, ctx.controller(runtime.channel())?);
    let mut targets = Vec::new();

    for (name, node) in [("textarea", page.textarea), ("contenteditable", page.editor)] {
        let outcome = session.check_now(node).await?;
        info!(target_name = name, ?outcome, "demo target checked");
        targets.push(DemoTarget {
            name,
            eligible: true,
            outcome: Some(outcome),
            text_after: None,
        });
    }

    targets.push(DemoTarget {
        name: "password",
        eligible: session
            .controller()
            .target_shape(session.document(), page.password)
            .is_some(),
        outcome: None,
        text_after: None,
    });

    // Render before corrections so the overlay markup is visible.
    let html = session.html();

    if apply {
        for (index, node) in [page.textarea, page.editor].into_iter().enumerate() {
            let first = session
                .controller()
                .displayed_errors(node)
                .and_then(|errors| errors.first())
                .and_then(|error| {
                    error
                        .suggestions
                        .first()
                        .map(|suggestion| (error.stable_id(), suggestion.clone()))
                });
            if let Some((id, suggestion)) = first {
                session.apply(node, &id, &suggestion)?;
                targets[index].text_after = session.text_of(node);
            }
        }
    }

    runtime.shutdown();
    Ok(DemoReport { targets, html })
}
