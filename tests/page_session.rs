use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use extensions_bridge::{BridgeRequest, CannedSpellService, MemoryStore};
use dom_overlay::render::HIGHLIGHT_CLASS;
use overlay_controller::tooltip::APPLY_BUTTON_CLASS;
use overlay_controller::{
    CheckOutcome, ClickOutcome, InteractionPolicy, SkipReason, SpellControllerBuilder,
};
use pretty_assertions::assert_eq;
use soulspell_cli::cli::check::check_text;
use soulspell_cli::cli::context::CliContext;
use soulspell_cli::cli::demo::run_demo;
use soulspell_cli::cli::output::OutputFormat;
use soulspell_cli::cli::BridgeRuntime;
use soulspell_cli::sample::{sample_page, SAMPLE_PAYLOAD, SAMPLE_TEXT};
use soulspell_cli::{Config, PageSession};
use soulspell_core_types::ManualClock;
use tempfile::TempDir;

fn context(dir: &TempDir, tweak: impl FnOnce(&mut Config)) -> CliContext {
    let mut config = Config {
        state_file: Some(dir.path().join("state.json")),
        ..Config::default()
    };
    tweak(&mut config);
    CliContext::new(config, PathBuf::from("config.yaml"), OutputFormat::Human)
}

#[tokio::test]
async fn demo_renders_both_targets_and_applies() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, |_| {});
    let report = run_demo(&ctx, SAMPLE_PAYLOAD.to_string(), true)
        .await
        .expect("demo runs");

    assert_eq!(
        report.targets[0].outcome,
        Some(CheckOutcome::Displayed {
            rendered: 2,
            from_cache: false
        })
    );
    // Same text in the rich editor is served from the cache.
    assert_eq!(
        report.targets[1].outcome,
        Some(CheckOutcome::Displayed {
            rendered: 2,
            from_cache: true
        })
    );
    assert_eq!(report.targets[2].name, "password");
    assert!(!report.targets[2].eligible);

    assert!(report.html.contains("spell-input-overlay"));
    assert_eq!(report.html.matches("data-error-id=\"2-5-has\"").count(), 2);
    assert_eq!(
        report.targets[0].text_after.as_deref(),
        Some("I have a pen and a apple.")
    );
    assert_eq!(
        report.targets[1].text_after.as_deref(),
        Some("I have a pen and a apple.")
    );
    assert!(!dir.path().join("state.json").exists());
}

#[tokio::test]
async fn typing_pause_then_sentence_end() {
    let runtime = BridgeRuntime::with_store(
        MemoryStore::new(),
        Arc::new(CannedSpellService::new(SAMPLE_PAYLOAD)),
    );
    runtime
        .expect_ack(BridgeRequest::SetApiKey {
            api_key: "k".to_string(),
        })
        .await
        .unwrap();

    let clock = ManualClock::new();
    let controller = SpellControllerBuilder::new(InteractionPolicy::default())
        .with_channel(runtime.channel())
        .with_clock(clock.clone())
        .build()
        .unwrap();
    let page = sample_page();
    let textarea = page.textarea;
    let mut session = PageSession::new(page.doc, controller);

    session.edit(textarea, "I has a pen and a apple").unwrap();
    assert!(session.tick().await.is_none());
    clock.advance(Duration::from_millis(1_500));
    assert_eq!(
        session.tick().await,
        Some(CheckOutcome::Displayed {
            rendered: 2,
            from_cache: false
        })
    );

    // Editing clears highlights; the closing period checks at once.
    session.edit(textarea, SAMPLE_TEXT).unwrap();
    assert!(session.controller().displayed_errors(textarea).is_none());
    assert!(matches!(
        session.key(textarea, '.').await,
        Some(CheckOutcome::Displayed { .. })
    ));
    clock.advance(Duration::from_secs(5));
    assert!(session.tick().await.is_none());
}

#[tokio::test]
async fn tooltip_apply_rewrites_only_its_own_target() {
    let runtime = BridgeRuntime::with_store(
        MemoryStore::new(),
        Arc::new(CannedSpellService::new(SAMPLE_PAYLOAD)),
    );
    runtime
        .expect_ack(BridgeRequest::SetApiKey {
            api_key: "k".to_string(),
        })
        .await
        .unwrap();
    let controller = SpellControllerBuilder::new(InteractionPolicy::default())
        .with_channel(runtime.channel())
        .build()
        .unwrap();
    let page = sample_page();
    let (textarea, editor) = (page.textarea, page.editor);
    let mut session = PageSession::new(page.doc, controller);
    session.check_now(textarea).await.unwrap();
    session.check_now(editor).await.unwrap();

    let doc = session.document();
    let highlight = doc.query_all(editor, |d, id| d.has_class(id, HIGHLIGHT_CLASS))[0];
    assert_eq!(session.click(highlight), ClickOutcome::TooltipPinned);
    let tooltip = session.controller().tooltip_node().unwrap();
    let apply = session
        .document()
        .query_all(tooltip, |d, id| d.has_class(id, APPLY_BUTTON_CLASS))[0];
    assert_eq!(session.click(apply), ClickOutcome::Applied);

    assert_eq!(
        session.text_of(editor).as_deref(),
        Some("I have a pen and a apple.")
    );
    assert_eq!(session.text_of(textarea).as_deref(), Some(SAMPLE_TEXT));
    // The edited editor lost its highlights; the textarea keeps its own.
    assert!(session.controller().displayed_errors(editor).is_none());
    assert_eq!(
        session.controller().displayed_errors(textarea).map(|e| e.len()),
        Some(2)
    );
}

#[tokio::test]
async fn denied_host_is_skipped() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, |config| config.api_key = Some("k".to_string()));
    let runtime = BridgeRuntime::start(
        ctx.config(),
        Arc::new(CannedSpellService::new(SAMPLE_PAYLOAD)),
    )
    .await
    .unwrap();

    let report = check_text(&ctx, &runtime, "accounts.google.com", SAMPLE_TEXT)
        .await
        .unwrap();
    assert_eq!(report.outcome, CheckOutcome::Skipped(SkipReason::NotEligible));

    let report = check_text(&ctx, &runtime, "blog.example.com", SAMPLE_TEXT)
        .await
        .unwrap();
    assert_eq!(report.errors.len(), 2);
}

#[tokio::test]
async fn env_overrides_stay_off_disk() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, |config| {
        config.api_key = Some("from-env".to_string());
        config.force_disabled = true;
    });
    let service = Arc::new(CannedSpellService::new(SAMPLE_PAYLOAD));

    let runtime = BridgeRuntime::start(ctx.config(), service.clone()).await.unwrap();
    let reply = runtime.send(BridgeRequest::CheckSetup).await.unwrap();
    assert_eq!(reply.is_setup, Some(true));
    let report = check_text(&ctx, &runtime, "blog.example.com", SAMPLE_TEXT)
        .await
        .unwrap();
    assert_eq!(report.outcome, CheckOutcome::Disabled);
    assert!(!dir.path().join("state.json").exists());

    let persisted = BridgeRuntime::persistent(ctx.config(), service).unwrap();
    let reply = persisted.send(BridgeRequest::CheckSetup).await.unwrap();
    assert_eq!(reply.is_setup, Some(false));
}

#[tokio::test]
async fn stored_key_survives_restart_and_closed_channel_errors() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, |_| {});
    let service = Arc::new(CannedSpellService::new(SAMPLE_PAYLOAD));

    let first = BridgeRuntime::persistent(ctx.config(), service.clone()).unwrap();
    first
        .expect_ack(BridgeRequest::SetApiKey {
            api_key: "stored".to_string(),
        })
        .await
        .unwrap();
    first.shutdown();
    let err = first.send(BridgeRequest::CheckSetup).await.unwrap_err();
    assert_eq!(err.to_string(), "channel closed");

    let second = BridgeRuntime::start(ctx.config(), service).await.unwrap();
    let report = check_text(&ctx, &second, "blog.example.com", SAMPLE_TEXT)
        .await
        .unwrap();
    assert_eq!(
        report.outcome,
        CheckOutcome::Displayed {
            rendered: 2,
            from_cache: false
        }
    );
}
