use std::sync::Arc;

use anyhow::Result;
use extensions_bridge::HttpSpellService;
use serde::Serialize;

use super::context::CliContext;
use super::output;
use super::runtime::BridgeRuntime;
use crate::errors::CliError;

#[derive(Debug, Serialize)]
struct InfoReport {
    version: &'static str,
    build_date: &'static str,
    git_hash: &'static str,
    config_path: String,
    endpoint: String,
    timeout_ms: u64,
    state_file: String,
    cache_capacity: usize,
    cache_ttl_secs: u64,
    debounce_ms: u64,
    hide_delay_ms: u64,
    denied_hosts: Vec<String>,
    api_key_configured: bool,
    enabled: bool,
    env_overrides: bool,
}

pub async fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    let service = Arc::new(HttpSpellService::new(&config.bridge).map_err(CliError::from)?);
    let runtime = BridgeRuntime::start(config, service).await?;
    let background = runtime.background();

    let report = InfoReport {
        version: env!("CARGO_PKG_VERSION"),
        build_date: env!("BUILD_DATE"),
        git_hash: env!("GIT_HASH"),
        config_path: ctx.config_path().display().to_string(),
        endpoint: config.bridge.endpoint.clone(),
        timeout_ms: config.bridge.timeout_ms,
        state_file: config.state_path()?.display().to_string(),
        cache_capacity: config.cache.capacity,
        cache_ttl_secs: config.cache.ttl_secs,
        debounce_ms: config.interaction.debounce_ms,
        hide_delay_ms: config.interaction.hide_delay_ms,
        denied_hosts: config.exclusions.denied_hosts.clone(),
        api_key_configured: background
            .credentials()
            .is_setup()
            .await
            .map_err(CliError::from)?,
        enabled: background
            .toggle()
            .is_enabled()
            .await
            .map_err(CliError::from)?,
        env_overrides: config.has_ephemeral_overrides(),
    };

    output::emit(ctx.output(), &report, |r| {
        println!("SoulSpell System Information");
        println!("============================");
        println!("Version:        {} ({}, built {})", r.version, r.git_hash, r.build_date);
        println!("Config file:    {}", r.config_path);
        println!("State file:     {}", r.state_file);
        println!();
        println!("Endpoint:       {}", r.endpoint);
        println!("Timeout:        {} ms", r.timeout_ms);
        println!("Cache:          {} entries, {} s TTL", r.cache_capacity, r.cache_ttl_secs);
        println!("Debounce:       {} ms", r.debounce_ms);
        println!("Tooltip hide:   {} ms", r.hide_delay_ms);
        println!("Denied hosts:   {}", r.denied_hosts.join(", "));
        println!();
        println!(
            "API key:        {}",
            if r.api_key_configured { "configured" } else { "missing" }
        );
        println!(
            "Checking:       {}",
            if r.enabled { "enabled" } else { "disabled" }
        );
        if r.env_overrides {
            println!("                (environment overrides active)");
        }
    })
}
