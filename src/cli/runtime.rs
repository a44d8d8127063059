use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use extensions_bridge::{
    BackgroundService, BridgeError, BridgeEvent, BridgeEventBus, BridgeRequest, BridgeResponse,
    CredentialStore, FileStore, InProcessChannel, LocalStore, MemoryStore, MessageChannel,
    SpellService, ToggleStore,
};
use tokio::fs;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::errors::CliError;

const EVENT_BUFFER: usize = 64;

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            let mut path = dirs::config_dir().context("Failed to get config directory")?;
            path.push("soulspell");
            path.push("config.yaml");
            path
        }
    };

    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;
        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded configuration from: {}", config_path.display());
        config
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Config::default()
    };
    config.apply_process_env();

    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

/// Background context plus the page-side channel into it.
pub struct BridgeRuntime {
    background: Arc<BackgroundService>,
    channel: Arc<InProcessChannel>,
    events: BridgeEventBus,
}

impl BridgeRuntime {
    pub fn with_store(store: Arc<dyn LocalStore>, service: Arc<dyn SpellService>) -> Self {
        let (events, rx) = broadcast::channel(EVENT_BUFFER);
        spawn_event_logger(rx);
        let background = BackgroundService::new(store, service);
        let channel = InProcessChannel::new(background.clone(), events.clone());
        Self {
            background,
            channel,
            events,
        }
    }

    /// Runtime over the persisted state file; environment overrides are
    /// layered on an in-memory copy so they never reach disk.
    pub async fn start(config: &Config, service: Arc<dyn SpellService>) -> Result<Self, CliError> {
        let persisted: Arc<dyn LocalStore> = FileStore::new(config.state_path()?);
        let store = if config.has_ephemeral_overrides() {
            overlay_store(config, persisted).await?
        } else {
            persisted
        };
        Ok(Self::with_store(store, service))
    }

    /// Runtime that always writes through to the state file.
    pub fn persistent(config: &Config, service: Arc<dyn SpellService>) -> Result<Self, CliError> {
        let store: Arc<dyn LocalStore> = FileStore::new(config.state_path()?);
        Ok(Self::with_store(store, service))
    }

    pub fn background(&self) -> &Arc<BackgroundService> {
        &self.background
    }

    pub fn channel(&self) -> Arc<dyn MessageChannel> {
        self.channel.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    pub fn shutdown(&self) {
        self.channel.invalidate();
    }

    /// Sends a request; a closed channel is an error rather than `None`.
    pub async fn send(&self, request: BridgeRequest) -> Result<BridgeResponse, CliError> {
        self.channel
            .send(request)
            .await
            .ok_or(CliError::Bridge(BridgeError::ChannelClosed))
    }

    /// Like [`BridgeRuntime::send`] but an unsuccessful reply is an error.
    pub async fn expect_ack(&self, request: BridgeRequest) -> Result<BridgeResponse, CliError> {
        let action = request.action();
        let reply = self.send(request).await?;
        if reply.success {
            Ok(reply)
        } else {
            Err(CliError::Rejected {
                action,
                reason: reply.error.unwrap_or_else(|| "no reason given".to_string()),
            })
        }
    }
}

async fn overlay_store(
    config: &Config,
    persisted: Arc<dyn LocalStore>,
) -> Result<Arc<dyn LocalStore>, CliError> {
    let memory: Arc<dyn LocalStore> = MemoryStore::new();
    let api_key = match &config.api_key {
        Some(key) => Some(key.clone()),
        None => CredentialStore::new(persisted.clone()).get().await?,
    };
    if let Some(key) = api_key {
        CredentialStore::new(memory.clone()).set(&key).await?;
    }
    let enabled = ToggleStore::new(persisted).is_enabled().await? && !config.force_disabled;
    ToggleStore::new(memory.clone()).set_enabled(enabled).await?;
    debug!(enabled, "environment overrides layered over persisted state");
    Ok(memory)
}

fn spawn_event_logger(mut rx: broadcast::Receiver<BridgeEvent>) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(BridgeEvent::Dispatched { req_id, action }) => {
                    debug!(%req_id, action, "bridge request dispatched")
                }
                Ok(BridgeEvent::Replied {
                    req_id,
                    action,
                    success,
                }) => debug!(%req_id, action, success, "bridge reply received"),
                Ok(BridgeEvent::Invalidated) => {
                    debug!("bridge channel invalidated");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "bridge event logger lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
