//! Link between page sessions and the background context.
//!
//! Pages send [`BridgeRequest`]s over a [`MessageChannel`]; the
//! [`BackgroundService`] answers them using the persisted credential and
//! toggle and the remote [`SpellService`]. A channel that returns no reply
//! has lost its context for good.

pub mod background;
pub mod channel;
pub mod config;
pub mod message;
pub mod remote;
pub mod storage;

use serde::Serialize;
use soulspell_core_types::SoulError;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

pub use background::BackgroundService;
pub use channel::{InProcessChannel, MessageChannel};
pub use config::BridgeConfig;
pub use message::{BridgeRequest, BridgeResponse};
pub use remote::{CannedSpellService, HttpSpellService, SpellService};
pub use storage::{CredentialStore, FileStore, LocalStore, MemoryStore, ToggleStore};

/// Errors surfaced by the bridge.
#[derive(Clone, Debug, Error)]
pub enum BridgeError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service returned {status} {reason}")]
    Api { status: u16, reason: String },
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("channel closed")]
    ChannelClosed,
}

impl From<BridgeError> for SoulError {
    fn from(err: BridgeError) -> Self {
        SoulError::new(err.to_string())
    }
}

pub type BridgeEventBus = broadcast::Sender<BridgeEvent>;

/// Events emitted by the bridge to observers.
#[derive(Clone, Debug, Serialize)]
pub enum BridgeEvent {
    Dispatched {
        req_id: Uuid,
        action: &'static str,
    },
    Replied {
        req_id: Uuid,
        action: &'static str,
        success: bool,
    },
    Invalidated,
}
