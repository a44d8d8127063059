//! Page-side view of the background context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::background::BackgroundService;
use crate::message::{BridgeRequest, BridgeResponse};
use crate::{BridgeEvent, BridgeEventBus};

#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// `None` means the receiving context is gone; callers must treat that
    /// as terminal.
    async fn send(&self, request: BridgeRequest) -> Option<BridgeResponse>;
}

/// Channel straight into a [`BackgroundService`] living in the same process.
pub struct InProcessChannel {
    background: Arc<BackgroundService>,
    events: BridgeEventBus,
    alive: AtomicBool,
}

impl InProcessChannel {
    pub fn new(background: Arc<BackgroundService>, events: BridgeEventBus) -> Arc<Self> {
        Arc::new(Self {
            background,
            events,
            alive: AtomicBool::new(true),
        })
    }

    /// Simulates the extension being reloaded under the page.
    pub fn invalidate(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            warn!("extension context invalidated");
            let _ = self.events.send(BridgeEvent::Invalidated);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageChannel for InProcessChannel {
    async fn send(&self, request: BridgeRequest) -> Option<BridgeResponse> {
        if !self.is_alive() {
            return None;
        }
        let req_id = Uuid::new_v4();
        let action = request.action();
        let _ = self.events.send(BridgeEvent::Dispatched { req_id, action });

        let response = self.background.handle(request).await;
        // The context may have been torn down while the request was in flight.
        if !self.is_alive() {
            debug!(%req_id, action, "reply dropped after invalidation");
            return None;
        }
        let _ = self.events.send(BridgeEvent::Replied {
            req_id,
            action,
            success: response.success,
        });
        Some(response)
    }
}
