//! Background-context request handler.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::message::{BridgeRequest, BridgeResponse};
use crate::remote::SpellService;
use crate::storage::{CredentialStore, LocalStore, ToggleStore};

pub const DISABLED_MESSAGE: &str = "spell checking is disabled";
pub const NEEDS_SETUP_MESSAGE: &str = "API key is not configured";

/// Owns the persisted settings and the remote client; every page talks to
/// it through a message channel.
pub struct BackgroundService {
    credentials: CredentialStore,
    toggle: ToggleStore,
    service: Arc<dyn SpellService>,
}

impl BackgroundService {
    pub fn new(store: Arc<dyn LocalStore>, service: Arc<dyn SpellService>) -> Arc<Self> {
        Arc::new(Self {
            credentials: CredentialStore::new(store.clone()),
            toggle: ToggleStore::new(store),
            service,
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn toggle(&self) -> &ToggleStore {
        &self.toggle
    }

    pub async fn handle(&self, request: BridgeRequest) -> BridgeResponse {
        match request {
            BridgeRequest::CheckSpelling { text } => self.check_spelling(&text).await,
            BridgeRequest::SetApiKey { api_key } => match self.credentials.set(&api_key).await {
                Ok(()) => BridgeResponse::ack(),
                Err(err) => BridgeResponse::failure(err.to_string()),
            },
            BridgeRequest::ClearApiKey => match self.credentials.clear().await {
                Ok(()) => BridgeResponse::ack(),
                Err(err) => BridgeResponse::failure(err.to_string()),
            },
            BridgeRequest::CheckSetup => {
                BridgeResponse::setup_status(self.credentials.is_setup().await.unwrap_or(false))
            }
            BridgeRequest::ToggleExtension { enabled } => {
                match self.toggle.set_enabled(enabled).await {
                    Ok(()) => {
                        info!(enabled, "spell checking toggled");
                        BridgeResponse::ack()
                    }
                    Err(err) => BridgeResponse::failure(err.to_string()),
                }
            }
        }
    }

    #[instrument(skip_all, fields(chars = text.chars().count()))]
    async fn check_spelling(&self, text: &str) -> BridgeResponse {
        match self.toggle.is_enabled().await {
            Ok(true) => {}
            Ok(false) => return BridgeResponse::disabled(DISABLED_MESSAGE),
            Err(err) => return BridgeResponse::failure(err.to_string()),
        }
        let api_key = match self.credentials.get().await {
            Ok(Some(key)) => key,
            Ok(None) => return BridgeResponse::needs_setup(NEEDS_SETUP_MESSAGE),
            Err(err) => return BridgeResponse::failure(err.to_string()),
        };
        match self.service.check(text, &api_key).await {
            Ok(result) => {
                info!(errors = result.error_count(), "spell check completed");
                BridgeResponse::checked(result)
            }
            Err(err) => {
                warn!(%err, "spell check failed");
                BridgeResponse::failure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::BridgeError;
    use async_trait::async_trait;
    use spell_model::CheckResult;

    struct FailingService;

    #[async_trait]
    impl SpellService for FailingService {
        async fn check(&self, _text: &str, _api_key: &str) -> Result<CheckResult, BridgeError> {
            Err(BridgeError::Api {
                status: 403,
                reason: "Forbidden".into(),
            })
        }
    }

    #[tokio::test]
    async fn check_reports_setup_then_remote_failure() {
        let background = BackgroundService::new(MemoryStore::new(), Arc::new(FailingService));

        let reply = background.handle(BridgeRequest::check("text")).await;
        assert!(!reply.success);
        assert!(reply.needs_setup);

        background
            .handle(BridgeRequest::SetApiKey {
                api_key: "key".into(),
            })
            .await;
        let reply = background.handle(BridgeRequest::check("text")).await;
        assert!(!reply.success);
        assert!(!reply.needs_setup);
        assert_eq!(reply.error.as_deref(), Some("service returned 403 Forbidden"));
    }

    #[tokio::test]
    async fn disabled_toggle_short_circuits() {
        let background = BackgroundService::new(MemoryStore::new(), Arc::new(FailingService));
        background
            .handle(BridgeRequest::ToggleExtension { enabled: false })
            .await;
        let reply = background.handle(BridgeRequest::check("text")).await;
        assert!(reply.disabled);
        assert!(!reply.needs_setup);
    }
}
