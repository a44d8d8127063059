//! Client for the remote spell-check service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use spell_model::{CheckResult, ResponseParser};
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::BridgeError;

#[async_trait]
pub trait SpellService: Send + Sync {
    async fn check(&self, text: &str, api_key: &str) -> Result<CheckResult, BridgeError>;
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    sentence: &'a str,
}

pub struct HttpSpellService {
    client: Client,
    endpoint: String,
    parser: ResponseParser,
}

impl HttpSpellService {
    pub fn new(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| BridgeError::Transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            parser: ResponseParser::new(config.no_error_phrase.clone()),
        })
    }
}

#[async_trait]
impl SpellService for HttpSpellService {
    async fn check(&self, text: &str, api_key: &str) -> Result<CheckResult, BridgeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .json(&CheckRequest { sentence: text })
            .send()
            .await
            .map_err(|err| BridgeError::Transport(format!("spell check request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "spell check service rejected request");
            return Err(BridgeError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let payload = response
            .text()
            .await
            .map_err(|err| BridgeError::Transport(format!("failed to read response: {err}")))?;
        debug!(bytes = payload.len(), "spell check payload received");
        Ok(self.parser.parse(&payload, text))
    }
}

/// Answers every check from one fixed payload. Used for offline runs.
pub struct CannedSpellService {
    payload: String,
    parser: ResponseParser,
}

impl CannedSpellService {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            parser: ResponseParser::default(),
        }
    }
}

#[async_trait]
impl SpellService for CannedSpellService {
    async fn check(&self, text: &str, _api_key: &str) -> Result<CheckResult, BridgeError> {
        Ok(self.parser.parse(&self.payload, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn canned_service_parses_against_submitted_text() {
        let service = CannedSpellService::new(
            "<PnuErrorWord nErrorIdx='0' m_nStart='2' m_nEnd='5'><OrgStr>has</OrgStr>\
             <CandWordList><CandWord>have</CandWord></CandWordList></PnuErrorWord>",
        );
        let result = service.check("I has a pen", "key").await.unwrap();
        assert_eq!(result.source_text, "I has a pen");
        assert_eq!(result.errors[0].suggestions, vec!["have".to_string()]);
    }

    #[test]
    fn client_builds_from_default_config() {
        assert!(HttpSpellService::new(&BridgeConfig::default()).is_ok());
    }
}
