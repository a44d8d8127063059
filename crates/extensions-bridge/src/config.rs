//! Remote check endpoint configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use spell_model::NO_ERROR_PHRASE;

pub const DEFAULT_ENDPOINT: &str =
    "https://dcplxo2e85.execute-api.ap-northeast-2.amazonaws.com/v1/PnuWebSpeller/check?weakOpt=0";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Status message fragment that means "nothing to fix".
    pub no_error_phrase: String,
}

impl BridgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 10_000,
            no_error_phrase: NO_ERROR_PHRASE.to_string(),
        }
    }
}
