//! Configuration management module
//!
//! One YAML document with a section per concern, plus a handful of
//! environment overrides that only live for the current process.

use std::path::PathBuf;

use dom_overlay::TargetClassifier;
use extensions_bridge::BridgeConfig;
use overlay_controller::InteractionPolicy;
use serde::{Deserialize, Serialize};
use spell_model::CachePolicy;
use tracing::info;

use crate::errors::CliError;

pub const ENV_ENDPOINT: &str = "SOULSPELL_ENDPOINT";
pub const ENV_API_KEY: &str = "SOULSPELL_API_KEY";
pub const ENV_DISABLED: &str = "SOULSPELL_DISABLED";

const STATE_FILE_NAME: &str = "state.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionConfig {
    /// `host`, `parent.domain` (matches subdomains too) or `prefix.*.suffix`.
    pub denied_hosts: Vec<String>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            denied_hosts: vec![
                "accounts.google.com".to_string(),
                "login.naver.com".to_string(),
                "signin.*.com".to_string(),
            ],
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bridge: BridgeConfig,
    pub cache: CachePolicy,
    pub interaction: InteractionPolicy,
    pub exclusions: ExclusionConfig,
    /// Where the credential and toggle state is persisted.
    pub state_file: Option<PathBuf>,

    /// Process-only credential override; never written back.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Process-only kill switch.
    #[serde(skip)]
    pub force_disabled: bool,
}

impl Config {
    pub fn classifier(&self) -> TargetClassifier {
        TargetClassifier::with_denied_hosts(&self.exclusions.denied_hosts)
    }

    pub fn state_path(&self) -> Result<PathBuf, CliError> {
        if let Some(path) = &self.state_file {
            return Ok(path.clone());
        }
        let mut path = dirs::data_dir().ok_or(CliError::NoStateDir)?;
        path.push("soulspell");
        path.push(STATE_FILE_NAME);
        Ok(path)
    }

    /// True when the run must not touch persisted state.
    pub fn has_ephemeral_overrides(&self) -> bool {
        self.api_key.is_some() || self.force_disabled
    }

    /// Applies `SOULSPELL_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            info!(%endpoint, "endpoint overridden from environment");
            self.bridge.endpoint = endpoint;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            info!("API key supplied from environment");
            self.api_key = Some(key);
        }
        if let Some(flag) = lookup(ENV_DISABLED) {
            self.force_disabled = parse_flag(&flag);
        }
    }

    pub fn apply_process_env(&mut self) {
        self.apply_env_overrides(|key| std::env::var(key).ok());
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "interaction:\n  debounce_ms: 800\ncache:\n  capacity: 5\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.interaction.debounce_ms, 800);
        assert_eq!(config.interaction.hide_delay_ms, 2000);
        assert_eq!(config.cache.capacity, 5);
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.bridge.timeout_ms, 10_000);
        assert_eq!(config.exclusions.denied_hosts.len(), 3);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_ENDPOINT, "http://localhost:9000/check"),
            (ENV_API_KEY, "k-1"),
            (ENV_DISABLED, "TRUE"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.bridge.endpoint, "http://localhost:9000/check");
        assert_eq!(config.api_key.as_deref(), Some("k-1"));
        assert!(config.force_disabled);
        assert!(config.has_ephemeral_overrides());
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_API_KEY => Some("  ".to_string()),
            ENV_DISABLED => Some("0".to_string()),
            _ => None,
        });
        assert!(config.api_key.is_none());
        assert!(!config.force_disabled);
        assert!(!config.has_ephemeral_overrides());
    }

    #[test]
    fn denylist_feeds_classifier() {
        let mut config = Config::default();
        config.exclusions.denied_hosts = vec!["example.org".to_string()];
        let classifier = config.classifier();
        assert!(!classifier.host_allowed("docs.example.org"));
        assert!(classifier.host_allowed("accounts.google.com"));
    }

    #[test]
    fn explicit_state_file_wins() {
        let config = Config {
            state_file: Some(PathBuf::from("/tmp/soulspell-state.json")),
            ..Config::default()
        };
        assert_eq!(
            config.state_path().unwrap(),
            PathBuf::from("/tmp/soulspell-state.json")
        );
    }
}
