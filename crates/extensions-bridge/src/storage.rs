//! Persisted extension state: the API credential and the on/off toggle.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use dashmap::DashMap;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::BridgeError;

const API_KEY: &str = "apiKey";
const SETUP_DONE: &str = "setupDone";
const EXTENSION_ENABLED: &str = "extensionEnabled";

/// Flat key/value storage shared by the background context.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, BridgeError>;
    async fn set(&self, entries: Vec<(&'static str, Value)>) -> Result<(), BridgeError>;
    async fn remove(&self, keys: &[&str]) -> Result<(), BridgeError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, BridgeError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, entries: Vec<(&'static str, Value)>) -> Result<(), BridgeError> {
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value);
        }
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), BridgeError> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }
}

/// JSON object on disk. A missing file reads as empty.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            path: path.into(),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, BridgeError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(BridgeError::Storage(err.to_string())),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "state file is not a JSON object; starting empty");
                Ok(Map::new())
            }
        }
    }

    async fn save(&self, map: Map<String, Value>) -> Result<(), BridgeError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| BridgeError::Storage(err.to_string()))?;
        }
        let body = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|err| BridgeError::Storage(err.to_string()))?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|err| BridgeError::Storage(err.to_string()))
    }
}

#[async_trait]
impl LocalStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, BridgeError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, entries: Vec<(&'static str, Value)>) -> Result<(), BridgeError> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        for (key, value) in entries {
            map.insert(key.to_string(), value);
        }
        self.save(map).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), BridgeError> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        for key in keys {
            map.remove(*key);
        }
        self.save(map).await
    }
}

/// The single API credential, stored base64-encoded next to a setup flag.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn LocalStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub async fn set(&self, api_key: &str) -> Result<(), BridgeError> {
        self.store
            .set(vec![
                (API_KEY, Value::String(Base64.encode(api_key.as_bytes()))),
                (SETUP_DONE, Value::Bool(true)),
            ])
            .await
    }

    /// Decoded credential; an undecodable or empty value reads as absent.
    pub async fn get(&self) -> Result<Option<String>, BridgeError> {
        let Some(Value::String(encoded)) = self.store.get(API_KEY).await? else {
            return Ok(None);
        };
        let decoded = Base64
            .decode(encoded.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|key| !key.is_empty());
        if decoded.is_none() {
            debug!("stored credential could not be decoded");
        }
        Ok(decoded)
    }

    pub async fn is_setup(&self) -> Result<bool, BridgeError> {
        Ok(matches!(self.store.get(SETUP_DONE).await?, Some(Value::Bool(true))))
    }

    pub async fn clear(&self) -> Result<(), BridgeError> {
        self.store.remove(&[API_KEY, SETUP_DONE]).await
    }
}

/// Global enable switch; absent means enabled.
#[derive(Clone)]
pub struct ToggleStore {
    store: Arc<dyn LocalStore>,
}

impl ToggleStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub async fn is_enabled(&self) -> Result<bool, BridgeError> {
        Ok(!matches!(
            self.store.get(EXTENSION_ENABLED).await?,
            Some(Value::Bool(false))
        ))
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<(), BridgeError> {
        self.store
            .set(vec![(EXTENSION_ENABLED, Value::Bool(enabled))])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn credential_round_trip_and_clear() {
        let store = MemoryStore::new();
        let credentials = CredentialStore::new(store.clone());
        assert_eq!(credentials.get().await.unwrap(), None);
        assert!(!credentials.is_setup().await.unwrap());

        credentials.set("key-123").await.unwrap();
        assert_eq!(credentials.get().await.unwrap().as_deref(), Some("key-123"));
        assert!(credentials.is_setup().await.unwrap());
        assert_eq!(
            store.get(API_KEY).await.unwrap(),
            Some(Value::String("a2V5LTEyMw==".into()))
        );

        credentials.clear().await.unwrap();
        assert_eq!(credentials.get().await.unwrap(), None);
        assert!(!credentials.is_setup().await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_credential_reads_as_missing() {
        let store = MemoryStore::new();
        store
            .set(vec![(API_KEY, Value::String("%%not base64%%".into()))])
            .await
            .unwrap();
        assert_eq!(CredentialStore::new(store).get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn toggle_defaults_to_enabled() {
        let toggle = ToggleStore::new(MemoryStore::new());
        assert!(toggle.is_enabled().await.unwrap());
        toggle.set_enabled(false).await.unwrap();
        assert!(!toggle.is_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        CredentialStore::new(FileStore::new(&path)).set("persisted").await.unwrap();
        ToggleStore::new(FileStore::new(&path)).set_enabled(false).await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            CredentialStore::new(reopened.clone()).get().await.unwrap().as_deref(),
            Some("persisted")
        );
        assert!(!ToggleStore::new(reopened).is_enabled().await.unwrap());
    }
}
