//! Durable persistence for exchanged OAuth tokens.
//!
//! Tokens are keyed by the exchange key so a replayed `(code, state)` pair is
//! served from storage instead of failing against GitHub's single-use codes.
//! No expiry is modeled: a stored token is assumed valid until GitHub revokes
//! it, matching the web-flow tokens this connector exchanges.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};

/// A persisted access token for one exchange key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
}

// Custom Debug keeps token values out of logs.
impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Key/value persistence for exchanged tokens.
///
/// `put` is write-once per key: storing the token already present is a no-op,
/// storing a *different* token under an existing key is an error.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedToken>>;
    async fn put(&self, key: &str, token: &CachedToken) -> Result<()>;
}

/// [`TokenStore`] backed by a single JSON document on disk.
///
/// Unlike a best-effort cache, read and write failures propagate: a request
/// must not proceed on a token that could not be durably recorded.
#[derive(Debug)]
pub struct JsonFileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the backing file.
    write_lock: Mutex<()>,
}

impl JsonFileTokenStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<HashMap<String, CachedToken>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| AppError::Storage(format!("token store is corrupt: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(AppError::Storage(format!(
                "unable to read token store: {err}"
            ))),
        }
    }

    async fn persist(&self, entries: &HashMap<String, CachedToken>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| AppError::Storage(format!("unable to create store dir: {err}")))?;
        }
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|err| AppError::Storage(format!("unable to encode token store: {err}")))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|err| AppError::Storage(format!("unable to write token store: {err}")))
    }
}

#[async_trait]
impl TokenStore for JsonFileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<CachedToken>> {
        Ok(self.load().await?.remove(key))
    }

    async fn put(&self, key: &str, token: &CachedToken) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        match entries.get(key) {
            Some(existing) if existing == token => return Ok(()),
            Some(_) => {
                return Err(AppError::Storage(format!(
                    "refusing to overwrite existing token for exchange key '{key}'"
                )));
            }
            None => {}
        }
        entries.insert(key.to_string(), token.clone());
        self.persist(&entries).await
    }
}
