use super::errors::StoreError;
use super::types::WhitelistDocument;
use chrono::Utc;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

/// What read-only callers see when the whitelist file cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ReadPolicy {
    /// Substitute an empty document, so every verification is denied.
    FailOpen,
    /// Surface the read failure to the caller.
    FailClosed,
}

impl FromStr for ReadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" => Ok(ReadPolicy::FailOpen),
            "fail-closed" => Ok(ReadPolicy::FailClosed),
            other => Err(format!("unknown read policy: {}", other)),
        }
    }
}

impl TryFrom<String> for ReadPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// Owns the whitelist JSON file. Every load/save goes through a StoreSession,
// which holds the store mutex so a request's read-modify-write cannot
// interleave with another request in this process.
#[derive(Debug)]
pub struct WhitelistStore {
    path: PathBuf,
    read_policy: ReadPolicy,
    lock: Mutex<()>,
}

pub struct StoreSession<'a> {
    store: &'a WhitelistStore,
    _guard: MutexGuard<'a, ()>,
}

impl WhitelistStore {
    pub fn new(path: impl Into<PathBuf>, read_policy: ReadPolicy) -> Self {
        Self {
            path: path.into(),
            read_policy,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_policy(&self) -> ReadPolicy {
        self.read_policy
    }

    /// Sibling file a save is written to before it replaces the whitelist.
    pub fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }

    pub async fn session(&self) -> StoreSession<'_> {
        StoreSession {
            store: self,
            _guard: self.lock.lock().await,
        }
    }

    // Writes a fresh empty document if the file is missing
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StoreError::ReadFailure(e.to_string()))?;
        if exists {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::WriteFailure(e.to_string()))?;
            }
        }

        let doc = WhitelistDocument::new(Utc::now());
        self.write(&doc).await?;
        info!(path = %self.path.display(), "Created empty whitelist file");
        Ok(())
    }

    async fn read(&self) -> Result<WhitelistDocument, StoreError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StoreError::Missing,
                _ => StoreError::ReadFailure(e.to_string()),
            })?;
        serde_json::from_str(&contents).map_err(|e| StoreError::ParseFailure(e.to_string()))
    }

    async fn write(&self, doc: &WhitelistDocument) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::SerializeFailure(e.to_string()))?;
        // Readers never observe a half-written whitelist
        let staging = self.staging_path();
        tokio::fs::write(&staging, contents)
            .await
            .map_err(|e| StoreError::WriteFailure(e.to_string()))?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(StoreError::WriteFailure(e.to_string()));
        }
        Ok(())
    }
}

impl StoreSession<'_> {
    pub async fn load(&self) -> Result<WhitelistDocument, StoreError> {
        self.store.read().await
    }

    /// Load for callers that will write back. A missing file yields a fresh
    /// document; an existing file that cannot be read or parsed is an error,
    /// so it is never overwritten.
    pub async fn load_for_write(&self) -> Result<WhitelistDocument, StoreError> {
        match self.store.read().await {
            Err(StoreError::Missing) => {
                info!(path = %self.store.path.display(), "Whitelist file missing, starting fresh");
                Ok(WhitelistDocument::new(Utc::now()))
            }
            other => other,
        }
    }

    /// Load for callers that never write back. Applies the store's read policy.
    pub async fn load_for_read(&self) -> Result<WhitelistDocument, StoreError> {
        match self.load_for_write().await {
            Err(e) if e.is_read_failure() && self.store.read_policy == ReadPolicy::FailOpen => {
                warn!(
                    path = %self.store.path.display(),
                    error = %e,
                    "Whitelist unreadable, treating as empty"
                );
                Ok(WhitelistDocument::new(Utc::now()))
            }
            other => other,
        }
    }

    pub async fn save(&self, doc: &mut WhitelistDocument) -> Result<(), StoreError> {
        doc.updated_at = Utc::now().max(doc.created_at);
        self.store.write(doc).await.inspect_err(|e| {
            error!(path = %self.store.path.display(), error = %e, "Failed to save whitelist");
        })
    }
}
