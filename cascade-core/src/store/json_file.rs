//! JSON file backed state store.
//!
//! Reads are served from an in-memory cache. Saves replace the cache right
//! away and hand the document to a background flusher, which writes it with
//! a temp-file-and-rename so a crash never leaves a half-written file.
//! When saves outpace the disk only the latest document is written.

use crate::entities::StateDocument;
use crate::framework::{StateStore, StoreError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

type FlushSender = watch::Sender<Option<Arc<StateDocument>>>;

pub struct JsonFileStore {
    path: PathBuf,
    cache: RwLock<StateDocument>,
    flush_tx: Mutex<Option<FlushSender>>,
    flusher: Mutex<Option<JoinHandle<()>>>,
}

impl JsonFileStore {
    /// Load `path` (or start empty when it does not exist) and spawn the flusher.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No state file yet, starting empty");
                StateDocument::default()
            }
            Err(e) => return Err(e.into()),
        };

        let (flush_tx, flush_rx) = watch::channel(None);
        let flusher = tokio::spawn(Self::flush_loop(path.clone(), flush_rx));

        Ok(Self {
            path,
            cache: RwLock::new(document),
            flush_tx: Mutex::new(Some(flush_tx)),
            flusher: Mutex::new(Some(flusher)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop the flusher and write the cached document one last time.
    pub async fn close(&self) -> Result<(), StoreError> {
        drop(self.flush_tx.lock().await.take());
        if let Some(handle) = self.flusher.lock().await.take() {
            let _ = handle.await;
        }
        let document = self.cache.read().await.clone();
        write_atomically(&self.path, &document).await?;
        info!(path = %self.path.display(), "State store closed");
        Ok(())
    }

    async fn flush_loop(path: PathBuf, mut flush_rx: watch::Receiver<Option<Arc<StateDocument>>>) {
        while flush_rx.changed().await.is_ok() {
            let pending = flush_rx.borrow_and_update().clone();
            let Some(document) = pending else {
                continue;
            };
            match write_atomically(&path, &document).await {
                Ok(()) => debug!(path = %path.display(), "State flushed"),
                Err(e) => error!(path = %path.display(), error = %e, "Failed to flush state to disk"),
            }
        }
    }
}

async fn write_atomically(path: &Path, document: &StateDocument) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(document)?;
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, json).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<StateDocument, StoreError> {
        Ok(self.cache.read().await.clone())
    }

    async fn save(&self, document: StateDocument) -> Result<(), StoreError> {
        let flush_tx = self.flush_tx.lock().await;
        let Some(flush_tx) = flush_tx.as_ref() else {
            return Err(StoreError::Closed);
        };
        *self.cache.write().await = document.clone();
        flush_tx.send_replace(Some(Arc::new(document)));
        Ok(())
    }
}
