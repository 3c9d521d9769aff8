use crate::entities::StateDocument;
use crate::framework::{StateStore, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Process-local store with no durability, counting saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<StateDocument>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new(document: StateDocument) -> Self {
        Self {
            document: RwLock::new(document),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<StateDocument, StoreError> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: StateDocument) -> Result<(), StoreError> {
        *self.document.write().await = document;
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
