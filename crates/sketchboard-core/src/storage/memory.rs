//! In-memory storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::SceneDocument;
use std::collections::HashMap;
use std::sync::RwLock;

/// Keeps documents in a map; used by tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, SceneDocument>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(err: E) -> StorageError {
    StorageError::Io(format!("lock poisoned: {err}"))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &SceneDocument) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let document = document.clone();
        Box::pin(async move {
            self.documents.write().map_err(poisoned)?.insert(id, document);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SceneDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let documents = self.documents.read().map_err(poisoned)?;
            documents.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.documents.write().map_err(poisoned)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let mut ids: Vec<String> = self.documents.read().map_err(poisoned)?.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.documents.read().map_err(poisoned)?.contains_key(&id)) })
    }
}
