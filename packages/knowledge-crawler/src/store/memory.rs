//! In-memory store implementation for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::KnowledgeStore;
use crate::error::StoreResult;
use crate::types::{ContentHash, PageRecord, VisitedRecord};

/// In-memory knowledge store. Useful for tests and development; data is
/// lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    pages: RwLock<HashMap<String, PageRecord>>,
    visited: RwLock<HashMap<String, VisitedRecord>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.pages.write().unwrap().clear();
        self.visited.write().unwrap().clear();
    }

    /// Snapshot of every stored page.
    pub fn pages(&self) -> Vec<PageRecord> {
        self.pages.read().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl KnowledgeStore for MemoryStore {
    async fn get_visited(&self, normalized_url: &str) -> StoreResult<Option<VisitedRecord>> {
        Ok(self.visited.read().unwrap().get(normalized_url).cloned())
    }

    async fn record_visited(&self, record: VisitedRecord) -> StoreResult<()> {
        self.visited
            .write()
            .unwrap()
            .insert(record.normalized_url.clone(), record);
        Ok(())
    }

    async fn has_content_hash(&self, hash: &ContentHash) -> StoreResult<bool> {
        Ok(self
            .pages
            .read()
            .unwrap()
            .values()
            .any(|p| p.content_hash == *hash))
    }

    async fn insert_page(&self, record: &PageRecord) -> StoreResult<()> {
        self.pages
            .write()
            .unwrap()
            .insert(record.url.clone(), record.clone());
        Ok(())
    }

    async fn update_page(&self, record: &PageRecord) -> StoreResult<()> {
        self.pages
            .write()
            .unwrap()
            .insert(record.url.clone(), record.clone());
        Ok(())
    }

    async fn get_page(&self, normalized_url: &str) -> StoreResult<Option<PageRecord>> {
        Ok(self.pages.read().unwrap().get(normalized_url).cloned())
    }

    async fn page_count(&self) -> StoreResult<usize> {
        Ok(self.pages.read().unwrap().len())
    }
}
