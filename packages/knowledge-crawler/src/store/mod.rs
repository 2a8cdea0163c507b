//! Knowledge store boundary and the dedup gate.
//!
//! The external store is abstract: the hosting application brings its own
//! implementation, the crate ships [`MemoryStore`] for tests and
//! development. All store mutation goes through [`upsert`], which decides
//! insert vs. update vs. skip from URL identity first and content hash
//! second.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreResult;
use crate::types::{ContentHash, PageRecord, UpsertOutcome, VisitedRecord};

/// Persistence seam for crawled pages.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Look up the visited record for a normalized URL.
    async fn get_visited(&self, normalized_url: &str) -> StoreResult<Option<VisitedRecord>>;

    /// Create or replace the visited record for a normalized URL.
    async fn record_visited(&self, record: VisitedRecord) -> StoreResult<()>;

    /// True when any stored page carries this content hash.
    async fn has_content_hash(&self, hash: &ContentHash) -> StoreResult<bool>;

    /// Insert a new page record.
    async fn insert_page(&self, record: &PageRecord) -> StoreResult<()>;

    /// Overwrite the content fields of an existing page record.
    async fn update_page(&self, record: &PageRecord) -> StoreResult<()>;

    /// Fetch a page record by normalized URL.
    async fn get_page(&self, normalized_url: &str) -> StoreResult<Option<PageRecord>>;

    /// Number of stored pages.
    async fn page_count(&self) -> StoreResult<usize>;
}

#[async_trait]
impl<T: KnowledgeStore + ?Sized> KnowledgeStore for std::sync::Arc<T> {
    async fn get_visited(&self, normalized_url: &str) -> StoreResult<Option<VisitedRecord>> {
        (**self).get_visited(normalized_url).await
    }

    async fn record_visited(&self, record: VisitedRecord) -> StoreResult<()> {
        (**self).record_visited(record).await
    }

    async fn has_content_hash(&self, hash: &ContentHash) -> StoreResult<bool> {
        (**self).has_content_hash(hash).await
    }

    async fn insert_page(&self, record: &PageRecord) -> StoreResult<()> {
        (**self).insert_page(record).await
    }

    async fn update_page(&self, record: &PageRecord) -> StoreResult<()> {
        (**self).update_page(record).await
    }

    async fn get_page(&self, normalized_url: &str) -> StoreResult<Option<PageRecord>> {
        (**self).get_page(normalized_url).await
    }

    async fn page_count(&self) -> StoreResult<usize> {
        (**self).page_count().await
    }
}

/// Write a page through the dedup gate.
///
/// URL identity is primary: an existing visited record for the same
/// normalized URL either skips (hash unchanged) or updates (hash changed).
/// The content hash is the secondary discriminator: a URL never seen
/// before whose rendered text already exists under another URL is an
/// alias and is skipped, which is what keeps `https://Site.com/Page/` and
/// `https://site.com/page` from becoming two knowledge-base entries.
pub async fn upsert<S>(store: &S, record: &PageRecord) -> StoreResult<UpsertOutcome>
where
    S: KnowledgeStore + ?Sized,
{
    match store.get_visited(&record.url).await? {
        Some(visited) if visited.content_hash == record.content_hash => {
            tracing::debug!(url = %record.url, "Content unchanged, skipping");
            Ok(UpsertOutcome::SkippedDuplicate)
        }
        Some(_) => {
            store.update_page(record).await?;
            store
                .record_visited(VisitedRecord {
                    normalized_url: record.url.clone(),
                    content_hash: record.content_hash.clone(),
                    last_crawled_at: Utc::now(),
                })
                .await?;
            tracing::info!(url = %record.url, hash = %record.content_hash, "Page updated");
            Ok(UpsertOutcome::Updated)
        }
        None if store.has_content_hash(&record.content_hash).await? => {
            tracing::debug!(
                url = %record.url,
                hash = %record.content_hash,
                "Duplicate content under a new URL, skipping"
            );
            Ok(UpsertOutcome::SkippedDuplicate)
        }
        None => {
            store.insert_page(record).await?;
            store
                .record_visited(VisitedRecord {
                    normalized_url: record.url.clone(),
                    content_hash: record.content_hash.clone(),
                    last_crawled_at: Utc::now(),
                })
                .await?;
            tracing::info!(url = %record.url, hash = %record.content_hash, "Page inserted");
            Ok(UpsertOutcome::Inserted)
        }
    }
}
