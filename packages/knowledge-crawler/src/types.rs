//! Core record types shared across the crawl pipeline and the
//! persistence/reporting boundaries.
//!
//! Boundary records serialize camelCase; their field set is schema-stable
//! for the hosting application's store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::documents::DocumentRecord;
use crate::placement::PlacementData;

/// Content hash for deduplication.
///
/// Computed over lowercased, whitespace-collapsed extracted text — never raw
/// HTML — so markup-only changes do not register as content changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash extracted text after normalization.
    pub fn from_text(text: &str) -> Self {
        let normalized = normalize_for_hashing(text);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize text so whitespace and casing differences hash identically.
fn normalize_for_hashing(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// One per distinct normalized URL fetched in a run; never deleted within
/// a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitedRecord {
    pub normalized_url: String,
    pub content_hash: ContentHash,
    pub last_crawled_at: DateTime<Utc>,
}

/// Per-category classification result attached to a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub score: u32,
    pub matched_keywords: Vec<String>,
    pub confidence: f32,
}

/// Emails and phone numbers found on a page (both capped).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty()
    }
}

/// A successfully parsed page, ready for the knowledge store.
///
/// `url` is the normalized form and is the record's identity key. A later
/// crawl of the same URL with a different `content_hash` supersedes the
/// record's content fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    pub content_hash: ContentHash,
    pub categories: BTreeMap<String, CategoryScore>,
    pub priority_score: u32,
    pub word_count: usize,
    pub links: Vec<String>,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    pub contact_info: ContactInfo,
    pub has_contact_info: bool,
    pub has_tables: bool,
    pub document_count: usize,
    pub documents: Vec<DocumentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_data: Option<PlacementData>,
    /// Publish/update date from the page itself, or the crawl time
    pub published_at: DateTime<Utc>,
    pub extracted_at: DateTime<Utc>,
}

/// Outcome of writing a page through the dedup gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    SkippedDuplicate,
}

/// Page counts by priority bucket.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Counters accumulated over a crawl run, returned to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRunSummary {
    pub total_pages: usize,
    pub new_pages: usize,
    pub updated_pages: usize,
    pub skipped_duplicates: usize,
    pub documents_extracted: usize,
    pub failed_fetches: usize,
    pub failed_extractions: usize,
    pub category_breakdown: BTreeMap<String, usize>,
    pub priority_breakdown: PriorityBreakdown,
}

/// Result of a crawl run: the summary plus every newly written or updated
/// page record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub summary: CrawlRunSummary,
    pub pages: Vec<PageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_statistics: Option<crate::placement::PlacementStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_ignores_markup_noise() {
        let a = ContentHash::from_text("Admissions   open\n\nfor 2025");
        let b = ContentHash::from_text("admissions open for 2025");
        assert_eq!(a, b);
    }

    #[test]
    fn test_content_hash_distinguishes_content() {
        let a = ContentHash::from_text("Admissions open for 2025");
        let b = ContentHash::from_text("Admissions closed for 2025");
        assert_ne!(a, b);
    }

    #[test]
    fn test_content_hash_is_hex_sha256() {
        let hash = ContentHash::from_text("anything");
        assert_eq!(hash.as_str().len(), 64);
        assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
