//! Institutional-site knowledge crawler.
//!
//! Crawls a single site to build a structured knowledge base: discovers
//! pages, ranks them by topical importance, extracts text from HTML and
//! linked documents (PDF text layers, OCR over infographics), classifies
//! content into weighted categories, deduplicates near-identical pages by
//! normalized URL and content hash, and filters time-sensitive documents
//! by recency.
//!
//! # Usage
//!
//! ```rust,ignore
//! use knowledge_crawler::{Crawler, CrawlRequest, CrawlerConfig, MemoryStore};
//!
//! let crawler = Crawler::over_http(MemoryStore::new(), CrawlerConfig::default());
//! let report = crawler
//!     .run(CrawlRequest::new("https://college.example.edu").with_max_pages(100))
//!     .await?;
//! println!("{} new pages", report.summary.new_pages);
//! ```
//!
//! # Modules
//!
//! - [`normalize`] - URL canonicalization for crawl identity
//! - [`fetcher`] - HTTP access with per-host politeness and scope checks
//! - [`parser`] - HTML to structured page data
//! - [`classify`] - weighted keyword scoring and link priorities
//! - [`frontier`] - the priority crawl queue with link budgets and caps
//! - [`documents`] - PDF/image extraction behind the `TextExtractor` seam
//! - [`placement`] - best-effort placement-statistics mining
//! - [`store`] - the knowledge store boundary and dedup gate
//! - [`crawler`] - the orchestrator tying it all together
//! - [`testing`] - mock fetcher and extractors for tests

pub mod classify;
pub mod config;
pub mod crawler;
pub mod documents;
pub mod error;
pub mod fetcher;
pub mod frontier;
pub mod normalize;
pub mod parser;
pub mod placement;
pub mod store;
pub mod testing;
pub mod types;

// Re-export the core API at crate root
pub use config::{CrawlRequest, CrawlerConfig};
pub use crawler::Crawler;
pub use documents::{
    DocumentKind, DocumentPipeline, DocumentRecord, ImageTextExtractor, PdfTextExtractor,
    TextExtractor,
};
pub use error::{CrawlError, ExtractError, FetchError, StoreError};
pub use fetcher::{FetchedPage, HttpFetcher, PageFetcher};
pub use frontier::{CrawlTask, Frontier, FrontierState};
pub use placement::{PlacementData, PlacementStatistics};
pub use store::{KnowledgeStore, MemoryStore};
pub use types::{
    CategoryScore, ContentHash, CrawlReport, CrawlRunSummary, PageRecord, UpsertOutcome,
    VisitedRecord,
};
