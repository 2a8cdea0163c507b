//! Testing utilities: mock implementations of the network and extraction
//! seams, so crawl logic can be exercised without touching the network or
//! installing OCR tooling.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use url::Url;

use crate::documents::{ExtractedText, TextExtractor};
use crate::error::{ExtractResult, FetchError, FetchResult};
use crate::fetcher::{FetchedPage, PageFetcher};

/// A mock fetcher serving predefined responses by exact URL.
///
/// Tracks every fetch for assertions. Clones share state, so a test can
/// keep a handle for assertions after handing the fetcher to a crawler.
/// Unknown URLs fail with HTTP 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,
    fail_urls: Arc<RwLock<Vec<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve an HTML page at a URL.
    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.insert(url, "text/html", html.as_bytes().to_vec());
        self
    }

    /// Serve raw document bytes at a URL.
    pub fn with_document(self, url: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        self.insert(url, content_type, bytes);
        self
    }

    /// Make a URL fail with a connection error.
    pub fn fail_url(self, url: &str) -> Self {
        self.fail_urls
            .write()
            .unwrap()
            .push(canonical(url));
        self
    }

    /// Every URL fetched, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// How many times a URL was fetched.
    pub fn fetch_count(&self, url: &str) -> usize {
        let canonical = canonical(url);
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| **c == canonical)
            .count()
    }

    fn insert(&self, url: &str, content_type: &str, body: Vec<u8>) {
        let parsed = Url::parse(url).expect("mock URL must parse");
        self.pages.write().unwrap().insert(
            parsed.to_string(),
            FetchedPage {
                status: 200,
                body,
                content_type: Some(content_type.to_string()),
                final_url: parsed,
            },
        );
    }
}

fn canonical(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedPage> {
        let key = url.to_string();
        self.calls.write().unwrap().push(key.clone());

        if self.fail_urls.read().unwrap().contains(&key) {
            return Err(FetchError::Connection {
                url: key,
                message: "mock connection refused".to_string(),
            });
        }

        self.pages
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(FetchError::Http {
                url: key,
                status: 404,
            })
    }
}

/// A text extractor that treats document bytes as UTF-8 text.
///
/// Lets tests exercise the full document pipeline (recency gate, placement
/// mining, budgets) with plain-text fixtures instead of real PDFs.
#[derive(Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, bytes: &[u8]) -> ExtractResult<ExtractedText> {
        Ok(ExtractedText {
            text: String::from_utf8_lossy(bytes).to_string(),
            page_count: Some(1),
        })
    }
}

/// A text extractor that always fails, for failure-path tests.
pub struct FailingExtractor;

#[async_trait]
impl TextExtractor for FailingExtractor {
    async fn extract_text(&self, _bytes: &[u8]) -> ExtractResult<ExtractedText> {
        Err(crate::error::ExtractError::Pdf(
            "mock extraction failure".to_string(),
        ))
    }
}
