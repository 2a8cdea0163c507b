//! Linked-document extraction: PDFs and informational images.
//!
//! Extraction is dispatched through the [`TextExtractor`] capability trait,
//! one implementation per [`DocumentKind`], so the pipeline never inspects
//! bytes to decide how to handle a document. A recency gate marks documents
//! whose detected date is stale; stale circulars are dropped before
//! persistence.

pub mod dates;
mod image;
mod pdf;

pub use self::image::ImageTextExtractor;
pub use self::pdf::{PdfTextExtractor, MAX_PDF_PAGES};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::classify;
use crate::error::ExtractResult;
use crate::placement::{self, PlacementData};

/// Kept text per PDF document.
pub const MAX_PDF_TEXT_CHARS: usize = 5_000;
/// Kept text per OCR'd image.
pub const MAX_IMAGE_TEXT_CHARS: usize = 2_000;

/// The two linked-document shapes the crawler extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Classify a link target by its path extension.
    pub fn from_url(url: &Url) -> Option<Self> {
        let path = url.path().to_lowercase();
        if path.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if [".jpg", ".jpeg", ".png", ".gif", ".webp"]
            .iter()
            .any(|ext| path.ends_with(ext))
        {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// Text recovered from a document plus extraction metadata.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    /// Total pages in the source, where the format has pages
    pub page_count: Option<usize>,
}

/// Capability interface for recovering text from document bytes.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, bytes: &[u8]) -> ExtractResult<ExtractedText>;
}

/// A document link discovered on a page, scored before fetch.
#[derive(Debug, Clone)]
pub struct DocumentLink {
    pub url: Url,
    pub anchor_text: String,
    pub kind: DocumentKind,
    pub priority: u32,
}

/// An extracted document, owned by the page it was discovered on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub source_url: String,
    pub kind: DocumentKind,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_date: Option<NaiveDate>,
    pub within_recency_window: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_data: Option<PlacementData>,
}

/// Dispatches extraction per document kind and applies the recency gate.
pub struct DocumentPipeline {
    pdf: Arc<dyn TextExtractor>,
    image: Arc<dyn TextExtractor>,
    recency_window_days: i64,
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentPipeline {
    /// Pipeline with the built-in PDF and OCR extractors.
    pub fn new() -> Self {
        Self {
            pdf: Arc::new(PdfTextExtractor::new()),
            image: Arc::new(ImageTextExtractor::new()),
            recency_window_days: 180,
        }
    }

    /// Replace the PDF extractor.
    pub fn with_pdf_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.pdf = extractor;
        self
    }

    /// Replace the image extractor.
    pub fn with_image_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.image = extractor;
        self
    }

    /// Override the recency window.
    pub fn with_recency_window_days(mut self, days: i64) -> Self {
        self.recency_window_days = days;
        self
    }

    /// Extract one fetched document.
    ///
    /// Returns `Ok(None)` when the recency gate forbids persistence: the
    /// document classified as a circular/notification and its detected date
    /// is outside the window. Undated documents are marked
    /// `within_recency_window = false` but kept.
    pub async fn process(&self, link: &DocumentLink, bytes: &[u8]) -> ExtractResult<Option<DocumentRecord>> {
        let extractor = match link.kind {
            DocumentKind::Pdf => &self.pdf,
            DocumentKind::Image => &self.image,
        };

        let extracted = extractor.extract_text(bytes).await?;
        let cap = match link.kind {
            DocumentKind::Pdf => MAX_PDF_TEXT_CHARS,
            DocumentKind::Image => MAX_IMAGE_TEXT_CHARS,
        };
        let text = truncate_chars(extracted.text.trim(), cap);

        let dated_source = format!("{} {}", link.anchor_text, text);
        let detected_date = dates::detect_date(&dated_source);
        let today = Utc::now().date_naive();
        let within_recency_window = detected_date
            .map(|d| dates::within_window(d, today, self.recency_window_days))
            .unwrap_or(false);

        let categories = classify::classify(&link.anchor_text, &text);
        let is_circular = categories.contains_key("circulars");
        if is_circular && detected_date.is_some() && !within_recency_window {
            tracing::info!(
                url = %link.url,
                date = ?detected_date,
                "Dropping stale circular document"
            );
            return Ok(None);
        }

        let mined = placement::mine(&text);
        let placement_data = if mined.is_empty() { None } else { Some(mined) };

        tracing::debug!(
            url = %link.url,
            kind = ?link.kind,
            chars = text.len(),
            pages = ?extracted.page_count,
            "Document extracted"
        );

        Ok(Some(DocumentRecord {
            source_url: link.url.to_string(),
            kind: link.kind,
            title: link.anchor_text.clone(),
            text,
            detected_date,
            within_recency_window,
            page_count: extracted.page_count,
            size_bytes: bytes.len(),
            placement_data,
        }))
    }
}

fn truncate_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect()
}
