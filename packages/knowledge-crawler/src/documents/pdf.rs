//! PDF text extraction.

use async_trait::async_trait;

use super::{ExtractedText, TextExtractor};
use crate::error::{ExtractError, ExtractResult};

/// Pages read from a single PDF before truncation.
pub const MAX_PDF_PAGES: usize = 50;

/// Extracts the text layer of a PDF with `pdf-extract`, reporting the page
/// count from the document catalog. Parsing runs on the blocking pool; a
/// slow document never stalls unrelated crawl work.
pub struct PdfTextExtractor;

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, bytes: &[u8]) -> ExtractResult<ExtractedText> {
        if !bytes.starts_with(b"%PDF-") {
            return Err(ExtractError::Pdf("missing %PDF header".to_string()));
        }

        let bytes = bytes.to_vec();
        let result = tokio::task::spawn_blocking(move || {
            let page_count = lopdf::Document::load_mem(&bytes)
                .map(|doc| doc.get_pages().len())
                .ok();

            let text = pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| ExtractError::Pdf(e.to_string()))?;

            Ok::<_, ExtractError>((text, page_count))
        })
        .await
        .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))?;

        let (text, page_count) = result?;
        let text = cap_pages(&text, MAX_PDF_PAGES);

        Ok(ExtractedText { text, page_count })
    }
}

/// Keep at most `max_pages` pages of text. `pdf-extract` separates pages
/// with form feeds when the document provides them; without separators the
/// whole text passes through and the caller's character cap applies.
fn cap_pages(text: &str, max_pages: usize) -> String {
    if !text.contains('\u{c}') {
        return text.to_string();
    }
    text.split('\u{c}')
        .take(max_pages)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_pdf_bytes() {
        let extractor = PdfTextExtractor::new();
        let result = extractor.extract_text(b"this is not a pdf").await;
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_extract_error() {
        let extractor = PdfTextExtractor::new();
        let result = extractor.extract_text(b"%PDF-1.4 truncated garbage").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_page_cap_on_form_feeds() {
        let text = (0..60)
            .map(|i| format!("page {i}"))
            .collect::<Vec<_>>()
            .join("\u{c}");
        let capped = cap_pages(&text, MAX_PDF_PAGES);
        assert!(capped.contains("page 49"));
        assert!(!capped.contains("page 50"));
    }

    #[test]
    fn test_no_form_feeds_passes_through() {
        assert_eq!(cap_pages("plain text", MAX_PDF_PAGES), "plain text");
    }
}
