//! Typed errors for the crawler library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Per-item failures
//! (fetch, parse, document extraction) are recoverable: the crawl logs
//! and counts them and moves on. Only an unreachable seed URL aborts a run.

use thiserror::Error;

/// Run-level errors returned to the caller of a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Malformed or non-HTTP URL
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Request parameters outside their allowed ranges
    #[error("invalid crawl request: {reason}")]
    InvalidRequest { reason: String },

    /// The seed URL itself could not be fetched; nothing was crawled
    #[error("seed URL unreachable: {0}")]
    SeedUnreachable(#[source] FetchError),

    /// Fetch failure surfaced at run level
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Storage failure surfaced at run level
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from a single HTTP fetch. Non-fatal to the crawl: the task is
/// discarded, the failure counted, and the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request exceeded the fixed per-request timeout
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// Transport-level failure (DNS, refused connection, TLS)
    #[error("connection error fetching {url}: {message}")]
    Connection { url: String, message: String },

    /// Non-success HTTP status
    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    /// Target host is outside the seed's registrable domain
    #[error("off-site URL refused: {url}")]
    OffSite { url: String },

    /// URL failed to parse
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors from extracting text out of a linked document. The document is
/// skipped, a counter incremented, and the page's other documents continue.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// PDF could not be parsed or its text layer read
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// Image bytes could not be decoded
    #[error("image decoding failed: {0}")]
    Image(String),

    /// The tesseract binary is not installed on this host
    #[error("OCR unavailable: tesseract binary not found")]
    OcrUnavailable,

    /// OCR ran but failed
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// The document bytes could not be fetched
    #[error("document fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Content type has no extractor
    #[error("unsupported document type: {content_type}")]
    Unsupported { content_type: String },
}

/// Errors from the knowledge store. Fatal for the affected page only;
/// the crawl continues with the remaining frontier items.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type alias for run-level operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for document extraction.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
