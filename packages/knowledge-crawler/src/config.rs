//! Configuration types for crawl invocations and crawler tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CrawlError, CrawlResult};

/// Bounds accepted for `max_depth`.
pub const DEPTH_RANGE: std::ops::RangeInclusive<u32> = 1..=5;
/// Bounds accepted for `max_pages`.
pub const PAGE_RANGE: std::ops::RangeInclusive<usize> = 1..=250;

/// A crawl invocation as received from the hosting application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    /// Starting URL; its host defines the crawl scope
    pub seed_url: String,

    /// Maximum link depth to follow (1 = seed page only)
    pub max_depth: u32,

    /// Maximum pages fetched in this run
    pub max_pages: usize,

    /// Optional focus category, echoed back in the report
    #[serde(default)]
    pub category: Option<String>,

    /// Persist records through the knowledge store, or report-only
    pub auto_persist: bool,
}

impl CrawlRequest {
    /// Create a request for a seed URL with default limits.
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth: 3,
            max_pages: 100,
            category: None,
            auto_persist: true,
        }
    }

    /// Set the maximum crawl depth.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum page count.
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    /// Set a focus category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Disable persistence (the run still reports what it found).
    pub fn without_persistence(mut self) -> Self {
        self.auto_persist = false;
        self
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> CrawlResult<()> {
        if !DEPTH_RANGE.contains(&self.max_depth) {
            return Err(CrawlError::InvalidRequest {
                reason: format!(
                    "maxDepth {} outside {}..={}",
                    self.max_depth,
                    DEPTH_RANGE.start(),
                    DEPTH_RANGE.end()
                ),
            });
        }
        if !PAGE_RANGE.contains(&self.max_pages) {
            return Err(CrawlError::InvalidRequest {
                reason: format!(
                    "maxPages {} outside {}..={}",
                    self.max_pages,
                    PAGE_RANGE.start(),
                    PAGE_RANGE.end()
                ),
            });
        }
        Ok(())
    }
}

/// Tuning knobs for the crawler itself, with defaults suitable for
/// polite single-site crawling.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// User agent sent on every request
    pub user_agent: String,

    /// Fixed per-request timeout
    pub request_timeout: Duration,

    /// Minimum delay between consecutive requests to the same host
    pub politeness_delay_ms: u64,

    /// Worker pool size; same-host spacing still holds across workers
    pub max_concurrency: usize,

    /// Total URLs ever enqueued across a run
    pub frontier_enqueue_cap: usize,

    /// Wall-clock budget for a run; no new tasks start once exceeded,
    /// in-flight work always completes
    pub wall_clock_budget: Option<Duration>,

    /// Extracted page text is truncated to this many characters
    pub max_text_chars: usize,

    /// Days after which dated circulars are excluded from persistence
    pub recency_window_days: i64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("knowledge-crawler/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(30),
            politeness_delay_ms: 500,
            max_concurrency: 4,
            frontier_enqueue_cap: 250,
            wall_clock_budget: None,
            max_text_chars: 20_000,
            recency_window_days: 180,
        }
    }
}

impl CrawlerConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the per-host politeness delay in milliseconds.
    pub fn with_politeness_delay_ms(mut self, ms: u64) -> Self {
        self.politeness_delay_ms = ms;
        self
    }

    /// Set the worker pool size.
    pub fn with_max_concurrency(mut self, workers: usize) -> Self {
        self.max_concurrency = workers.max(1);
        self
    }

    /// Set the global frontier enqueue cap.
    pub fn with_frontier_enqueue_cap(mut self, cap: usize) -> Self {
        self.frontier_enqueue_cap = cap;
        self
    }

    /// Set a wall-clock budget for the whole run.
    pub fn with_wall_clock_budget(mut self, budget: Duration) -> Self {
        self.wall_clock_budget = Some(budget);
        self
    }

    /// Set the page text truncation limit.
    pub fn with_max_text_chars(mut self, chars: usize) -> Self {
        self.max_text_chars = chars;
        self
    }

    /// Set the recency window in days.
    pub fn with_recency_window_days(mut self, days: i64) -> Self {
        self.recency_window_days = days;
        self
    }
}
