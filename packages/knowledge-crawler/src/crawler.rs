//! Crawl orchestration.
//!
//! A bounded worker pool pulls tasks from a shared channel and returns
//! completed outcomes to the single aggregator loop, which is the only
//! writer of the frontier, the visited bookkeeping and the run summary.
//! Per-item failures are logged and counted; only an unreachable seed
//! aborts the run.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use url::Url;

use crate::classify::{self, HIGH_PRIORITY_WEIGHT, MEDIUM_PRIORITY_WEIGHT};
use crate::config::{CrawlRequest, CrawlerConfig};
use crate::documents::{DocumentKind, DocumentLink, DocumentPipeline, DocumentRecord};
use crate::error::{CrawlError, CrawlResult, FetchError};
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::frontier::{CrawlTask, Frontier, ScoredLink};
use crate::normalize;
use crate::parser;
use crate::placement::{self, PlacementStatistics};
use crate::store::{self, KnowledgeStore};
use crate::types::{ContentHash, CrawlReport, CrawlRunSummary, PageRecord, UpsertOutcome};

/// Weight of the placements category; pages at or above it get the large
/// document-extraction budget.
const PLACEMENT_WEIGHT: u32 = 95;
/// Documents extracted from a placement page.
const PLACEMENT_DOC_BUDGET: usize = 30;
/// Documents extracted from other high/medium-priority pages.
const HIGH_PRIORITY_DOC_BUDGET: usize = 15;
/// Links persisted on a page record.
const MAX_STORED_LINKS: usize = 60;

/// Anchor-text markers that make a linked image worth OCR even on a page
/// that is not otherwise high priority.
const INFORMATIONAL_IMAGE_MARKERS: &[&str] = &["placement", "statistics", "data", "info"];

/// The crawl orchestrator. Owns the run summary and the frontier for the
/// duration of a run; hands completed pages to the knowledge store through
/// the dedup gate.
pub struct Crawler<F, S> {
    fetcher: Arc<F>,
    store: Arc<S>,
    documents: Arc<DocumentPipeline>,
    config: CrawlerConfig,
}

impl<S> Crawler<HttpFetcher, S>
where
    S: KnowledgeStore,
{
    /// Crawler over real HTTP with the given tuning.
    pub fn over_http(store: S, config: CrawlerConfig) -> Self {
        let fetcher = HttpFetcher::new(&config);
        Self {
            fetcher: Arc::new(fetcher),
            store: Arc::new(store),
            documents: Arc::new(
                DocumentPipeline::new().with_recency_window_days(config.recency_window_days),
            ),
            config,
        }
    }
}

impl<F, S> Crawler<F, S>
where
    F: PageFetcher + 'static,
    S: KnowledgeStore,
{
    /// Crawler over any fetcher, with defaults for everything else.
    pub fn new(fetcher: F, store: S) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store: Arc::new(store),
            documents: Arc::new(DocumentPipeline::new()),
            config: CrawlerConfig::default(),
        }
    }

    /// Replace the crawler tuning.
    pub fn with_config(mut self, config: CrawlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the document pipeline.
    pub fn with_documents(mut self, documents: DocumentPipeline) -> Self {
        self.documents = Arc::new(documents);
        self
    }

    /// Run one crawl to completion.
    ///
    /// Returns the run summary plus every newly written or updated page
    /// record, or `SeedUnreachable` when the seed itself cannot be fetched.
    pub async fn run(&self, request: CrawlRequest) -> CrawlResult<CrawlReport> {
        request.validate()?;

        let seed_normalized = normalize::normalize(&request.seed_url)?;
        let seed_url = Url::parse(&seed_normalized).map_err(|_| CrawlError::InvalidUrl {
            url: request.seed_url.clone(),
        })?;
        let seed_host = seed_url
            .host_str()
            .ok_or_else(|| CrawlError::InvalidUrl {
                url: request.seed_url.clone(),
            })?
            .to_lowercase();

        tracing::info!(
            seed = %seed_url,
            max_depth = request.max_depth,
            max_pages = request.max_pages,
            auto_persist = request.auto_persist,
            "Starting crawl"
        );

        let mut frontier = Frontier::new(request.max_pages)
            .with_enqueue_cap(self.config.frontier_enqueue_cap);
        let seed_priority = classify::link_priority(&seed_normalized, "");
        frontier.seed(seed_url, seed_normalized, seed_priority);

        let workers = self.config.max_concurrency.max(1);
        let (task_tx, task_rx) = mpsc::channel::<CrawlTask>(workers);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<TaskOutcome>(workers);
        let task_rx = Arc::new(Mutex::new(task_rx));

        let ctx = Arc::new(WorkerContext {
            fetcher: Arc::clone(&self.fetcher),
            documents: Arc::clone(&self.documents),
            seed_host,
            max_text_chars: self.config.max_text_chars,
        });

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let ctx = Arc::clone(&ctx);
            let task_rx = Arc::clone(&task_rx);
            let outcome_tx = outcome_tx.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let task = {
                        let mut rx = task_rx.lock().await;
                        rx.recv().await
                    };
                    let Some(task) = task else { break };
                    tracing::debug!(worker_id, url = %task.url, depth = task.depth, "Processing task");
                    let outcome = process_task(ctx.as_ref(), task).await;
                    if outcome_tx.send(outcome).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(outcome_tx);

        let mut summary = CrawlRunSummary::default();
        let mut stats = PlacementStatistics::default();
        let mut pages = Vec::new();
        let mut in_flight = 0usize;
        let mut seed_error: Option<FetchError> = None;
        let started = std::time::Instant::now();
        let mut budget_spent = false;

        loop {
            let out_of_time = self
                .config
                .wall_clock_budget
                .is_some_and(|budget| started.elapsed() >= budget);
            if out_of_time && !budget_spent {
                budget_spent = true;
                tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Wall-clock budget spent, draining in-flight work"
                );
            }

            while !out_of_time && in_flight < workers {
                let Some(task) = frontier.next_task() else { break };
                if task_tx.send(task).await.is_err() {
                    break;
                }
                in_flight += 1;
            }
            if in_flight == 0 {
                break;
            }

            let Some(outcome) = outcome_rx.recv().await else { break };
            in_flight -= 1;

            match outcome {
                TaskOutcome::FetchFailed { url, depth, error } => {
                    if depth == 0 && summary.total_pages == 0 {
                        seed_error = Some(error);
                        break;
                    }
                    tracing::warn!(url = %url, error = %error, "Fetch failed, page skipped");
                    summary.failed_fetches += 1;
                }
                TaskOutcome::Page(outcome) => {
                    let PageOutcome {
                        depth,
                        record,
                        discovered,
                        failed_documents,
                    } = *outcome;

                    summary.total_pages += 1;
                    summary.documents_extracted += record.document_count;
                    summary.failed_extractions += failed_documents;

                    if let Some(primary) = classify::primary_category(&record.categories) {
                        *summary
                            .category_breakdown
                            .entry(primary.to_string())
                            .or_insert(0) += 1;
                    }
                    match record.priority_score {
                        p if p >= HIGH_PRIORITY_WEIGHT => summary.priority_breakdown.high += 1,
                        p if p >= MEDIUM_PRIORITY_WEIGHT => summary.priority_breakdown.medium += 1,
                        _ => summary.priority_breakdown.low += 1,
                    }

                    if record.categories.contains_key("placements") {
                        if let Some(data) = &record.placement_data {
                            stats.absorb(data);
                        }
                    }

                    if depth + 1 < request.max_depth {
                        frontier.push_links(depth, &discovered);
                    }

                    if request.auto_persist {
                        match store::upsert(self.store.as_ref(), &record).await {
                            Ok(UpsertOutcome::Inserted) => {
                                summary.new_pages += 1;
                                pages.push(record);
                            }
                            Ok(UpsertOutcome::Updated) => {
                                summary.updated_pages += 1;
                                pages.push(record);
                            }
                            Ok(UpsertOutcome::SkippedDuplicate) => {
                                summary.skipped_duplicates += 1;
                            }
                            Err(error) => {
                                // fatal for this page only
                                tracing::error!(
                                    url = %record.url,
                                    error = %error,
                                    "Store write failed, page dropped"
                                );
                            }
                        }
                    } else {
                        pages.push(record);
                    }
                }
            }
        }

        drop(task_tx);
        for handle in handles {
            let _ = handle.await;
        }

        if let Some(error) = seed_error {
            tracing::error!(error = %error, "Seed unreachable, aborting run");
            return Err(CrawlError::SeedUnreachable(error));
        }

        tracing::info!(
            total_pages = summary.total_pages,
            new_pages = summary.new_pages,
            updated_pages = summary.updated_pages,
            skipped_duplicates = summary.skipped_duplicates,
            documents_extracted = summary.documents_extracted,
            failed_fetches = summary.failed_fetches,
            "Crawl completed"
        );

        Ok(CrawlReport {
            summary,
            pages,
            placement_statistics: if stats.is_empty() { None } else { Some(stats) },
            category: request.category,
        })
    }
}

struct WorkerContext<F> {
    fetcher: Arc<F>,
    documents: Arc<DocumentPipeline>,
    seed_host: String,
    max_text_chars: usize,
}

enum TaskOutcome {
    Page(Box<PageOutcome>),
    FetchFailed {
        url: Url,
        depth: u32,
        error: FetchError,
    },
}

struct PageOutcome {
    depth: u32,
    record: PageRecord,
    discovered: Vec<ScoredLink>,
    failed_documents: usize,
}

/// Fetch, parse, classify and extract one page. Everything here is local
/// to the task; shared state is only touched by the aggregator.
async fn process_task<F: PageFetcher>(ctx: &WorkerContext<F>, task: CrawlTask) -> TaskOutcome {
    let fetched = match ctx.fetcher.fetch(&task.url).await {
        Ok(fetched) => fetched,
        Err(error) => {
            return TaskOutcome::FetchFailed {
                url: task.url,
                depth: task.depth,
                error,
            }
        }
    };

    let html = fetched.text();
    let parsed = parser::parse(&html, &fetched.final_url, ctx.max_text_chars);
    let priority_score = classify::link_priority(&task.normalized_url, &parsed.title);

    let (documents, failed_documents) =
        extract_documents(ctx, &parsed.document_links, priority_score).await;

    let mut full_text = parsed.text.clone();
    for document in &documents {
        full_text.push(' ');
        full_text.push_str(&document.text);
    }

    let categories = classify::classify(&parsed.title, &full_text);

    let mut placement_data = placement::mine(&parsed.text);
    for document in &documents {
        if let Some(mined) = &document.placement_data {
            placement_data.merge(mined);
        }
    }

    let discovered = score_links(&parsed.links, &ctx.seed_host);

    let record = PageRecord {
        url: task.normalized_url.clone(),
        title: parsed.title,
        content: full_text.clone(),
        content_hash: ContentHash::from_text(&full_text),
        categories,
        priority_score,
        word_count: full_text.split_whitespace().count(),
        links: discovered
            .iter()
            .take(MAX_STORED_LINKS)
            .map(|l| l.normalized_url.clone())
            .collect(),
        images: parsed.images.iter().map(|u| u.to_string()).collect(),
        meta_description: parsed.meta_description,
        has_contact_info: !parsed.contact_info.is_empty(),
        contact_info: parsed.contact_info,
        has_tables: parsed.has_tables,
        document_count: documents.len(),
        documents,
        placement_data: if placement_data.is_empty() {
            None
        } else {
            Some(placement_data)
        },
        published_at: parsed.published_at,
        extracted_at: Utc::now(),
    };

    tracing::info!(
        url = %record.url,
        title = %record.title,
        priority = record.priority_score,
        documents = record.document_count,
        words = record.word_count,
        "Page processed"
    );

    TaskOutcome::Page(Box::new(PageOutcome {
        depth: task.depth,
        record,
        discovered,
        failed_documents,
    }))
}

/// Fetch and extract a page's linked documents under its priority budget.
async fn extract_documents<F: PageFetcher>(
    ctx: &WorkerContext<F>,
    links: &[DocumentLink],
    page_priority: u32,
) -> (Vec<DocumentRecord>, usize) {
    let budget = if page_priority >= PLACEMENT_WEIGHT {
        PLACEMENT_DOC_BUDGET
    } else if page_priority >= MEDIUM_PRIORITY_WEIGHT {
        HIGH_PRIORITY_DOC_BUDGET
    } else {
        0
    };
    if budget == 0 || links.is_empty() {
        return (Vec::new(), 0);
    }

    let mut candidates: Vec<DocumentLink> = links
        .iter()
        .filter(|link| {
            link.url
                .host_str()
                .map(|h| normalize::in_scope(h, &ctx.seed_host))
                .unwrap_or(false)
        })
        .filter(|link| match link.kind {
            DocumentKind::Pdf => true,
            DocumentKind::Image => {
                let anchor = link.anchor_text.to_lowercase();
                page_priority >= MEDIUM_PRIORITY_WEIGHT
                    || INFORMATIONAL_IMAGE_MARKERS.iter().any(|m| anchor.contains(m))
            }
        })
        .cloned()
        .collect();

    for link in &mut candidates {
        link.priority = classify::link_priority(link.url.as_str(), &link.anchor_text);
    }
    // stable sort keeps discovery order within equal priorities
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut records = Vec::new();
    let mut failed = 0usize;
    for link in candidates.into_iter().take(budget) {
        let bytes = match ctx.fetcher.fetch(&link.url).await {
            Ok(fetched) => fetched.body,
            Err(error) => {
                tracing::warn!(url = %link.url, error = %error, "Document fetch failed");
                failed += 1;
                continue;
            }
        };

        match ctx.documents.process(&link, &bytes).await {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {
                // recency gate dropped a stale circular; not a failure
            }
            Err(error) => {
                tracing::warn!(url = %link.url, error = %error, "Document extraction failed");
                failed += 1;
            }
        }
    }

    (records, failed)
}

/// Score a page's outgoing links for the frontier, in discovery order.
/// Off-site and malformed targets are dropped here.
fn score_links(links: &[parser::DiscoveredLink], seed_host: &str) -> Vec<ScoredLink> {
    let mut scored = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for link in links {
        let Some(host) = link.url.host_str() else { continue };
        if !normalize::in_scope(host, seed_host) {
            continue;
        }
        let Ok(normalized_url) = normalize::normalize_url(&link.url) else {
            continue;
        };
        if !seen.insert(normalized_url.clone()) {
            continue;
        }
        let priority = classify::link_priority(&normalized_url, &link.anchor_text);
        scored.push(ScoredLink {
            url: link.url.clone(),
            normalized_url,
            priority,
        });
    }

    scored
}
