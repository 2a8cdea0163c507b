//! End-to-end crawl tests over a mock site: dedup through both identity
//! paths, cap enforcement, the recency gate, and placement mining.

use std::sync::Arc;

use knowledge_crawler::documents::DocumentPipeline;
use knowledge_crawler::testing::{MockFetcher, PlainTextExtractor};
use knowledge_crawler::{
    CrawlError, CrawlRequest, Crawler, CrawlerConfig, KnowledgeStore, MemoryStore, UpsertOutcome,
};

fn quiet_config() -> CrawlerConfig {
    // No politeness waits in tests
    CrawlerConfig::default().with_politeness_delay_ms(0)
}

fn plain_text_documents() -> DocumentPipeline {
    DocumentPipeline::new().with_pdf_extractor(Arc::new(PlainTextExtractor::new()))
}

fn college_site() -> MockFetcher {
    MockFetcher::new()
        .with_html(
            "https://college.edu/",
            r#"<html><head><title>Sunrise College</title></head><body>
                <p>Welcome to Sunrise College, an autonomous institution.</p>
                <a href="/training-and-placement">Placement Cell</a>
                <a href="/admissions">Admissions</a>
                <a href="/library">Library</a>
            </body></html>"#,
        )
        .with_html(
            "https://college.edu/training-and-placement",
            r#"<html><head><title>Training and Placement</title></head><body>
                <p>Our placement cell invites recruiters every year.</p>
                <a href="/docs/placements-2025.pdf">Placement statistics 2025</a>
            </body></html>"#,
        )
        .with_html(
            "https://college.edu/admissions",
            r#"<html><head><title>Admissions</title></head><body>
                <p>Admission intake and eligibility details.</p>
            </body></html>"#,
        )
        .with_html(
            "https://college.edu/library",
            r#"<html><head><title>Library</title></head><body>
                <p>The central library is open all week.</p>
            </body></html>"#,
        )
        .with_document(
            "https://college.edu/docs/placements-2025.pdf",
            "application/pdf",
            b"Placement report: Infosys - 6.5 LPA - 40 students placed, AY 2024-25".to_vec(),
        )
}

#[tokio::test]
async fn crawl_mines_placement_statistics_end_to_end() {
    let crawler = Crawler::new(college_site(), MemoryStore::new())
        .with_config(quiet_config())
        .with_documents(plain_text_documents());

    let report = crawler
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();

    assert_eq!(report.summary.total_pages, 4);
    assert_eq!(report.summary.new_pages, 4);
    assert_eq!(report.summary.documents_extracted, 1);

    let stats = report.placement_statistics.expect("placement stats mined");
    assert!(stats.company_names.contains(&"Infosys".to_string()));
    assert!(stats.salary_figures.contains(&6.5));
    assert!(stats.student_counts.contains(&40));
    assert!(stats.academic_years.contains(&"2024-25".to_string()));
    assert_eq!(stats.total_students_placed, 40);
    assert_eq!(stats.highest_package, Some(6.5));

    let placement_page = report
        .pages
        .iter()
        .find(|p| p.url.contains("training-and-placement"))
        .expect("placement page crawled");
    assert_eq!(placement_page.priority_score, 95);
    assert_eq!(placement_page.document_count, 1);
    assert!(placement_page.categories.contains_key("placements"));
}

#[tokio::test]
async fn second_run_skips_unchanged_pages() {
    let store = Arc::new(MemoryStore::new());

    let first = Crawler::new(college_site(), Arc::clone(&store))
        .with_config(quiet_config())
        .with_documents(plain_text_documents());
    let report1 = first
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();
    assert_eq!(report1.summary.new_pages, 4);
    assert_eq!(report1.summary.skipped_duplicates, 0);

    let second = Crawler::new(college_site(), Arc::clone(&store))
        .with_config(quiet_config())
        .with_documents(plain_text_documents());
    let report2 = second
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();

    assert_eq!(report2.summary.new_pages, 0);
    assert_eq!(report2.summary.updated_pages, 0);
    assert_eq!(report2.summary.skipped_duplicates, 4);
    assert!(report2.pages.is_empty());
    assert_eq!(store.page_count().await.unwrap(), 4);
}

#[tokio::test]
async fn changed_content_updates_in_place() {
    let store = Arc::new(MemoryStore::new());

    let before = MockFetcher::new().with_html(
        "https://college.edu/",
        "<html><title>News</title><body><p>Admission open</p></body></html>",
    );
    let after = MockFetcher::new().with_html(
        "https://college.edu/",
        "<html><title>News</title><body><p>Admission closed</p></body></html>",
    );

    Crawler::new(before, Arc::clone(&store))
        .with_config(quiet_config())
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();

    let report = Crawler::new(after, Arc::clone(&store))
        .with_config(quiet_config())
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();

    assert_eq!(report.summary.updated_pages, 1);
    assert_eq!(report.summary.new_pages, 0);

    let stored = store.get_page("https://college.edu/").await.unwrap().unwrap();
    assert!(stored.content.contains("Admission closed"));
}

#[tokio::test]
async fn alias_url_with_same_content_is_skipped() {
    let body = "<html><title>Fees</title><body><p>Identical fee structure text.</p></body></html>";
    let fetcher = MockFetcher::new()
        .with_html(
            "https://college.edu/",
            r#"<html><title>Home</title><body>
                <a href="/fees">Fees</a>
                <a href="/fee-structure">Fee structure</a>
            </body></html>"#,
        )
        .with_html("https://college.edu/fees", body)
        .with_html("https://college.edu/fee-structure", body);

    let crawler = Crawler::new(fetcher, MemoryStore::new()).with_config(quiet_config());
    let report = crawler
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();

    assert_eq!(report.summary.total_pages, 3);
    assert_eq!(report.summary.new_pages, 2);
    assert_eq!(report.summary.skipped_duplicates, 1);
}

#[tokio::test]
async fn page_cap_holds_on_fully_connected_graph() {
    let mut fetcher = MockFetcher::new();
    let all_links: String = (0..30)
        .map(|i| format!(r#"<a href="/node-{i}">node {i}</a>"#))
        .collect();
    for i in 0..30 {
        fetcher = fetcher.with_html(
            &format!("https://college.edu/node-{i}"),
            &format!("<html><title>Node {i}</title><body>{all_links}</body></html>"),
        );
    }
    fetcher = fetcher.with_html(
        "https://college.edu/",
        &format!("<html><title>Root</title><body>{all_links}</body></html>"),
    );

    let handle = fetcher.clone();
    let crawler = Crawler::new(fetcher, MemoryStore::new()).with_config(quiet_config());
    let report = crawler
        .run(
            CrawlRequest::new("https://college.edu")
                .with_max_pages(5)
                .with_max_depth(5),
        )
        .await
        .unwrap();

    assert_eq!(report.summary.total_pages, 5);
    assert_eq!(handle.calls().len(), 5);
}

#[tokio::test]
async fn link_budgets_bound_follow_out_per_page() {
    let mut fetcher = MockFetcher::new();
    let mut links = String::new();
    for i in 0..50 {
        links.push_str(&format!(r#"<a href="/placement-drive-{i}">drive</a>"#));
    }
    for i in 0..30 {
        links.push_str(&format!(r#"<a href="/hostel-block-{i}">hostel</a>"#));
    }
    for i in 0..20 {
        links.push_str(&format!(r#"<a href="/misc-{i}">misc</a>"#));
    }
    fetcher = fetcher.with_html(
        "https://college.edu/",
        &format!("<html><title>Root</title><body>{links}</body></html>"),
    );
    for i in 0..50 {
        fetcher = fetcher.with_html(
            &format!("https://college.edu/placement-drive-{i}"),
            "<html><body>drive page</body></html>",
        );
    }
    for i in 0..30 {
        fetcher = fetcher.with_html(
            &format!("https://college.edu/hostel-block-{i}"),
            "<html><body>hostel page</body></html>",
        );
    }
    for i in 0..20 {
        fetcher = fetcher.with_html(
            &format!("https://college.edu/misc-{i}"),
            "<html><body>misc page</body></html>",
        );
    }

    let handle = fetcher.clone();
    let crawler = Crawler::new(fetcher, MemoryStore::new()).with_config(quiet_config());
    let report = crawler
        .run(
            CrawlRequest::new("https://college.edu")
                .with_max_pages(250)
                .with_max_depth(2),
        )
        .await
        .unwrap();

    // seed + 40 high + 15 medium + 5 low
    assert_eq!(report.summary.total_pages, 61);
    assert_eq!(handle.calls().len(), 61);
}

#[tokio::test]
async fn stale_circulars_filtered_by_recency() {
    let today = chrono::Utc::now().date_naive();
    let stale = (today - chrono::Duration::days(181)).format("%d-%m-%Y");
    let fresh = (today - chrono::Duration::days(179)).format("%d-%m-%Y");

    let fetcher = MockFetcher::new()
        .with_html(
            "https://college.edu/",
            r#"<html><title>Home</title><body><a href="/circulars">Circulars</a></body></html>"#,
        )
        .with_html(
            "https://college.edu/circulars",
            r#"<html><head><title>Circulars</title></head><body>
                <p>Latest circulars and notifications.</p>
                <a href="/docs/old.pdf">Exam circular archive</a>
                <a href="/docs/new.pdf">Exam circular latest</a>
            </body></html>"#,
        )
        .with_document(
            "https://college.edu/docs/old.pdf",
            "application/pdf",
            format!("Circular dated {stale} regarding examinations").into_bytes(),
        )
        .with_document(
            "https://college.edu/docs/new.pdf",
            "application/pdf",
            format!("Circular dated {fresh} regarding examinations").into_bytes(),
        );

    let crawler = Crawler::new(fetcher, MemoryStore::new())
        .with_config(quiet_config())
        .with_documents(plain_text_documents());

    let report = crawler
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();

    let circulars_page = report
        .pages
        .iter()
        .find(|p| p.url.ends_with("/circulars"))
        .expect("circulars page crawled");

    assert_eq!(circulars_page.document_count, 1);
    let kept = &circulars_page.documents[0];
    assert!(kept.source_url.ends_with("new.pdf"));
    assert!(kept.within_recency_window);
    assert_eq!(report.summary.documents_extracted, 1);
    assert_eq!(report.summary.failed_extractions, 0);
}

#[tokio::test]
async fn spent_wall_clock_budget_stops_dispatch() {
    let handle = college_site();
    let crawler = Crawler::new(handle.clone(), MemoryStore::new()).with_config(
        quiet_config().with_wall_clock_budget(std::time::Duration::ZERO),
    );

    let report = crawler
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();

    assert_eq!(report.summary.total_pages, 0);
    assert!(handle.calls().is_empty());
}

#[tokio::test]
async fn unreachable_seed_aborts_run() {
    let crawler =
        Crawler::new(MockFetcher::new(), MemoryStore::new()).with_config(quiet_config());

    let result = crawler.run(CrawlRequest::new("https://college.edu")).await;
    assert!(matches!(result, Err(CrawlError::SeedUnreachable(_))));
}

#[tokio::test]
async fn malformed_seed_rejected_before_fetching() {
    let handle = MockFetcher::new();
    let crawler =
        Crawler::new(handle.clone(), MemoryStore::new()).with_config(quiet_config());

    let result = crawler.run(CrawlRequest::new("not a url")).await;
    assert!(matches!(result, Err(CrawlError::InvalidUrl { .. })));
    assert!(handle.calls().is_empty());
}

#[tokio::test]
async fn failed_page_fetch_is_counted_not_fatal() {
    let fetcher = MockFetcher::new()
        .with_html(
            "https://college.edu/",
            r#"<html><title>Home</title><body>
                <a href="/exists">Good</a>
                <a href="/missing">Broken</a>
            </body></html>"#,
        )
        .with_html(
            "https://college.edu/exists",
            "<html><title>Good</title><body><p>content</p></body></html>",
        );

    let crawler = Crawler::new(fetcher, MemoryStore::new()).with_config(quiet_config());
    let report = crawler
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();

    assert_eq!(report.summary.total_pages, 2);
    assert_eq!(report.summary.failed_fetches, 1);
}

#[tokio::test]
async fn depth_one_crawls_seed_only() {
    let handle = college_site();
    let crawler = Crawler::new(handle.clone(), MemoryStore::new()).with_config(quiet_config());

    let report = crawler
        .run(CrawlRequest::new("https://college.edu").with_max_depth(1))
        .await
        .unwrap();

    assert_eq!(report.summary.total_pages, 1);
    assert_eq!(handle.calls(), vec!["https://college.edu/".to_string()]);
}

#[tokio::test]
async fn report_only_run_leaves_store_untouched() {
    let store = Arc::new(MemoryStore::new());
    let crawler = Crawler::new(college_site(), Arc::clone(&store))
        .with_config(quiet_config())
        .with_documents(plain_text_documents());

    let report = crawler
        .run(CrawlRequest::new("https://college.edu").without_persistence())
        .await
        .unwrap();

    assert_eq!(report.summary.total_pages, 4);
    assert_eq!(report.pages.len(), 4);
    assert_eq!(store.page_count().await.unwrap(), 0);
}

#[tokio::test]
async fn summary_serializes_camel_case() {
    let crawler = Crawler::new(college_site(), MemoryStore::new())
        .with_config(quiet_config())
        .with_documents(plain_text_documents());

    let report = crawler
        .run(CrawlRequest::new("https://college.edu"))
        .await
        .unwrap();

    let json = serde_json::to_value(&report.summary).unwrap();
    assert!(json.get("totalPages").is_some());
    assert!(json.get("newPages").is_some());
    assert!(json.get("skippedDuplicates").is_some());
    assert!(json.get("documentsExtracted").is_some());
    assert!(json.get("categoryBreakdown").is_some());
    assert!(json.get("priorityBreakdown").is_some());

    let page = serde_json::to_value(&report.pages[0]).unwrap();
    assert!(page.get("contentHash").is_some());
    assert!(page.get("priorityScore").is_some());
    assert!(page.get("wordCount").is_some());
}

#[tokio::test]
async fn upsert_outcomes_follow_gate_order() {
    // URL-identity path and hash-identity path behave independently.
    let store = MemoryStore::new();
    let text_a = "distinct text alpha";
    let text_b = "distinct text beta";

    let record = |url: &str, text: &str| {
        let mut r = sample_record(url, text);
        r.content_hash = knowledge_crawler::ContentHash::from_text(text);
        r
    };

    // URL path: insert, skip, update
    let a1 = record("https://college.edu/a", text_a);
    assert_eq!(
        knowledge_crawler::store::upsert(&store, &a1).await.unwrap(),
        UpsertOutcome::Inserted
    );
    assert_eq!(
        knowledge_crawler::store::upsert(&store, &a1).await.unwrap(),
        UpsertOutcome::SkippedDuplicate
    );
    let a2 = record("https://college.edu/a", text_b);
    assert_eq!(
        knowledge_crawler::store::upsert(&store, &a2).await.unwrap(),
        UpsertOutcome::Updated
    );

    // Hash path: brand-new URL, already-stored content
    let alias = record("https://college.edu/alias", text_b);
    assert_eq!(
        knowledge_crawler::store::upsert(&store, &alias).await.unwrap(),
        UpsertOutcome::SkippedDuplicate
    );
}

fn sample_record(url: &str, text: &str) -> knowledge_crawler::PageRecord {
    knowledge_crawler::PageRecord {
        url: url.to_string(),
        title: "Sample".to_string(),
        content: text.to_string(),
        content_hash: knowledge_crawler::ContentHash::from_text(text),
        categories: Default::default(),
        priority_score: 0,
        word_count: text.split_whitespace().count(),
        links: vec![],
        images: vec![],
        meta_description: None,
        contact_info: Default::default(),
        has_contact_info: false,
        has_tables: false,
        document_count: 0,
        documents: vec![],
        placement_data: None,
        published_at: chrono::Utc::now(),
        extracted_at: chrono::Utc::now(),
    }
}
