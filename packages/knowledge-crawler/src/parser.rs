//! HTML page parsing.
//!
//! Produces the structured view of a fetched page: title, cleaned body
//! text (chrome stripped, length capped), resolved links and images,
//! document links, table presence, contact info and a best-effort
//! publish date.

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::documents::{DocumentKind, DocumentLink};
use crate::documents::dates;
use crate::types::ContactInfo;

/// Contact list caps, matching what the store schema expects.
const MAX_CONTACTS: usize = 10;

/// Elements removed before body-text extraction. Links are still taken from
/// the full document so navigation keeps feeding the frontier.
const CHROME_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header", "iframe"];

/// Page-link extensions that are neither pages nor extractable documents.
const SKIPPED_EXTENSIONS: &[&str] = &[
    ".zip", ".rar", ".exe", ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx",
];

/// A resolved anchor with its visible text.
#[derive(Debug, Clone)]
pub struct DiscoveredLink {
    pub url: Url,
    pub anchor_text: String,
}

/// Structured view of one parsed page.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub title: String,
    pub meta_description: Option<String>,
    pub text: String,
    pub links: Vec<DiscoveredLink>,
    pub images: Vec<Url>,
    pub document_links: Vec<DocumentLink>,
    pub has_tables: bool,
    pub contact_info: ContactInfo,
    /// Publish/update date from meta tags or visible text; the crawl time
    /// when nothing better is found.
    pub published_at: DateTime<Utc>,
}

/// Parse a fetched HTML body relative to its base URL.
///
/// Never fails: an unparseable body degrades to an empty page whose link
/// extraction is still attempted over whatever the tree recovered.
pub fn parse(html: &str, base_url: &Url, max_text_chars: usize) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document)
        .unwrap_or_else(|| base_url.path().trim_matches('/').to_string());
    let meta_description = extract_meta(&document, "meta[name=\"description\"]");

    let text = extract_body_text(html, max_text_chars);

    let mut links = Vec::new();
    let mut document_links = Vec::new();
    let anchor_selector = Selector::parse("a[href]").expect("valid selector");
    for element in document.select(&anchor_selector) {
        let href = match element.value().attr("href") {
            Some(href) => href.trim(),
            None => continue,
        };
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }
        let resolved = match base_url.join(href) {
            Ok(url) => url,
            Err(_) => continue,
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }

        let anchor_text = element.text().collect::<String>().trim().to_string();
        let anchor_text = if anchor_text.is_empty() {
            last_path_segment(&resolved)
        } else {
            anchor_text
        };

        if let Some(kind) = DocumentKind::from_url(&resolved) {
            document_links.push(DocumentLink {
                url: resolved,
                anchor_text,
                kind,
                // scored by the crawler once the page priority is known
                priority: 0,
            });
            continue;
        }

        let path = resolved.path().to_lowercase();
        if SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            continue;
        }

        links.push(DiscoveredLink {
            url: resolved,
            anchor_text,
        });
    }

    let mut images = Vec::new();
    let img_selector = Selector::parse("img[src]").expect("valid selector");
    for element in document.select(&img_selector) {
        if let Some(src) = element.value().attr("src") {
            if let Ok(resolved) = base_url.join(src.trim()) {
                if matches!(resolved.scheme(), "http" | "https") {
                    images.push(resolved);
                }
            }
        }
    }

    let table_selector = Selector::parse("table").expect("valid selector");
    let has_tables = document.select(&table_selector).next().is_some();

    let contact_info = extract_contact_info(&text);

    let published_at = extract_published_at(&document, &text).unwrap_or_else(Utc::now);

    ParsedPage {
        title,
        meta_description,
        text,
        links,
        images,
        document_links,
        has_tables,
        contact_info,
        published_at,
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").expect("valid selector");
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn extract_meta(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).expect("valid selector");
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Strip chrome subtrees, then collapse the remaining text.
fn extract_body_text(html: &str, max_text_chars: usize) -> String {
    let mut stripped = html.to_string();
    for element in CHROME_ELEMENTS {
        let pattern = Regex::new(&format!(r"(?is)<{element}[\s>].*?</{element}\s*>")).unwrap();
        stripped = pattern.replace_all(&stripped, " ").to_string();
    }

    let document = Html::parse_document(&stripped);
    let body_selector = Selector::parse("body").expect("valid selector");
    let text: String = match document.select(&body_selector).next() {
        Some(body) => body.text().collect::<Vec<_>>().join(" "),
        None => document.root_element().text().collect::<Vec<_>>().join(" "),
    };

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_text_chars).collect()
}

fn extract_contact_info(text: &str) -> ContactInfo {
    let email_pattern =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    let phone_pattern =
        Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap();

    let mut emails: Vec<String> = Vec::new();
    for m in email_pattern.find_iter(text) {
        let email = m.as_str().to_string();
        if !emails.contains(&email) {
            emails.push(email);
        }
        if emails.len() >= MAX_CONTACTS {
            break;
        }
    }

    let mut phones: Vec<String> = Vec::new();
    for m in phone_pattern.find_iter(text) {
        let phone = m.as_str().trim().to_string();
        if !phones.contains(&phone) {
            phones.push(phone);
        }
        if phones.len() >= MAX_CONTACTS {
            break;
        }
    }

    ContactInfo { emails, phones }
}

fn extract_published_at(document: &Html, text: &str) -> Option<DateTime<Utc>> {
    for selector in [
        "meta[property=\"article:published_time\"]",
        "meta[name=\"date\"]",
        "meta[name=\"last-modified\"]",
    ] {
        if let Some(raw) = extract_meta(document, selector) {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
                return Some(parsed.with_timezone(&Utc));
            }
            if let Some(date) = dates::detect_date(&raw) {
                return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
            }
        }
    }

    dates::detect_date(text).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc())
}

fn last_path_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .unwrap_or("link")
        .to_string()
}
