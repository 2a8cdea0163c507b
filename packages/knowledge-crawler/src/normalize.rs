//! URL normalization for crawl-target identity.
//!
//! Two URLs that normalize identically are the same crawl target. The
//! `url` crate already lowercases scheme and host and drops default ports
//! on parse; this module adds fragment stripping and trailing-slash
//! trimming, and rejects non-HTTP schemes.

use url::Url;

use crate::error::{CrawlError, CrawlResult};

/// Normalize a raw URL string. Fails with `InvalidUrl` on malformed input
/// or non-HTTP schemes.
pub fn normalize(input: &str) -> CrawlResult<String> {
    let url = Url::parse(input).map_err(|_| CrawlError::InvalidUrl {
        url: input.to_string(),
    })?;
    normalize_url(&url)
}

/// Normalize an already-parsed URL.
pub fn normalize_url(url: &Url) -> CrawlResult<String> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CrawlError::InvalidUrl {
            url: url.to_string(),
        });
    }

    let mut url = url.clone();
    url.set_fragment(None);

    let mut normalized = url.to_string();
    // Trim a single trailing slash, root path excepted.
    if normalized.ends_with('/') && url.path() != "/" {
        normalized.pop();
    }

    Ok(normalized)
}

/// True when `host` is the seed host or one of its subdomains.
pub fn in_scope(host: &str, seed_host: &str) -> bool {
    let host = host.to_lowercase();
    let seed_host = seed_host.to_lowercase();
    host == seed_host || host.ends_with(&format!(".{seed_host}"))
}
