// src/robots.rs
// =============================================================================
// Fetches a site's robots.txt so the user can read it next to the results.
//
// This is informational only. We never parse the rules and they never
// change a block verdict.
//
// Caching:
// - Results are cached per site ("scheme://host[:port]") for 10 minutes
// - Error placeholders are cached too, so a dead site isn't hammered on
//   every command in a session
//
// Rust concepts:
// - moka::sync::Cache: a concurrent map whose entries expire on their own
// - let-else: bail out early when a value is missing
// =============================================================================

use crate::probe::{decode_text, normalize_url, TransportFailure};
use moka::sync::Cache;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::{Position, Url};

const ROBOTS_TTL: Duration = Duration::from_secs(600);
const ROBOTS_TIMEOUT: Duration = Duration::from_secs(10);
const ROBOTS_USER_AGENT: &str = "Mozilla/5.0";
const ROBOTS_MAX_CHARS: usize = 10_000;
const MAX_CACHED_SITES: u64 = 1_000;

pub struct RobotsCache {
    client: Client,
    cache: Cache<String, String>,
}

impl RobotsCache {
    pub fn new() -> Result<Self, TransportFailure> {
        Self::with_ttl(ROBOTS_TTL)
    }

    fn with_ttl(ttl: Duration) -> Result<Self, TransportFailure> {
        let client = Client::builder().timeout(ROBOTS_TIMEOUT).build()?;
        let cache = Cache::builder()
            .max_capacity(MAX_CACHED_SITES)
            .time_to_live(ttl)
            .build();
        Ok(Self { client, cache })
    }

    // Returns robots.txt text, or a "(HTTP 404)" / "(Error: ...)" placeholder.
    pub async fn fetch(&self, raw_url: &str) -> String {
        let Some(base) = site_base(raw_url) else {
            return format!("(Error: '{}' is not a valid URL)", raw_url.trim());
        };

        if let Some(cached) = self.cache.get(&base) {
            debug!(site = %base, "robots.txt cache hit");
            return cached;
        }

        let text = self.download(&base).await;
        self.cache.insert(base, text.clone());
        text
    }

    async fn download(&self, base: &str) -> String {
        let robots_url = format!("{}/robots.txt", base);
        debug!(url = %robots_url, "fetching robots.txt");

        let response = match self
            .client
            .get(&robots_url)
            .header(USER_AGENT, ROBOTS_USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return format!("(Error: {})", TransportFailure::from(e)),
        };

        let status = response.status().as_u16();
        if status >= 400 {
            return format!("(HTTP {})", status);
        }

        match response.bytes().await {
            Ok(body) => decode_text(&body).chars().take(ROBOTS_MAX_CHARS).collect(),
            Err(e) => format!("(Error: {})", TransportFailure::from(e)),
        }
    }
}

// "example.com/some/page" -> "https://example.com"
fn site_base(raw_url: &str) -> Option<String> {
    let url = Url::parse(&normalize_url(raw_url)).ok()?;
    if !url.has_host() {
        return None;
    }
    Some(url[..Position::BeforePath].to_string())
}
