// src/probe/orchestrate.rs
// =============================================================================
// Runs the full probe for ONE crawler against ONE URL.
//
// How it works:
// 1. Send HEAD (cheap, no body)
// 2. If HEAD failed at the network level, or came back with status >= 400
//    (405 Method Not Allowed is the classic case), send GET instead
// 3. Classify the final response and build a ProbeOutcome
//
// If the request we end up relying on fails, the probe still returns an
// outcome: status 0, blocked = unknown, and the reason says why. One
// unreachable crawler must never take down the rest of the batch.
//
// Elapsed time is wall-clock from just before HEAD until the final response
// was read, so it includes the fallback GET when there was one.
//
// Rust concepts:
// - Generics with trait bounds: works with any `F: Fetcher`
// - Struct update syntax: FetchRequest { method: Get, ..head }
// - std::time::Instant: monotonic clock for measuring durations
// =============================================================================

use super::classify::{classify, BlockVerdict};
use super::error::TransportFailure;
use super::fetch::{FetchRequest, FetchResponse, Fetcher, ProbeMethod};
use crate::config::CrawlerIdentity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

// How much of the body we keep in the record
const BODY_SAMPLE_CHARS: usize = 500;

/// The result of one crawler's probe against one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub crawler: String,
    /// The normalized URL we requested
    pub input_url: String,
    /// Where redirects ended up
    pub final_url: String,
    /// HTTP status, or 0 when no response was received
    pub status: u16,
    pub blocked: BlockVerdict,
    pub reason: String,
    /// Only meaningful when status != 0
    pub elapsed_ms: u64,
    pub headers: BTreeMap<String, String>,
    pub body_sample: String,
}

impl ProbeOutcome {
    // The outcome for a probe that never got a usable response
    fn failed(crawler: &CrawlerIdentity, url: &str, failure: &TransportFailure) -> Self {
        Self {
            crawler: crawler.name.clone(),
            input_url: url.to_string(),
            final_url: url.to_string(),
            status: 0,
            blocked: BlockVerdict::Unknown,
            reason: format!("Fetch failed: {}", failure),
            elapsed_ms: 0,
            headers: BTreeMap::new(),
            body_sample: String::new(),
        }
    }

    fn from_response(crawler: &CrawlerIdentity, url: &str, response: FetchResponse, elapsed: Duration) -> Self {
        let verdict = classify(response.status, &response.body, &response.headers);

        Self {
            crawler: crawler.name.clone(),
            input_url: url.to_string(),
            final_url: response.final_url,
            status: response.status,
            blocked: verdict.blocked,
            reason: verdict.reason,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            headers: response.headers,
            body_sample: response.body.chars().take(BODY_SAMPLE_CHARS).collect(),
        }
    }
}

// Probes `url` as `crawler`. Never fails: transport problems become an
// `unknown` outcome.
pub async fn probe_crawler<F: Fetcher>(
    fetcher: &F,
    url: &str,
    crawler: &CrawlerIdentity,
    timeout: Duration,
) -> ProbeOutcome {
    let started = Instant::now();

    match head_then_get(fetcher, url, &crawler.user_agent, timeout).await {
        Ok(response) => {
            let outcome = ProbeOutcome::from_response(crawler, url, response, started.elapsed());
            debug!(
                crawler = %crawler.name,
                status = outcome.status,
                blocked = %outcome.blocked,
                elapsed_ms = outcome.elapsed_ms,
                "probe finished"
            );
            outcome
        }
        Err(failure) => {
            warn!(crawler = %crawler.name, url, %failure, "probe failed");
            ProbeOutcome::failed(crawler, url, &failure)
        }
    }
}

// HEAD first; GET when HEAD errors or is refused.
async fn head_then_get<F: Fetcher>(
    fetcher: &F,
    url: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<FetchResponse, TransportFailure> {
    let head = FetchRequest {
        url,
        user_agent,
        method: ProbeMethod::Head,
        timeout,
    };

    match fetcher.fetch(&head).await {
        Ok(response) if !needs_get_fallback(response.status) => return Ok(response),
        Ok(response) => debug!(status = response.status, url, "HEAD refused, retrying with GET"),
        Err(failure) => debug!(%failure, url, "HEAD failed, retrying with GET"),
    }

    let get = FetchRequest {
        method: ProbeMethod::Get,
        ..head
    };
    fetcher.fetch(&get).await
}

// Some servers reject HEAD outright (405) or answer HEAD differently from
// GET, so any error status gets a second opinion from GET.
fn needs_get_fallback(status: u16) -> bool {
    status >= 400
}
