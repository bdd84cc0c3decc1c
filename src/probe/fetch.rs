// src/probe/fetch.rs
// =============================================================================
// Sends exactly ONE HTTP request as a given crawler and reports what came back.
//
// Key functionality:
// - HEAD or GET with the crawler's user-agent plus a few fixed headers
// - Redirects are followed by reqwest; we only look at the final response
// - GET reads the whole body; HEAD never has one
// - Body bytes are decoded as UTF-8, silently dropping invalid sequences
// - Network / DNS / TLS / timeout problems come back as TransportFailure
//
// The HEAD-then-GET decision is NOT made here; see orchestrate.rs.
//
// The `Fetcher` trait is the seam between the probe logic and the network,
// so the orchestrator can be tested with a scripted fetcher.
//
// Rust concepts:
// - Traits with async fn: an interface whose methods are async
// - BTreeMap: sorted map, so headers print in a stable order
// - Lifetimes on structs: FetchRequest<'a> borrows its strings
// =============================================================================

use super::error::TransportFailure;
use reqwest::header::{HeaderMap, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT};
use reqwest::{redirect, Client};
use std::collections::BTreeMap;
use std::time::Duration;

// Same limit reqwest uses by default, spelled out so it's visible
const MAX_REDIRECTS: usize = 10;

/// The two methods a probe ever uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

impl ProbeMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            ProbeMethod::Head => reqwest::Method::HEAD,
            ProbeMethod::Get => reqwest::Method::GET,
        }
    }
}

/// Everything needed to send one request
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub user_agent: &'a str,
    pub method: ProbeMethod,
    /// Applies to this request only (HEAD and a fallback GET each get the full amount)
    pub timeout: Duration,
}

/// The final (post-redirect) response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub final_url: String,
    /// Header name -> value; repeated headers joined with ", "
    pub headers: BTreeMap<String, String>,
    /// Decoded body text, empty for HEAD
    pub body: String,
}

// Anything that can perform a single probe request.
//
// The real implementation is HttpFetcher; tests use a scripted one.
// Only used inside this binary, so the missing `Send` bound on the returned
// futures is fine.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<FetchResponse, TransportFailure>;
}

// The real fetcher, backed by a reqwest Client.
//
// One client is shared by every probe in a batch. reqwest pools connections
// inside the client, but the user-agent and other headers are set on each
// request, so crawler identities never leak into each other.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<FetchResponse, TransportFailure> {
        let response = self
            .client
            .request(request.method.as_reqwest(), request.url)
            .header(USER_AGENT, request.user_agent)
            .header(ACCEPT, "*/*")
            .header(ACCEPT_LANGUAGE, "en")
            .header(CACHE_CONTROL, "no-cache")
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = flatten_headers(response.headers());

        // HEAD responses have no body by definition
        let body = match request.method {
            ProbeMethod::Get => decode_text(&response.bytes().await?),
            ProbeMethod::Head => String::new(),
        };

        Ok(FetchResponse {
            status,
            final_url,
            headers,
            body,
        })
    }
}

// Flattens a HeaderMap into name -> "value1, value2"
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|value| decode_text(value.as_bytes()))
            .collect::<Vec<_>>()
            .join(", ");
        flat.insert(name.as_str().to_string(), joined);
    }
    flat
}

// Best-effort UTF-8 decode: invalid byte sequences are dropped, never an error.
pub fn decode_text(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait for something with one real implementation?
//    - The orchestrator only needs "something that can fetch"
//    - Tests can plug in a fake that returns canned responses and counts calls
//    - No network needed to test the HEAD/GET fallback rules
//
// 2. What does `?` do on a reqwest::Error here?
//    - Our function returns Result<_, TransportFailure>
//    - `impl From<reqwest::Error> for TransportFailure` (in error.rs) lets `?`
//      convert the error automatically
//
// 3. Why utf8_chunks() instead of String::from_utf8()?
//    - from_utf8() fails on the first bad byte
//    - utf8_chunks() walks the bytes and hands us every valid piece, so a
//      page with a stray byte still gives us readable text
// -----------------------------------------------------------------------------
