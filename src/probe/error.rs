// src/probe/error.rs
// =============================================================================
// Error types for the probe engine.
//
// There are only two kinds of real errors here:
// - ValidationError: the request was bad before we touched the network
//   (empty URL, no crawlers selected, unknown crawler name). These stop
//   the batch.
// - TransportFailure: one HTTP request could not complete (DNS, connect,
//   TLS, timeout, redirect loop). These never stop the batch; the
//   orchestrator turns them into a `blocked = unknown` outcome.
//
// "possible" verdicts and undecodable bodies are NOT errors. They are
// handled as normal results.
//
// Rust concepts:
// - thiserror: derive Display + std::error::Error for our enums
// - From conversions: so `?` can turn a reqwest::Error into our type
// =============================================================================

use thiserror::Error;

/// Rejections that happen before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a URL")]
    EmptyUrl,

    #[error("Pick at least one crawler")]
    NoCrawlers,

    #[error("Unknown crawler '{0}' (run `crawler-probe list` to see the known names)")]
    UnknownCrawler(String),

    /// A `--ua` entry that isn't `NAME=USER_AGENT`
    #[error("Invalid crawler definition '{0}': expected NAME=USER_AGENT")]
    InvalidCustomCrawler(String),
}

/// Why a single HTTP request failed to produce a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("request timed out")]
    Timeout,

    #[error("too many redirects")]
    Redirect,

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportFailure {
    // reqwest wraps the interesting part (hyper / io / rustls error) in its
    // source chain, so we flatten the chain into one message first.
    //
    // Kind checks come first. The TLS keywords are only looked for in the
    // sources, because the outer message carries the URL ("/ssl-checker").
    fn from(error: reqwest::Error) -> Self {
        let detail = error_chain(&error);
        let tls = std::error::Error::source(&error).is_some_and(|cause| mentions_tls(&error_chain(cause)));

        if error.is_timeout() {
            TransportFailure::Timeout
        } else if error.is_redirect() {
            TransportFailure::Redirect
        } else if error.is_connect() {
            // rustls handshake failures surface as connect errors too
            if tls {
                TransportFailure::Tls(detail)
            } else {
                TransportFailure::Connect(detail)
            }
        } else if tls {
            TransportFailure::Tls(detail)
        } else {
            TransportFailure::Other(detail)
        }
    }
}

fn mentions_tls(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl")
}

// Joins an error and all of its sources: "outer: middle: inner"
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // hyper and reqwest sometimes repeat the inner message verbatim
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
