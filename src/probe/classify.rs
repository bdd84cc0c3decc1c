// src/probe/classify.rs
// =============================================================================
// Decides whether a response looks like the site blocked the crawler.
//
// This is a pure function: same (status, body, headers) in, same verdict
// out. No I/O, no state. Rules are checked in order and the first match wins:
//
// 1. Explicit denial status codes (403, 429, 451, ...)   -> blocked = true
// 2. Challenge / bot-mitigation text in the body         -> blocked = possible
// 3. An x-robots-tag header (informational only)         -> blocked = false
// 4. Anything else                                       -> blocked = false
//
// Rule 2 exists because mitigation services (Cloudflare, Akamai, ...) often
// answer with HTTP 200 and a JavaScript challenge page.
//
// Rust concepts:
// - Enums with serde renames: the verdict serializes as "true"/"possible"/...
// - Iterator adapters: .any(), .chars().take()
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Status codes that mean "you are not welcome here"
pub const BLOCK_STATUSES: [u16; 8] = [401, 403, 405, 406, 409, 410, 429, 451];

// Lower-case phrases that show up on challenge and denial pages
const CHALLENGE_MARKERS: [&str; 8] = [
    "access denied",
    "forbidden",
    "not authorized",
    "verify you are human",
    "cloudflare",
    "akamai",
    "perimeterx",
    "attention required",
];

// Only the start of the body is scanned
const BODY_SCAN_CHARS: usize = 2000;

/// The block verdict for one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockVerdict {
    /// An explicit denial status code
    #[serde(rename = "true")]
    Blocked,
    /// Challenge text in the body; a suspicion, not a certainty
    #[serde(rename = "possible")]
    Possible,
    /// Nothing suggests the crawler was blocked
    #[serde(rename = "false")]
    NotBlocked,
    /// The probe never got a response
    #[serde(rename = "unknown")]
    Unknown,
}

impl BlockVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockVerdict::Blocked => "true",
            BlockVerdict::Possible => "possible",
            BlockVerdict::NotBlocked => "false",
            BlockVerdict::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BlockVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verdict plus the human-readable reason for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub blocked: BlockVerdict,
    pub reason: String,
}

impl Classification {
    fn new(blocked: BlockVerdict, reason: impl Into<String>) -> Self {
        Self {
            blocked,
            reason: reason.into(),
        }
    }
}

pub fn classify(status: u16, body: &str, headers: &BTreeMap<String, String>) -> Classification {
    if BLOCK_STATUSES.contains(&status) {
        return Classification::new(BlockVerdict::Blocked, format!("HTTP {}", status));
    }

    if has_challenge_text(body) {
        return Classification::new(BlockVerdict::Possible, "Challenge / mitigation text detected");
    }

    if headers.keys().any(|name| name.eq_ignore_ascii_case("x-robots-tag")) {
        return Classification::new(BlockVerdict::NotBlocked, "x-robots-tag present (informational)");
    }

    Classification::new(BlockVerdict::NotBlocked, "OK")
}

fn has_challenge_text(body: &str) -> bool {
    // Character-based cut so we never split a multi-byte character
    let excerpt: String = body.chars().take(BODY_SCAN_CHARS).collect();
    let lowered = excerpt.to_lowercase();
    CHALLENGE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_headers() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn test_block_statuses_always_block() {
        let mut headers = BTreeMap::new();
        headers.insert("x-robots-tag".to_string(), "noindex".to_string());

        for status in BLOCK_STATUSES {
            let result = classify(status, "Cloudflare says hi", &headers);
            assert_eq!(result.blocked, BlockVerdict::Blocked, "status {}", status);
            assert_eq!(result.reason, format!("HTTP {}", status));
        }
    }

    #[test]
    fn test_cloudflare_any_case_is_possible() {
        for body in ["Cloudflare", "CLOUDFLARE ray id", "<title>cloudflare</title>"] {
            let result = classify(200, body, &no_headers());
            assert_eq!(result.blocked, BlockVerdict::Possible);
            assert_eq!(result.reason, "Challenge / mitigation text detected");
        }
    }

    #[test]
    fn test_every_marker_is_detected() {
        for marker in CHALLENGE_MARKERS {
            let body = format!("<html><body>{}</body></html>", marker.to_uppercase());
            assert_eq!(classify(200, &body, &no_headers()).blocked, BlockVerdict::Possible);
        }
    }

    #[test]
    fn test_marker_past_scan_window_is_ignored() {
        let body = format!("{}access denied", "a".repeat(BODY_SCAN_CHARS));
        let result = classify(200, &body, &no_headers());
        assert_eq!(result.blocked, BlockVerdict::NotBlocked);
        assert_eq!(result.reason, "OK");
    }

    #[test]
    fn test_scan_window_counts_characters_not_bytes() {
        // Two-byte characters plus the marker fill the window exactly
        let body = format!("{}forbidden", "é".repeat(BODY_SCAN_CHARS - 9));
        assert_eq!(classify(200, &body, &no_headers()).blocked, BlockVerdict::Possible);
    }

    #[test]
    fn test_x_robots_tag_is_informational() {
        let mut headers = BTreeMap::new();
        headers.insert("X-Robots-Tag".to_string(), "noindex".to_string());

        let result = classify(200, "<html>hello</html>", &headers);
        assert_eq!(result.blocked, BlockVerdict::NotBlocked);
        assert_eq!(result.reason, "x-robots-tag present (informational)");
    }

    #[test]
    fn test_plain_ok() {
        let result = classify(200, "<html>welcome</html>", &no_headers());
        assert_eq!(result, Classification::new(BlockVerdict::NotBlocked, "OK"));
    }

    #[test]
    fn test_other_error_statuses_fall_through() {
        // 404 and 500 aren't denial codes
        assert_eq!(classify(404, "", &no_headers()).blocked, BlockVerdict::NotBlocked);
        assert_eq!(classify(500, "", &no_headers()).blocked, BlockVerdict::NotBlocked);
    }

    #[test]
    fn test_classification_is_repeatable() {
        let mut headers = BTreeMap::new();
        headers.insert("server".to_string(), "nginx".to_string());
        let first = classify(200, "Attention Required!", &headers);
        let second = classify(200, "Attention Required!", &headers);
        assert_eq!(first, second);
    }

    #[test]
    fn test_verdict_serializes_as_strings() {
        assert_eq!(serde_json::to_string(&BlockVerdict::Blocked).unwrap(), "\"true\"");
        assert_eq!(serde_json::to_string(&BlockVerdict::Possible).unwrap(), "\"possible\"");
        assert_eq!(serde_json::to_string(&BlockVerdict::NotBlocked).unwrap(), "\"false\"");
        assert_eq!(serde_json::to_string(&BlockVerdict::Unknown).unwrap(), "\"unknown\"");
    }
}
