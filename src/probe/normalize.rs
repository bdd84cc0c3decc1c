// src/probe/normalize.rs
// =============================================================================
// Turns whatever the user typed into an absolute URL we can probe.
//
// Rules:
// - Trim whitespace; empty input stays empty (the batch runner rejects it)
// - "example.com" or "example.com/page" (no scheme) -> "https://example.com..."
// - "//example.com" (scheme-relative) -> "https://example.com"
// - A URL with a scheme keeps it: "http://..." is NOT upgraded to https
// - Default ports are dropped, path and query are kept
// - No trailing "/" is invented when the user didn't type a path
//
// No network access happens here.
//
// Rust concepts:
// - url::Url and url::Position: parse once, then slice the serialized URL
// - Early returns for the simple cases
// =============================================================================

use url::{Position, Url};

// The scheme we assume when the user didn't type one
const DEFAULT_SCHEME: &str = "https";

pub fn normalize_url(raw: &str) -> String {
    let input = raw.trim();
    if input.is_empty() {
        return String::new();
    }

    // "//example.com/x" has a host but no scheme
    if input.starts_with("//") {
        return normalize_url(&format!("{}:{}", DEFAULT_SCHEME, input));
    }

    let parsed = match Url::parse(input) {
        Ok(url) => url,
        // "example.com" is a relative URL to the parser: treat it as a bare host
        Err(_) => return bare_host(input),
    };

    // Things like "localhost:8080" parse with "localhost" as the scheme and
    // no host at all. Those are bare hosts as well.
    if !has_real_host(&parsed) {
        return bare_host(input);
    }

    serialize(input, &parsed)
}

// Prefixes the default scheme, then serializes like any other URL so the
// default port goes away here too. The query is kept.
fn bare_host(input: &str) -> String {
    let candidate = format!("{}://{}", DEFAULT_SCHEME, input);
    match Url::parse(&candidate) {
        Ok(parsed) if has_real_host(&parsed) => serialize(&candidate, &parsed),
        _ => candidate,
    }
}

fn has_real_host(parsed: &Url) -> bool {
    parsed.host_str().is_some_and(|host| !host.is_empty())
}

fn serialize(input: &str, parsed: &Url) -> String {
    if typed_a_path(input) {
        parsed.to_string()
    } else {
        // The url crate always serializes an empty path as "/". Drop it so
        // "https://example.com" round-trips unchanged.
        format!("{}{}", &parsed[..Position::BeforePath], &parsed[Position::AfterPath..])
    }
}

// Did the user type anything after the authority ("host[:port]")?
fn typed_a_path(input: &str) -> bool {
    let after_scheme = match input.find("://") {
        Some(index) => &input[index + 3..],
        None => input,
    };
    let authority_end = after_scheme
        .find(|c| c == '/' || c == '?' || c == '#')
        .unwrap_or(after_scheme.len());
    after_scheme[authority_end..].starts_with('/')
}
