// src/probe/mod.rs
// =============================================================================
// The probe-and-classify engine.
//
// Submodules, leaves first:
// - normalize: turns user input into an absolute URL
// - fetch: sends one HTTP request as a crawler (the Fetcher trait)
// - classify: decides whether a response looks blocked
// - orchestrate: HEAD, GET fallback, timing, and failure containment per crawler
// - batch: runs every crawler concurrently and keeps the run history
// - error: ValidationError and TransportFailure
//
// Everything outside this module goes through the re-exports below.
// =============================================================================

mod batch;
mod classify;
mod error;
mod fetch;
mod normalize;
mod orchestrate;

#[cfg(test)]
pub(crate) mod scripted;

pub use batch::{run_batch, RunHistory};
pub use classify::BlockVerdict;
pub use error::{TransportFailure, ValidationError};
pub use fetch::{decode_text, Fetcher, HttpFetcher};
pub use normalize::normalize_url;
pub use orchestrate::ProbeOutcome;
