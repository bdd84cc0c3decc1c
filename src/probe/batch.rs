// src/probe/batch.rs
// =============================================================================
// Probes one URL with every selected crawler at the same time.
//
// How it works:
// 1. Validate: a non-empty URL and at least one crawler, else nothing is sent
// 2. Start one probe per crawler, all running concurrently
// 3. Wait for ALL of them (failures included, see orchestrate.rs)
// 4. Append the outcomes to the RunHistory in the order the crawlers were
//    listed, not the order they finished
//
// The history is only touched after every probe has finished, so probes
// never race each other for it.
//
// Rust concepts:
// - futures::stream + buffered(): run N futures concurrently but yield the
//   results in the original order
// - &mut borrows: the caller owns the history, we just append to it
// =============================================================================

use super::error::ValidationError;
use super::fetch::Fetcher;
use super::orchestrate::{probe_crawler, ProbeOutcome};
use crate::config::CrawlerIdentity;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::info;

/// Every outcome produced during a session, oldest first. Append-only.
#[derive(Debug, Default, Clone)]
pub struct RunHistory {
    outcomes: Vec<ProbeOutcome>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    // Appends a batch and hands back just the new slice
    fn append_batch(&mut self, batch: Vec<ProbeOutcome>) -> &[ProbeOutcome] {
        let start = self.outcomes.len();
        self.outcomes.extend(batch);
        &self.outcomes[start..]
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Oldest first, the order outcomes were appended
    #[cfg(test)]
    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    /// Most recent first, the order results are displayed and exported in
    pub fn latest_first(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().rev()
    }
}

// Runs one batch and appends it to `history`.
//
// `url` should already be normalized (see normalize.rs). Returns the slice
// of outcomes this batch added, one per crawler, in `crawlers` order.
pub async fn run_batch<'h, F: Fetcher>(
    fetcher: &F,
    url: &str,
    crawlers: &[CrawlerIdentity],
    timeout: Duration,
    history: &'h mut RunHistory,
) -> Result<&'h [ProbeOutcome], ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if crawlers.is_empty() {
        return Err(ValidationError::NoCrawlers);
    }

    info!(url, crawlers = crawlers.len(), "starting batch");

    let probes = crawlers
        .iter()
        .map(|crawler| probe_crawler(fetcher, url, crawler, timeout));

    // buffered() polls every probe at once (the limit equals the batch size)
    // and yields results in input order
    let outcomes: Vec<ProbeOutcome> = stream::iter(probes)
        .buffered(crawlers.len())
        .collect()
        .await;

    info!(url, outcomes = outcomes.len(), "batch finished");

    Ok(history.append_batch(outcomes))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. buffered() vs buffer_unordered()
//    - Both run up to N futures at the same time
//    - buffer_unordered() yields results as they complete
//    - buffered() yields them in the order the futures were created
//    - We want the crawler order the user typed, so buffered() it is
//
// 2. Why no tokio::spawn?
//    - The stream polls all probes on the current task; while one probe
//      waits on the network, the others make progress
//    - No 'static or Send bounds needed, so probes can borrow the fetcher
//
// 3. What is the 'h lifetime?
//    - The returned slice points into `history`
//    - 'h tells the compiler the slice lives as long as that borrow
// -----------------------------------------------------------------------------
