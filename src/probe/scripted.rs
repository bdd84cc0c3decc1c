// src/probe/scripted.rs
// =============================================================================
// A fake Fetcher for tests (compiled only under `cargo test`).
//
// The test supplies a closure that answers each request, and the fetcher
// records every (method, user-agent) pair it was asked for. Per-user-agent
// delays let batch tests make probes finish out of order.
// =============================================================================

use super::error::TransportFailure;
use super::fetch::{FetchRequest, FetchResponse, Fetcher, ProbeMethod};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

type Responder = Box<dyn Fn(&FetchRequest<'_>) -> Result<FetchResponse, TransportFailure> + Send + Sync>;

pub struct ScriptedFetcher {
    respond: Responder,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(ProbeMethod, String)>>,
}

impl ScriptedFetcher {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&FetchRequest<'_>) -> Result<FetchResponse, TransportFailure> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every request from `user_agent` take `delay`
    pub fn with_delay(mut self, user_agent: &str, delay: Duration) -> Self {
        self.delays.insert(user_agent.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<(ProbeMethod, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<ProbeMethod> {
        self.calls().into_iter().map(|(method, _)| method).collect()
    }
}

impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<FetchResponse, TransportFailure> {
        self.calls
            .lock()
            .unwrap()
            .push((request.method, request.user_agent.to_string()));

        if let Some(delay) = self.delays.get(request.user_agent) {
            tokio::time::sleep(*delay).await;
        }

        (self.respond)(request)
    }
}

/// A response with no headers
pub fn response(url: &str, status: u16, body: &str) -> FetchResponse {
    FetchResponse {
        status,
        final_url: url.to_string(),
        headers: BTreeMap::new(),
        body: body.to_string(),
    }
}
