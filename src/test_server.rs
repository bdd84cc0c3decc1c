// src/test_server.rs
// =============================================================================
// A tiny local HTTP server for tests (compiled only under `cargo test`).
//
// Each test hands in a closure that decides how to answer a request. The
// server records every request it sees, so tests can assert on the method,
// path, and headers the probe sent.
//
// Binding to 127.0.0.1:0 lets the OS pick a free port, so tests can run in
// parallel without stepping on each other.
// =============================================================================

use axum::body::Body;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::Response;
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the server saw for one request
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// How the server should answer
pub struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    delay: Duration,
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Handler = Arc<dyn Fn(&SeenRequest) -> Reply + Send + Sync>;

pub struct TestServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl TestServer {
    pub async fn start<F>(handler: F) -> TestServer
    where
        F: Fn(&SeenRequest) -> Reply + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let app = Router::new().fallback(move |method: Method, uri: Uri, headers: HeaderMap| {
            let handler = Arc::clone(&handler);
            let recorder = Arc::clone(&recorder);
            async move {
                let request = SeenRequest {
                    method: method.to_string(),
                    path: uri
                        .path_and_query()
                        .map(|pq| pq.to_string())
                        .unwrap_or_else(|| uri.path().to_string()),
                    headers: headers
                        .iter()
                        .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).to_string()))
                        .collect(),
                };
                recorder.lock().unwrap().push(request.clone());

                let reply = handler(&request);
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }

                let mut builder = Response::builder().status(StatusCode::from_u16(reply.status).unwrap());
                for (name, value) in &reply.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.body(Body::from(reply.body)).unwrap()
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base_url: format!("http://{}", addr),
            seen,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}
