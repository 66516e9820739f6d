//! Shared test helpers

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use descriptor_fill::{
    FillRequest, FillTransport, LoadError, LoaderConfig, RawResponse, Result,
};

pub const DESCRIPTOR: &str = "com.synopsys.integration.coverity.post.CoverityPostBuildStep";
pub const ROOT_URL: &str = "http://ci.example.com/jenkins";

/// Assert that an `Option` is `Some` and unwrap it.
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert that a `Result` is `Ok` and unwrap it.
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

pub fn test_config() -> LoaderConfig {
    LoaderConfig::new(ROOT_URL, DESCRIPTOR)
}

/// Fill URL for `operation` under the test config.
pub fn fill_url(operation: &str) -> String {
    format!("{ROOT_URL}/descriptor/{DESCRIPTOR}/{operation}")
}

/// `{ "values": [...] }` body from `(name, value, selected)` triples.
pub fn values_body(options: &[(&str, &str, bool)]) -> String {
    let values: Vec<serde_json::Value> = options
        .iter()
        .map(|(name, value, selected)| {
            serde_json::json!({ "name": name, "value": value, "selected": selected })
        })
        .collect();
    serde_json::json!({ "values": values }).to_string()
}

enum Reply {
    Response(RawResponse),
    Error(LoadError),
}

struct Scripted {
    delay: Duration,
    reply: Reply,
}

/// Transport answering from a per-endpoint script and recording every request.
///
/// Replies are keyed by the last URL segment (the fill operation) and consumed in
/// order. An endpoint with nothing scripted answers 404.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<FillRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, operation: &str, delay: Duration, reply: Reply) {
        self.script
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(Scripted { delay, reply });
    }

    pub fn respond(&self, operation: &str, status: u16, body: impl Into<String>) {
        self.respond_after(operation, Duration::ZERO, status, body);
    }

    pub fn respond_after(
        &self,
        operation: &str,
        delay: Duration,
        status: u16,
        body: impl Into<String>,
    ) {
        self.push(
            operation,
            delay,
            Reply::Response(RawResponse::new(status, body)),
        );
    }

    pub fn fail(&self, operation: &str, error: LoadError) {
        self.push(operation, Duration::ZERO, Reply::Error(error));
    }

    pub fn requests(&self) -> Vec<FillRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, operation: &str) -> Vec<FillRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with(&format!("/{operation}")))
            .collect()
    }
}

#[async_trait]
impl FillTransport for MockTransport {
    async fn send(&self, request: &FillRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let operation = request.url.rsplit('/').next().unwrap_or_default().to_string();
        let scripted = self
            .script
            .lock()
            .unwrap()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);

        let Some(scripted) = scripted else {
            return Ok(RawResponse::new(404, "no script"));
        };
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        match scripted.reply {
            Reply::Response(resp) => Ok(resp),
            Reply::Error(e) => Err(e),
        }
    }
}
