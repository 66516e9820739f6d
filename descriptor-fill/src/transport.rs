use async_trait::async_trait;
use reqwest::Client;

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::http_client::{HttpUtils, RawResponse};
use crate::types::{FillRequest, HttpMethod};

/// Sends a fill request and returns whatever the server answered.
///
/// Implementations report transport failures as errors and every HTTP status,
/// including non-2xx, as a [`RawResponse`].
#[async_trait]
pub trait FillTransport: Send + Sync {
    async fn send(&self, request: &FillRequest) -> Result<RawResponse>;
}

/// reqwest-backed transport.
pub struct HttpFillTransport {
    client: Client,
}

impl HttpFillTransport {
    /// Build a client with the timeouts from `config`.
    ///
    /// Fails unless `root_url` is an absolute `http(s)://` URL; reqwest has no origin to
    /// resolve a root-relative one against.
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        if !config.has_absolute_root() {
            return Err(LoadError::InvalidConfig(format!(
                "HTTP transport needs an absolute rootUrl, got '{}'",
                config.root_url.trim()
            )));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LoadError::InvalidConfig(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Reuse an existing client (shared connection pool, custom headers).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FillTransport for HttpFillTransport {
    async fn send(&self, request: &FillRequest) -> Result<RawResponse> {
        let pairs = request.params.to_pairs();
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url).query(&pairs),
            HttpMethod::Post => self.client.post(&request.url).form(&pairs),
        };
        HttpUtils::execute_request(builder, request.method.as_str(), &request.url).await
    }
}
