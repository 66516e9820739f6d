//! HTTP helpers shared by the transport
//!
//! One place to send a request, log it, classify transport failures and read the body.
//! Status interpretation is left to the caller: a non-2xx answer is still a response.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::LoadError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Status line and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Canonical reason phrase, empty when the status has none.
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: canonical_reason(status).to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Reason phrase for a status code, empty when unknown.
pub(crate) fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request and read the whole body.
    ///
    /// # Returns
    /// * `Ok(RawResponse)` for any status the server answered with
    /// * `Err(LoadError::Timeout)` when the transport timed out
    /// * `Err(LoadError::Network)` for every other transport failure
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
    ) -> Result<RawResponse, LoadError> {
        log::debug!("{method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Timeout {
                    url: url.to_string(),
                    detail: e.to_string(),
                }
            } else {
                LoadError::Network {
                    url: url.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        log::debug!("Response Status: {status} ({url})");

        let body = response.text().await.map_err(|e| LoadError::Network {
            url: url.to_string(),
            detail: format!("Failed to read response body: {e}"),
        })?;

        log::debug!("Response Body: {}", truncate_for_log(&body));

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }

    /// Parse a JSON body into `T`.
    pub fn parse_json<T>(body: &str, url: &str) -> Result<T, LoadError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            log::error!("JSON parse failed for {url}: {e}");
            log::error!("Raw response: {}", truncate_for_log(body));
            LoadError::Parse {
                url: url.to_string(),
                detail: e.to_string(),
            }
        })
    }
}
