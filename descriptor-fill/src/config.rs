//! Loader configuration
//!
//! Replaces the page-global root URL with an explicit value handed to the loader.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};
use crate::types::{FillOperation, HttpMethod};

/// Default delay before the loading indicator becomes visible (ms).
const DEFAULT_INDICATOR_DELAY_MS: u64 = 200;
/// Default connect timeout (s).
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default form field that carries the selected instance URL.
const DEFAULT_INSTANCE_FIELD: &str = "coverityInstanceUrl";

/// Settings shared by every load issued from one form.
///
/// Deserializes from camelCase JSON; every field is optional and falls back to
/// [`LoaderConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Base URL every request path is appended to, e.g. `http://ci.example.com/jenkins`.
    pub root_url: String,
    /// Fully qualified descriptor name, e.g.
    /// `com.synopsys.integration.coverity.post.CoverityPostBuildStep`.
    pub descriptor_name: String,
    /// Form field whose value is sent along as the instance URL. `None` disables it.
    pub instance_field: Option<String>,
    pub method: HttpMethod,
    pub indicator_delay_ms: u64,
    pub connect_timeout_secs: Option<u64>,
    /// Overall request timeout. `None` keeps the transport default (no timeout).
    pub request_timeout_secs: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            descriptor_name: String::new(),
            instance_field: Some(DEFAULT_INSTANCE_FIELD.to_string()),
            method: HttpMethod::default(),
            indicator_delay_ms: DEFAULT_INDICATOR_DELAY_MS,
            connect_timeout_secs: Some(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout_secs: None,
        }
    }
}

impl LoaderConfig {
    pub fn new(root_url: impl Into<String>, descriptor_name: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            descriptor_name: descriptor_name.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LoadError::InvalidConfig(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoadError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        log::debug!("Loaded loader config from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Check the settings a request cannot be built without.
    pub fn validate(&self) -> Result<()> {
        let root = self.root_url.trim();
        if root.is_empty() {
            return Err(LoadError::InvalidConfig("rootUrl is empty".to_string()));
        }
        if !(root.starts_with("http://") || root.starts_with("https://") || root.starts_with('/'))
        {
            return Err(LoadError::InvalidConfig(format!(
                "rootUrl must be absolute or root-relative: {root}"
            )));
        }
        if self.descriptor_name.trim().is_empty() {
            return Err(LoadError::InvalidConfig(
                "descriptorName is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `root_url` carries a scheme and host. A root-relative URL only works with a
    /// transport that resolves it against an origin of its own.
    pub fn has_absolute_root(&self) -> bool {
        let root = self.root_url.trim();
        root.starts_with("http://") || root.starts_with("https://")
    }

    /// `<root>/descriptor/<descriptor>/<operation>`
    pub fn fill_url(&self, operation: &FillOperation) -> String {
        format!(
            "{}/descriptor/{}/{}",
            self.root_url.trim().trim_end_matches('/'),
            urlencoding::encode(self.descriptor_name.trim()),
            urlencoding::encode(operation.as_str()),
        )
    }

    pub fn indicator_delay(&self) -> Duration {
        Duration::from_millis(self.indicator_delay_ms)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
