use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::form::SelectTarget;
use crate::http_client::HttpUtils;
use crate::indicator::LoadingIndicator;
use crate::sequence::{ControlKey, RequestSequencer, Settlement, Ticket};
use crate::transport::{FillTransport, HttpFillTransport};
use crate::types::{FillRequest, HttpMethod, ListBoxResponse, RequestParams};
use crate::utils::log_sanitizer::truncate_for_log;

/// How a single load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Options were replaced.
    Applied {
        option_count: usize,
        /// Value selected afterwards, empty when none was flagged.
        selected: String,
    },
    /// The response arrived but the control no longer exposes an option list.
    Detached,
    /// A newer load for the same control was started; this result was dropped.
    Superseded,
    /// Nothing was changed. The error has already been logged.
    Failed(LoadError),
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Handle to a load running in the background.
///
/// Dropping it does not cancel the load.
#[derive(Debug)]
pub struct LoadHandle {
    target_id: String,
    task: JoinHandle<LoadOutcome>,
}

impl LoadHandle {
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for several loads; outcomes come back in the order of `handles`.
    pub async fn wait_all(handles: Vec<LoadHandle>) -> Vec<LoadOutcome> {
        futures::future::join_all(handles.into_iter().map(LoadHandle::outcome)).await
    }

    /// Wait for the load to complete.
    pub async fn outcome(self) -> LoadOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("[{}] load task failed: {e}", self.target_id);
                LoadOutcome::Failed(LoadError::TaskFailed(e.to_string()))
            }
        }
    }
}

/// Populates a select control from a fill endpoint.
///
/// Cheap to clone; clones share the transport and the per-control sequencing, so a load
/// started from any clone supersedes older loads of the same control. Controls are
/// compared by identity: forms sharing a loader do not interfere even when their field
/// ids match.
#[derive(Clone)]
pub struct DependentSelectLoader {
    transport: Arc<dyn FillTransport>,
    sequencer: Arc<RequestSequencer>,
    method: HttpMethod,
    indicator_delay: Duration,
}

impl DependentSelectLoader {
    /// Loader sending real HTTP requests with the timeouts from `config`.
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let transport = HttpFillTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Loader using a caller-supplied transport.
    pub fn with_transport(transport: Arc<dyn FillTransport>, config: &LoaderConfig) -> Self {
        Self {
            transport,
            sequencer: Arc::new(RequestSequencer::new()),
            method: config.method,
            indicator_delay: config.indicator_delay(),
        }
    }

    /// Start loading `target`'s options from `url` and return immediately.
    ///
    /// The indicator is created before this returns. Must be called inside a tokio
    /// runtime.
    pub fn load_list(
        &self,
        target: SelectTarget,
        url: impl Into<String>,
        params: RequestParams,
    ) -> LoadHandle {
        let request = FillRequest {
            url: url.into(),
            method: self.method,
            params,
        };
        let target_id = target.id().to_string();
        let ticket = self
            .sequencer
            .issue(ControlKey::of(&target.control), &target.loading_id);
        let indicator = LoadingIndicator::show(&target, self.indicator_delay);

        log::debug!(
            "[{target_id}] load #{} {} {}",
            ticket.seq(),
            request.method.as_str(),
            request.url
        );

        let transport = Arc::clone(&self.transport);
        let sequencer = Arc::clone(&self.sequencer);
        let task = tokio::spawn(async move {
            let result = fetch_options(transport.as_ref(), &request).await;
            complete(&sequencer, &ticket, &target, indicator, result)
        });

        LoadHandle { target_id, task }
    }

    /// [`load_list`](Self::load_list) and wait for the outcome.
    pub async fn load_list_now(
        &self,
        target: SelectTarget,
        url: impl Into<String>,
        params: RequestParams,
    ) -> LoadOutcome {
        self.load_list(target, url, params).outcome().await
    }
}

/// Send the request and turn the answer into options. Non-2xx and unparsable bodies are
/// both failures.
async fn fetch_options(
    transport: &dyn FillTransport,
    request: &FillRequest,
) -> Result<ListBoxResponse> {
    let raw = transport.send(request).await?;
    if !raw.is_success() {
        log::debug!(
            "Error body from {}: {}",
            request.url,
            truncate_for_log(&raw.body)
        );
        return Err(LoadError::HttpStatus {
            url: request.url.clone(),
            status: raw.status,
            status_text: raw.status_text,
        });
    }
    HttpUtils::parse_json(&raw.body, &request.url)
}

fn complete(
    sequencer: &RequestSequencer,
    ticket: &Ticket,
    target: &SelectTarget,
    indicator: LoadingIndicator,
    result: Result<ListBoxResponse>,
) -> LoadOutcome {
    let target_id = target.id();

    sequencer.settle(ticket, |settlement| match settlement {
        Settlement::Superseded { newer_loading_id } => {
            // The newer load removes the indicator unless it uses a different one.
            if newer_loading_id.as_deref() == Some(indicator.id()) {
                indicator.release();
            } else {
                indicator.hide();
            }
            log::debug!(
                "[{target_id}] discarding response of superseded load #{}",
                ticket.seq()
            );
            LoadOutcome::Superseded
        }
        Settlement::Newest => {
            indicator.hide();
            apply(target, result)
        }
    })
}

fn apply(target: &SelectTarget, result: Result<ListBoxResponse>) -> LoadOutcome {
    let target_id = target.id();

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            if e.is_remote() {
                log::warn!("[{target_id}] {e}");
            } else {
                log::error!("[{target_id}] {e}");
            }
            return LoadOutcome::Failed(e);
        }
    };

    let selected = response.selected_value();
    if !target.control.replace_options(&response.values, selected) {
        log::debug!("[{target_id}] control has no option list anymore, skipping");
        return LoadOutcome::Detached;
    }

    log::debug!(
        "[{target_id}] {} options, selected '{selected}'",
        response.values.len()
    );
    LoadOutcome::Applied {
        option_count: response.values.len(),
        selected: selected.to_string(),
    }
}
