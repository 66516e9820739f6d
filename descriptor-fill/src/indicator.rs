//! Loading indicator lifecycle around one request

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::form::{IndicatorHost, SelectTarget};

/// Indicator shown for one in-flight load.
pub(crate) struct LoadingIndicator {
    host: Option<Arc<dyn IndicatorHost>>,
    id: String,
    reveal: Option<JoinHandle<()>>,
}

impl LoadingIndicator {
    /// Find-or-create the hidden indicator now, reveal it after `delay`.
    ///
    /// Must run inside a tokio runtime. Does nothing when the control has no container.
    pub(crate) fn show(target: &SelectTarget, delay: Duration) -> Self {
        let host = target.control.container();
        let id = target.loading_id.clone();

        let reveal = host.as_ref().map(|host| {
            if host.ensure_indicator(&id, &target.loading_text) {
                log::trace!("[{}] created indicator '{id}'", target.id());
            }
            let host = Arc::clone(host);
            let id = id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                host.reveal_indicator(&id);
            })
        });

        Self { host, id, reveal }
    }

    /// Cancel the pending reveal and remove the indicator.
    pub(crate) fn hide(mut self) {
        self.cancel_reveal();
        if let Some(host) = &self.host {
            host.remove_indicator(&self.id);
        }
    }

    /// Cancel the pending reveal but leave the element to whoever owns it now.
    pub(crate) fn release(mut self) {
        self.cancel_reveal();
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    fn cancel_reveal(&mut self) {
        if let Some(handle) = self.reveal.take() {
            handle.abort();
        }
    }
}
