//! Form handles
//!
//! The loader never looks controls up by id on its own. Callers hand it handles to the
//! select control and, through it, to the container that hosts the loading indicator.

pub mod memory;

use std::sync::Arc;

use crate::types::ListOption;

/// A select-like control.
pub trait SelectControl: Send + Sync {
    /// Field id, used for logging and for sequencing loads per control.
    fn id(&self) -> &str;

    /// Currently selected value, empty when nothing is chosen.
    fn value(&self) -> String;

    /// Replace every option and select `selected` (empty selects nothing).
    ///
    /// Returns `false` without touching anything when the control no longer exposes an
    /// option list, e.g. it was removed from the form.
    fn replace_options(&self, options: &[ListOption], selected: &str) -> bool;

    /// Element the loading indicator is placed in, usually the control's parent.
    fn container(&self) -> Option<Arc<dyn IndicatorHost>>;
}

/// Container able to host loading indicators keyed by id.
pub trait IndicatorHost: Send + Sync {
    /// Find an indicator with `id` or append a hidden one showing `text`.
    ///
    /// The lookup and the append happen as one step. Returns `true` if a new indicator
    /// was created.
    fn ensure_indicator(&self, id: &str, text: &str) -> bool;

    /// Make the indicator visible. Returns `false` if it no longer exists.
    fn reveal_indicator(&self, id: &str) -> bool;

    /// Remove the indicator. Returns `false` if there was none.
    fn remove_indicator(&self, id: &str) -> bool;

    fn has_indicator(&self, id: &str) -> bool;
}

/// Read access to the whole form.
pub trait FormSurface: Send + Sync {
    /// Current value of any field (select or plain input). `None` if there is no such field.
    fn field_value(&self, field_id: &str) -> Option<String>;

    /// Select control for `field_id`, if the form has one.
    fn select(&self, field_id: &str) -> Option<Arc<dyn SelectControl>>;
}

/// What a single load writes to: the control and its indicator.
#[derive(Clone)]
pub struct SelectTarget {
    pub control: Arc<dyn SelectControl>,
    pub loading_id: String,
    pub loading_text: String,
}

impl SelectTarget {
    pub fn new(
        control: Arc<dyn SelectControl>,
        loading_id: impl Into<String>,
        loading_text: impl Into<String>,
    ) -> Self {
        Self {
            control,
            loading_id: loading_id.into(),
            loading_text: loading_text.into(),
        }
    }

    pub fn id(&self) -> &str {
        self.control.id()
    }
}

impl std::fmt::Debug for SelectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectTarget")
            .field("control", &self.control.id())
            .field("loading_id", &self.loading_id)
            .field("loading_text", &self.loading_text)
            .finish()
    }
}
