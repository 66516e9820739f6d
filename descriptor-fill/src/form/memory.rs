//! In-memory form
//!
//! A headless stand-in for a rendered page: select controls with option lists, plain
//! input fields, and a container per control collecting loading indicators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{FormSurface, IndicatorHost, SelectControl};
use crate::types::ListOption;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Snapshot of one loading indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub id: String,
    pub text: String,
    pub visible: bool,
}

/// Container element holding loading indicators.
#[derive(Debug, Default)]
pub struct MemoryContainer {
    indicators: Mutex<Vec<Indicator>>,
}

impl MemoryContainer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn indicator(&self, id: &str) -> Option<Indicator> {
        lock(&self.indicators).iter().find(|i| i.id == id).cloned()
    }

    /// Number of indicators carrying `id`.
    pub fn indicator_count(&self, id: &str) -> usize {
        lock(&self.indicators).iter().filter(|i| i.id == id).count()
    }

    pub fn indicators(&self) -> Vec<Indicator> {
        lock(&self.indicators).clone()
    }
}

impl IndicatorHost for MemoryContainer {
    fn ensure_indicator(&self, id: &str, text: &str) -> bool {
        let mut indicators = lock(&self.indicators);
        if indicators.iter().any(|i| i.id == id) {
            return false;
        }
        indicators.push(Indicator {
            id: id.to_string(),
            text: text.to_string(),
            visible: false,
        });
        true
    }

    fn reveal_indicator(&self, id: &str) -> bool {
        let mut indicators = lock(&self.indicators);
        match indicators.iter_mut().find(|i| i.id == id) {
            Some(indicator) => {
                indicator.visible = true;
                true
            }
            None => false,
        }
    }

    fn remove_indicator(&self, id: &str) -> bool {
        let mut indicators = lock(&self.indicators);
        let before = indicators.len();
        indicators.retain(|i| i.id != id);
        indicators.len() != before
    }

    fn has_indicator(&self, id: &str) -> bool {
        lock(&self.indicators).iter().any(|i| i.id == id)
    }
}

#[derive(Debug, Default)]
struct SelectState {
    /// `None` once the control is detached from the form.
    options: Option<Vec<ListOption>>,
    value: String,
}

/// Select control backed by a plain option vector.
#[derive(Debug)]
pub struct MemorySelect {
    id: String,
    state: Mutex<SelectState>,
    container: Option<Arc<MemoryContainer>>,
}

impl MemorySelect {
    /// Empty control placed in its own container.
    pub fn new(id: impl Into<String>) -> Arc<Self> {
        Self::in_container(id, Some(MemoryContainer::new()))
    }

    /// Control placed in `container`; `None` models a control without a parent.
    pub fn in_container(
        id: impl Into<String>,
        container: Option<Arc<MemoryContainer>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            state: Mutex::new(SelectState {
                options: Some(Vec::new()),
                value: String::new(),
            }),
            container,
        })
    }

    /// Options currently rendered, `None` when detached.
    pub fn options(&self) -> Option<Vec<ListOption>> {
        lock(&self.state).options.clone()
    }

    pub fn set_options(&self, options: Vec<ListOption>, selected: &str) {
        let mut state = lock(&self.state);
        state.options = Some(options);
        state.value = selected.to_string();
    }

    /// Simulate the user picking a value.
    pub fn set_value(&self, value: impl Into<String>) {
        lock(&self.state).value = value.into();
    }

    /// Drop the option list, as if the element had been removed from the page.
    pub fn detach(&self) {
        lock(&self.state).options = None;
    }

    pub fn memory_container(&self) -> Option<&Arc<MemoryContainer>> {
        self.container.as_ref()
    }
}

impl SelectControl for MemorySelect {
    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self) -> String {
        lock(&self.state).value.clone()
    }

    fn replace_options(&self, options: &[ListOption], selected: &str) -> bool {
        let mut state = lock(&self.state);
        let Some(current) = state.options.as_mut() else {
            return false;
        };
        current.clear();
        current.extend_from_slice(options);
        state.value = selected.to_string();
        true
    }

    fn container(&self) -> Option<Arc<dyn IndicatorHost>> {
        self.container
            .clone()
            .map(|c| c as Arc<dyn IndicatorHost>)
    }
}

/// A whole form: select controls plus plain input fields.
#[derive(Debug, Default)]
pub struct MemoryForm {
    selects: Mutex<HashMap<String, Arc<MemorySelect>>>,
    fields: Mutex<HashMap<String, String>>,
}

impl MemoryForm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a select control under its own id.
    pub fn add_select(&self, select: Arc<MemorySelect>) {
        lock(&self.selects).insert(select.id.clone(), select);
    }

    /// Create, register and return an empty select control.
    pub fn new_select(&self, id: &str) -> Arc<MemorySelect> {
        let select = MemorySelect::new(id);
        self.add_select(Arc::clone(&select));
        select
    }

    pub fn memory_select(&self, id: &str) -> Option<Arc<MemorySelect>> {
        lock(&self.selects).get(id).cloned()
    }

    /// Remove a select control from the form entirely.
    pub fn remove_select(&self, id: &str) -> Option<Arc<MemorySelect>> {
        lock(&self.selects).remove(id)
    }

    /// Set a plain input field (e.g. the instance URL).
    pub fn set_field(&self, id: impl Into<String>, value: impl Into<String>) {
        lock(&self.fields).insert(id.into(), value.into());
    }
}

impl FormSurface for MemoryForm {
    fn field_value(&self, field_id: &str) -> Option<String> {
        if let Some(select) = lock(&self.selects).get(field_id) {
            return Some(select.value());
        }
        lock(&self.fields).get(field_id).cloned()
    }

    fn select(&self, field_id: &str) -> Option<Arc<dyn SelectControl>> {
        lock(&self.selects)
            .get(field_id)
            .cloned()
            .map(|s| s as Arc<dyn SelectControl>)
    }
}
