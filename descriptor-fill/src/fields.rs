//! Field callers
//!
//! A [`DependentField`] says which control to refresh, which endpoint feeds it and which
//! form values go along. [`DescriptorForm`] turns that into a load.

use std::fmt;
use std::sync::Arc;

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::form::{FormSurface, SelectTarget};
use crate::loader::{DependentSelectLoader, LoadHandle};
use crate::types::{FillOperation, RequestParams};

/// Parameter name carrying the cache-refresh flag.
pub const UPDATE_NOW_PARAM: &str = "updateNow";

pub const PROJECT_FIELD: &str = "projectName";
pub const STREAM_FIELD: &str = "streamName";
pub const VIEW_FIELD: &str = "viewName";

/// Builds the field-specific part of a request from the current form state.
pub type ParamBuilder = Arc<dyn Fn(&dyn FormSurface) -> RequestParams + Send + Sync>;

/// Builder sending the current value of each of `fields` under its own name.
/// Fields missing from the form are sent as empty strings.
pub fn selections_of(fields: &[&str]) -> ParamBuilder {
    let fields: Vec<String> = fields.iter().map(ToString::to_string).collect();
    Arc::new(move |form: &dyn FormSurface| {
        let mut params = RequestParams::new();
        for field in &fields {
            params.insert(field.as_str(), form.field_value(field).unwrap_or_default());
        }
        params
    })
}

/// One dependent dropdown.
#[derive(Clone)]
pub struct DependentField {
    pub field_id: String,
    pub loading_id: String,
    pub loading_text: String,
    pub operation: FillOperation,
    params: ParamBuilder,
}

impl DependentField {
    /// Field fed by `fill<FieldId>Items`, sending its own current value.
    pub fn new(
        field_id: impl Into<String>,
        loading_id: impl Into<String>,
        loading_text: impl Into<String>,
    ) -> Self {
        let field_id = field_id.into();
        Self {
            operation: FillOperation::for_field(&field_id),
            params: selections_of(&[field_id.as_str()]),
            field_id,
            loading_id: loading_id.into(),
            loading_text: loading_text.into(),
        }
    }

    #[must_use]
    pub fn with_operation(mut self, operation: FillOperation) -> Self {
        self.operation = operation;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: ParamBuilder) -> Self {
        self.params = params;
        self
    }

    /// `projectName`, refreshed from `fillProjectNameItems`.
    pub fn project() -> Self {
        Self::new(PROJECT_FIELD, "projectsloading", "Loading projects...")
    }

    /// `streamName`, scoped by the selected project.
    pub fn stream() -> Self {
        Self::new(STREAM_FIELD, "streamsloading", "Loading streams...")
            .with_params(selections_of(&[PROJECT_FIELD, STREAM_FIELD]))
    }

    /// `viewName`, refreshed from `fillViewNameItems`.
    pub fn view() -> Self {
        Self::new(VIEW_FIELD, "viewsloading", "Loading views...")
    }

    /// Field-specific parameters for the current form state.
    pub fn build_params(&self, form: &dyn FormSurface) -> RequestParams {
        (self.params)(form)
    }
}

impl fmt::Debug for DependentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependentField")
            .field("field_id", &self.field_id)
            .field("loading_id", &self.loading_id)
            .field("loading_text", &self.loading_text)
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

/// The dependent fields of one form.
#[derive(Debug, Clone)]
pub struct FieldSet {
    pub project: DependentField,
    pub stream: DependentField,
    pub view: DependentField,
}

impl Default for FieldSet {
    fn default() -> Self {
        Self {
            project: DependentField::project(),
            stream: DependentField::stream(),
            view: DependentField::view(),
        }
    }
}

/// A configuration form whose dropdowns are filled from one descriptor.
pub struct DescriptorForm {
    loader: DependentSelectLoader,
    config: LoaderConfig,
    surface: Arc<dyn FormSurface>,
    fields: FieldSet,
}

impl DescriptorForm {
    /// Form using an HTTP loader built from `config`.
    pub fn new(config: LoaderConfig, surface: Arc<dyn FormSurface>) -> Result<Self> {
        config.validate()?;
        let loader = DependentSelectLoader::new(&config)?;
        Ok(Self::with_loader(loader, config, surface))
    }

    /// Form using an existing loader, e.g. one shared with other forms.
    pub fn with_loader(
        loader: DependentSelectLoader,
        config: LoaderConfig,
        surface: Arc<dyn FormSurface>,
    ) -> Self {
        Self {
            loader,
            config,
            surface,
            fields: FieldSet::default(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: FieldSet) -> Self {
        self.fields = fields;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Full parameter set for `field`: its own parameters, the instance URL and
    /// `updateNow`.
    pub fn request_params(&self, field: &DependentField, update_now: bool) -> RequestParams {
        let mut params = field.build_params(self.surface.as_ref());
        if let Some(instance_field) = &self.config.instance_field
            && let Some(instance_url) = self.surface.field_value(instance_field)
        {
            params.insert(instance_field.as_str(), instance_url);
        }
        params.insert(UPDATE_NOW_PARAM, update_now);
        params
    }

    /// Refresh any dependent field. `update_now` asks the server to bypass its cache.
    pub fn load_field(&self, field: &DependentField, update_now: bool) -> Result<LoadHandle> {
        let target = self.target_for(field)?;
        Ok(self.start(field, target, update_now))
    }

    fn target_for(&self, field: &DependentField) -> Result<SelectTarget> {
        let control = self
            .surface
            .select(&field.field_id)
            .ok_or_else(|| LoadError::UnknownField(field.field_id.clone()))?;
        Ok(SelectTarget::new(
            control,
            &field.loading_id,
            &field.loading_text,
        ))
    }

    fn start(&self, field: &DependentField, target: SelectTarget, update_now: bool) -> LoadHandle {
        let url = self.config.fill_url(&field.operation);
        let params = self.request_params(field, update_now);
        self.loader.load_list(target, url, params)
    }

    pub fn load_projects(&self, update_now: bool) -> Result<LoadHandle> {
        self.load_field(&self.fields.project, update_now)
    }

    pub fn load_streams(&self, update_now: bool) -> Result<LoadHandle> {
        self.load_field(&self.fields.stream, update_now)
    }

    pub fn load_views(&self, update_now: bool) -> Result<LoadHandle> {
        self.load_field(&self.fields.view, update_now)
    }

    /// Start the project load and the stream load together. The stream load does not
    /// wait for the project load; both use the selections as they are now.
    ///
    /// Neither load starts unless both controls exist.
    pub fn load_projects_then_streams(&self, update_now: bool) -> Result<(LoadHandle, LoadHandle)> {
        let (project, stream) = (&self.fields.project, &self.fields.stream);
        let project_target = self.target_for(project)?;
        let stream_target = self.target_for(stream)?;
        Ok((
            self.start(project, project_target, update_now),
            self.start(stream, stream_target, update_now),
        ))
    }

    /// Refresh every field of the set at once, e.g. for an "update now" action.
    ///
    /// Nothing starts unless every control exists.
    pub fn load_all(&self, update_now: bool) -> Result<Vec<LoadHandle>> {
        let fields = [&self.fields.project, &self.fields.stream, &self.fields.view];
        let targets = fields
            .iter()
            .map(|field| self.target_for(field))
            .collect::<Result<Vec<_>>>()?;
        Ok(fields
            .into_iter()
            .zip(targets)
            .map(|(field, target)| self.start(field, target, update_now))
            .collect())
    }
}
