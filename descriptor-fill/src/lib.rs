//! # descriptor-fill
//!
//! Cascading dependent-dropdown population for configuration forms.
//!
//! A form has dropdowns (project, stream, view) whose valid options depend on what is
//! selected elsewhere. Each dropdown is refreshed from a descriptor "fill" endpoint:
//!
//! ```text
//! POST <rootUrl>/descriptor/<descriptorName>/fill<FieldName>Items
//!      projectName=...&streamName=...&coverityInstanceUrl=...&updateNow=false
//!
//! { "values": [ { "name": "Project Two", "value": "p2", "selected": true }, ... ] }
//! ```
//!
//! The loader replaces the control's options with the response, selects the flagged
//! option (or nothing), and shows a loading indicator next to the control while the
//! request is in flight.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use descriptor_fill::{DescriptorForm, LoaderConfig, MemoryForm};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LoaderConfig::new(
//!         "https://ci.example.com/jenkins",
//!         "com.synopsys.integration.coverity.post.CoverityPostBuildStep",
//!     );
//!
//!     let surface = MemoryForm::new();
//!     surface.new_select("projectName");
//!     surface.new_select("streamName");
//!     surface.set_field("coverityInstanceUrl", "https://coverity.example.com");
//!
//!     let form = DescriptorForm::new(config, surface.clone())?;
//!     let (projects, streams) = form.load_projects_then_streams(false)?;
//!     println!("{:?}", projects.outcome().await);
//!     println!("{:?}", streams.outcome().await);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Handling
//!
//! Nothing is retried. A non-2xx status, a transport error or a body that is not a
//! `{ "values": [...] }` document is logged and leaves the control's options as they
//! were; the indicator is removed either way. When a control is reloaded before an
//! earlier load of it finished, the earlier response is discarded
//! ([`LoadOutcome::Superseded`]).

mod config;
mod error;
mod fields;
pub mod form;
mod http_client;
mod indicator;
mod loader;
mod sequence;
mod transport;
mod types;
mod utils;

// Re-export error types
pub use error::{LoadError, Result};

pub use config::LoaderConfig;

pub use fields::{
    DependentField, DescriptorForm, FieldSet, PROJECT_FIELD, ParamBuilder, STREAM_FIELD,
    UPDATE_NOW_PARAM, VIEW_FIELD, selections_of,
};

pub use form::memory::{Indicator, MemoryContainer, MemoryForm, MemorySelect};
pub use form::{FormSurface, IndicatorHost, SelectControl, SelectTarget};

pub use http_client::RawResponse;
pub use loader::{DependentSelectLoader, LoadHandle, LoadOutcome};
pub use sequence::{ControlKey, RequestSequencer, Settlement, Ticket};
pub use transport::{FillTransport, HttpFillTransport};

pub use types::{
    FillOperation, FillRequest, HttpMethod, ListBoxResponse, ListOption, ParamValue,
    RequestParams,
};
