use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============ Options ============

/// One selectable entry returned by a fill endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOption {
    /// Display text.
    pub name: String,
    /// Submitted value.
    pub value: String,
    /// Whether the server wants this option pre-selected.
    #[serde(default)]
    pub selected: bool,
}

impl ListOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            selected: false,
        }
    }

    #[must_use]
    pub fn as_selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// Body of a fill endpoint response: `{ "values": [ ... ] }`.
///
/// The `values` field is required; a body without it is a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBoxResponse {
    /// Options in display order.
    pub values: Vec<ListOption>,
}

impl ListBoxResponse {
    /// Value the control should show after a refresh.
    ///
    /// The last option flagged `selected` wins; the empty string when none is flagged.
    pub fn selected_value(&self) -> &str {
        self.values
            .iter()
            .rev()
            .find(|opt| opt.selected)
            .map_or("", |opt| opt.value.as_str())
    }
}

// ============ Request parameters ============

/// Primitive value sent as a form or query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Flat parameter mapping for a fill request. Order is irrelevant to the server; a
/// `BTreeMap` keeps logs and encoded bodies stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(BTreeMap<String, ParamValue>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key/value pairs ready for form or query encoding.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

// ============ Endpoints ============

/// Name of a descriptor fill endpoint, e.g. `fillProjectNameItems`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FillOperation(String);

impl FillOperation {
    /// Derive the endpoint name for a form field: `projectName` → `fillProjectNameItems`.
    pub fn for_field(field: &str) -> Self {
        let mut chars = field.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self(format!("fill{capitalized}Items"))
    }

    /// Use an endpoint name verbatim.
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn project_name() -> Self {
        Self::for_field("projectName")
    }

    pub fn stream_name() -> Self {
        Self::for_field("streamName")
    }

    pub fn view_name() -> Self {
        Self::for_field("viewName")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FillOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTTP method used for fill requests.
///
/// `Post` sends the parameters as a form-encoded body, `Get` as a query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A fully resolved fill request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillRequest {
    pub url: String,
    pub method: HttpMethod,
    pub params: RequestParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_operation_follows_field_naming() {
        assert_eq!(FillOperation::project_name().as_str(), "fillProjectNameItems");
        assert_eq!(FillOperation::stream_name().as_str(), "fillStreamNameItems");
        assert_eq!(FillOperation::view_name().as_str(), "fillViewNameItems");
        assert_eq!(
            FillOperation::for_field("coverityToolName").as_str(),
            "fillCoverityToolNameItems"
        );
    }

    #[test]
    fn selected_value_prefers_flagged_option() {
        let resp: ListBoxResponse = serde_json::from_str(
            r#"{"values":[
                {"value":"p1","name":"Project One","selected":false},
                {"value":"p2","name":"Project Two","selected":true}
            ]}"#,
        )
        .unwrap();
        assert_eq!(resp.values.len(), 2);
        assert_eq!(resp.selected_value(), "p2");
    }

    #[test]
    fn selected_value_empty_when_none_flagged() {
        let resp = ListBoxResponse {
            values: vec![ListOption::new("A", "a"), ListOption::new("B", "b")],
        };
        assert_eq!(resp.selected_value(), "");
    }

    #[test]
    fn selected_value_last_flag_wins() {
        let resp = ListBoxResponse {
            values: vec![
                ListOption::new("A", "a").as_selected(),
                ListOption::new("B", "b").as_selected(),
            ],
        };
        assert_eq!(resp.selected_value(), "b");
    }

    #[test]
    fn missing_selected_defaults_to_false() {
        let opt: ListOption = serde_json::from_str(r#"{"name":"A","value":"a"}"#).unwrap();
        assert!(!opt.selected);
    }

    #[test]
    fn missing_values_is_an_error() {
        assert!(serde_json::from_str::<ListBoxResponse>(r#"{"items":[]}"#).is_err());
    }

    #[test]
    fn params_encode_flags_as_words() {
        let params = RequestParams::new()
            .with("projectName", "p1")
            .with("updateNow", true);
        assert_eq!(
            params.to_pairs(),
            vec![
                ("projectName".to_string(), "p1".to_string()),
                ("updateNow".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn method_defaults_to_post() {
        assert_eq!(HttpMethod::default(), HttpMethod::Post);
        let m: HttpMethod = serde_json::from_str(r#""get""#).unwrap();
        assert_eq!(m, HttpMethod::Get);
    }
}
