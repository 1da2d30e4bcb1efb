//! Export parameter types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A canonical export parameter: one value, or a repeated query key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::Multi(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Single(value) => Value::String(value.clone()),
            ParamValue::Multi(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

/// Canonical parameters, ordered by key so URLs are stable
pub type ParamMap = BTreeMap<String, ParamValue>;

/// JSON object form of a parameter map
pub fn params_to_json(params: &ParamMap) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

/// Content search parameters of the collection view
///
/// Unset fields serialise as `null` and are stripped by canonicalisation.
/// Keys the typed fields do not cover go in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    pub query: Option<String>,
    pub limit: Option<i64>,
    pub order_by: Option<Vec<String>>,
    pub folder: Option<String>,
    pub include_sub_folders: Option<bool>,
    pub content_type: Option<Vec<String>>,
    pub include_sub_types: Option<bool>,
    pub filter_query: Option<Vec<String>>,
    pub facet_field: Option<Vec<String>>,
    pub facet_query: Option<Vec<String>>,
    pub search_handler: Option<String>,
    /// Local object-model discriminator; never sent to the server
    pub xclass: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchParameters {
    /// Search scoped to one folder
    pub fn in_folder(folder: impl Into<String>) -> Self {
        Self {
            folder: Some(folder.into()),
            ..Default::default()
        }
    }

    /// Generic JSON map of every key, unset ones as `null`
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Supplies the search parameters an export runs against
pub trait SearchParamsSource: Send + Sync {
    fn search_parameters(&self) -> Map<String, Value>;
}

impl SearchParamsSource for SearchParameters {
    fn search_parameters(&self) -> Map<String, Value> {
        self.to_map()
    }
}

impl SearchParamsSource for Map<String, Value> {
    fn search_parameters(&self) -> Map<String, Value> {
        self.clone()
    }
}
