//! Export request building
//!
//! Direct export (a navigable URL) and background export (a job parameter
//! map) both derive from [`canonicalize`], so the two parameter sets cannot
//! drift apart.

use reqwest::Url;
use serde_json::{Map, Value};

use csvr_common::config::TomlConfig;

use super::params::{ParamMap, ParamValue};
use crate::error::StudioResult;
use crate::remote::RemoteService;

/// Local discriminator key, meaningless to the server
pub const XCLASS_KEY: &str = "xclass";
pub const TEMPLATE_KEY: &str = "template";

/// Canonical form of one export request
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub url: Url,
    pub params: ParamMap,
}

/// Turns search parameters plus a template into an export request
#[derive(Debug, Clone)]
pub struct ExportRequestBuilder {
    endpoint: Url,
}

impl ExportRequestBuilder {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    pub fn from_config(config: &TomlConfig, remote: &RemoteService) -> StudioResult<Self> {
        Ok(Self::new(
            remote.calculate_request_uri(&config.export.endpoint_path)?,
        ))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn build(&self, search: &Map<String, Value>, template: &str) -> ExportRequest {
        let params = canonicalize(search, template);
        let url = self.url_for(&params);
        ExportRequest { url, params }
    }

    /// Directly navigable export URL
    pub fn build_url(&self, search: &Map<String, Value>, template: &str) -> Url {
        self.url_for(&canonicalize(search, template))
    }

    /// Parameter map for a background export job
    pub fn build_params(&self, search: &Map<String, Value>, template: &str) -> ParamMap {
        canonicalize(search, template)
    }

    fn url_for(&self, params: &ParamMap) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                match value {
                    ParamValue::Single(v) => {
                        query.append_pair(key, v);
                    }
                    ParamValue::Multi(values) => {
                        for v in values {
                            query.append_pair(key, v);
                        }
                    }
                }
            }
        }
        url
    }
}

/// Drop nulls, stringify scalars, strip `xclass` and force `template`
///
/// The template is not validated here; callers gate on a selected template.
pub fn canonicalize(search: &Map<String, Value>, template: &str) -> ParamMap {
    let mut params: ParamMap = search
        .iter()
        .filter(|(key, _)| key.as_str() != XCLASS_KEY)
        .filter_map(|(key, value)| to_param(value).map(|p| (key.clone(), p)))
        .collect();

    params.insert(TEMPLATE_KEY.to_string(), ParamValue::Single(template.to_string()));
    params
}

fn to_param(value: &Value) -> Option<ParamValue> {
    match value {
        Value::Null => None,
        Value::Array(items) => {
            // An empty list has no query-string form, so it is left out of both paths
            let values: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!values.is_empty()).then_some(ParamValue::Multi(values))
        }
        other => scalar_text(other).map(ParamValue::Single),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Nested objects have no query-string form; send them as JSON text
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::params::SearchParameters;

    fn builder() -> ExportRequestBuilder {
        ExportRequestBuilder::new(
            Url::parse("http://studio.local/rest/api/exportcsv/contentset").unwrap(),
        )
    }

    #[test]
    fn test_canonicalize_strips_nulls_and_xclass() {
        let search = SearchParameters {
            xclass: Some("com.coremedia.Search".into()),
            ..SearchParameters::in_folder("/a/b")
        };
        let params = canonicalize(&search.to_map(), "Full Report");

        let expected: ParamMap = [
            ("folder".to_string(), ParamValue::from("/a/b")),
            ("template".to_string(), ParamValue::from("Full Report")),
        ]
        .into_iter()
        .collect();
        assert_eq!(params, expected);
    }

    #[test]
    fn test_template_overrides_search_value() {
        let mut search = Map::new();
        search.insert("template".into(), Value::String("stale".into()));
        let params = canonicalize(&search, "Fresh");
        assert_eq!(params["template"], ParamValue::from("Fresh"));
    }

    #[test]
    fn test_scalars_and_arrays() {
        let search = SearchParameters {
            limit: Some(50),
            include_sub_folders: Some(false),
            content_type: Some(vec!["Article".into(), "Picture".into()]),
            ..Default::default()
        };
        let params = canonicalize(&search.to_map(), "T");

        assert_eq!(params["limit"], ParamValue::from("50"));
        assert_eq!(params["includeSubFolders"], ParamValue::from("false"));
        assert_eq!(
            params["contentType"],
            ParamValue::Multi(vec!["Article".into(), "Picture".into()])
        );
    }

    #[test]
    fn test_url_and_params_agree() {
        let search = SearchParameters {
            query: Some("summer sale".into()),
            content_type: Some(vec!["Article".into(), "Picture".into()]),
            ..SearchParameters::in_folder("/a/b")
        }
        .to_map();

        let request = builder().build(&search, "Full Report");
        assert_eq!(request.params, builder().build_params(&search, "Full Report"));
        assert_eq!(request.url, builder().build_url(&search, "Full Report"));

        let pairs: Vec<(String, String)> = request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("contentType".to_string(), "Article".to_string()),
                ("contentType".to_string(), "Picture".to_string()),
                ("folder".to_string(), "/a/b".to_string()),
                ("query".to_string(), "summer sale".to_string()),
                ("template".to_string(), "Full Report".to_string()),
            ]
        );
        assert!(request
            .url
            .as_str()
            .starts_with("http://studio.local/rest/api/exportcsv/contentset?"));
    }

    #[test]
    fn test_empty_lists_dropped_from_url_and_params() {
        let mut search = SearchParameters::in_folder("/a/b").to_map();
        search.insert("facetQuery".into(), Value::Array(vec![]));
        search.insert("filterQuery".into(), Value::Array(vec![Value::Null, Value::Null]));

        let request = builder().build(&search, "Full Report");

        let mut url_keys: Vec<String> = request
            .url
            .query_pairs()
            .map(|(k, _)| k.into_owned())
            .collect();
        url_keys.dedup();
        let param_keys: Vec<String> = request.params.keys().cloned().collect();
        assert_eq!(url_keys, param_keys);
        assert_eq!(param_keys, vec!["folder", "template"]);
    }
}
