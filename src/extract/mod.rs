//! Per-request template variable namespace.
//!
//! Four top-level keys are available to templates: `path` (route captures),
//! `query` (query-string parameters, last value wins), `body` (raw request
//! body text) and `json` (parsed body, only when the request carries JSON or
//! `force_json` is configured). The namespace is built fresh for every
//! request and dropped with it.

use axum::http::{header, HeaderMap};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::AppError;

/// The variable mapping a template renders against.
#[derive(Debug, Clone)]
pub struct VariableNamespace {
    root: Map<String, Value>,
}

impl VariableNamespace {
    pub(crate) fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    #[cfg(test)]
    pub(crate) fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => panic!("namespace root must be an object, got {other}"),
        }
    }

    /// Resolve a dotted path (`["json", "text"]`) to its value, or `None`
    /// when any step is absent.
    pub fn lookup(&self, path: &[String]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.root.get(first)?;
        for segment in rest {
            current = current.get(segment)?;
        }
        Some(current)
    }
}

/// Build the namespace from the request's captures, query string and body.
///
/// Namespace construction itself cannot fail; the only error is a body that
/// must parse as JSON (content type `application/json`, or `force_json`) and
/// does not.
pub fn extract_variables<'a, P>(
    path_params: P,
    raw_query: Option<&str>,
    headers: &HeaderMap,
    body: String,
    force_json: bool,
) -> Result<VariableNamespace, AppError>
where
    P: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut root = Map::new();

    let path: Map<String, Value> = path_params
        .into_iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();
    root.insert("path".to_string(), Value::Object(path));

    let mut query = Map::new();
    if let Some(raw) = raw_query {
        for (name, value) in form_urlencoded::parse(raw.as_bytes()) {
            // repeated keys: the last occurrence wins
            query.insert(name.into_owned(), Value::String(value.into_owned()));
        }
    }
    root.insert("query".to_string(), Value::Object(query));

    if force_json || content_type_is_json(headers) {
        let json: Value =
            serde_json::from_str(&body).map_err(|e| AppError::JsonParse(e.to_string()))?;
        root.insert("json".to_string(), json);
    }
    root.insert("body".to_string(), Value::String(body));

    Ok(VariableNamespace::from_map(root))
}

fn content_type_is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn path(ns: &VariableNamespace, dotted: &str) -> Option<Value> {
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        ns.lookup(&segments).cloned()
    }

    #[test]
    fn test_path_and_body_variables() {
        let ns = extract_variables(
            [("room_id", "!abc")],
            None,
            &HeaderMap::new(),
            "hi".to_string(),
            false,
        )
        .unwrap();

        assert_eq!(path(&ns, "path.room_id"), Some(Value::from("!abc")));
        assert_eq!(path(&ns, "body"), Some(Value::from("hi")));
        assert_eq!(path(&ns, "json"), None);
    }

    #[test]
    fn test_query_last_value_wins() {
        let ns = extract_variables(
            [],
            Some("name=a&name=b&other=x"),
            &HeaderMap::new(),
            String::new(),
            false,
        )
        .unwrap();

        assert_eq!(path(&ns, "query.name"), Some(Value::from("b")));
        assert_eq!(path(&ns, "query.other"), Some(Value::from("x")));
    }

    #[test]
    fn test_query_percent_decoding() {
        let ns = extract_variables(
            [],
            Some("msg=hello%20world&plus=a+b"),
            &HeaderMap::new(),
            String::new(),
            false,
        )
        .unwrap();

        assert_eq!(path(&ns, "query.msg"), Some(Value::from("hello world")));
        assert_eq!(path(&ns, "query.plus"), Some(Value::from("a b")));
    }

    #[test]
    fn test_json_parsed_for_json_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let ns = extract_variables([], None, &headers, r#"{"text":"hello"}"#.to_string(), false)
            .unwrap();

        assert_eq!(path(&ns, "json.text"), Some(Value::from("hello")));
        assert_eq!(path(&ns, "body"), Some(Value::from(r#"{"text":"hello"}"#)));
    }

    #[test]
    fn test_json_skipped_for_other_content_types() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let ns =
            extract_variables([], None, &headers, "not json".to_string(), false).unwrap();

        assert_eq!(path(&ns, "json"), None);
        assert_eq!(path(&ns, "body"), Some(Value::from("not json")));
    }

    #[test]
    fn test_force_json_overrides_content_type() {
        let ns = extract_variables([], None, &HeaderMap::new(), "[1, 2]".to_string(), true)
            .unwrap();
        assert_eq!(path(&ns, "json"), Some(serde_json::json!([1, 2])));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = extract_variables([], None, &HeaderMap::new(), "{broken".to_string(), true)
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse JSON:"));
    }

    #[test]
    fn test_lookup_does_not_descend_into_strings() {
        let ns = extract_variables(
            [("id", "x")],
            None,
            &HeaderMap::new(),
            String::new(),
            false,
        )
        .unwrap();
        assert_eq!(path(&ns, "path.id.nested"), None);
    }
}
