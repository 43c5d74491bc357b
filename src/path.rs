//! Path template handling
//!
//! Endpoint paths such as `orders/{id}/cancel` carry `{placeholder}`
//! segments. Callers pass a flat parameter map: placeholders are filled from
//! it and whatever is left over becomes the query string or JSON body.

use crate::errors::{AlephxError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Request parameters, kept in insertion order
pub type Params = serde_json::Map<String, Value>;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("static placeholder pattern"))
}

/// Placeholder names in order of appearance
pub fn extract_params(path: &str) -> Vec<&str> {
    placeholder_regex()
        .captures_iter(path)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// String form of a parameter as it appears in a path or query string
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Substitute every `{name}` in `path` with `params[name]`
pub fn implode_params(path: &str, params: &Params) -> Result<String> {
    let mut result = String::with_capacity(path.len());
    let mut last = 0;

    for caps in placeholder_regex().captures_iter(path) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = params.get(name.as_str()).ok_or_else(|| AlephxError::MissingParam {
            path: path.to_string(),
            param: name.as_str().to_string(),
        })?;
        result.push_str(&path[last..whole.start()]);
        result.push_str(&param_to_string(value));
        last = whole.end();
    }

    result.push_str(&path[last..]);
    Ok(result)
}

/// Parameters not consumed by the path template
pub fn omit_path_params(path: &str, params: &Params) -> Params {
    let used = extract_params(path);
    params
        .iter()
        .filter(|(key, _)| !used.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Form-encode parameters. Array values repeat their key (`a=1&a=2`).
pub fn urlencode_with_array_repeat(params: &Params) -> String {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        let key = urlencoding::encode(key);
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push(format!("{}={}", key, urlencoding::encode(&param_to_string(item))));
                }
            }
            other => {
                pairs.push(format!("{}={}", key, urlencoding::encode(&param_to_string(other))));
            }
        }
    }
    pairs.join("&")
}
