//! Per-item parameter resolution.
//!
//! A node is configured once, but every parameter is read *for an item*.
//! Plain values are shared by the whole batch; a string of the form
//! `={{ $json.some.path }}` is an expression evaluated against the item's
//! JSON, so one node configuration can produce a different request per item.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix marking a parameter value as an expression.
const EXPRESSION_PREFIX: char = '=';

/// The configured parameters of one node instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeParameters(Map<String, Value>);

impl NodeParameters {
    /// Build from any JSON value; non-objects give an empty parameter set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Resolve `name` for the item at `index`.
    ///
    /// Returns `None` when the parameter is not configured or resolves to
    /// `null`.
    pub fn get(&self, name: &str, index: usize, items: &[Value]) -> Option<Value> {
        let item = items.get(index).unwrap_or(&Value::Null);
        let resolved = resolve(self.0.get(name)?, item);
        (!resolved.is_null()).then_some(resolved)
    }

    /// Like [`get`](Self::get), falling back to `default`.
    pub fn get_or(&self, name: &str, index: usize, items: &[Value], default: Value) -> Value {
        self.get(name, index, items).unwrap_or(default)
    }

    /// Resolve a string parameter; numbers and booleans are rendered as text.
    pub fn get_string(&self, name: &str, index: usize, items: &[Value], default: &str) -> String {
        match self.get(name, index, items) {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => default.to_string(),
        }
    }
}

/// Evaluate `value` against `item`, descending into objects and arrays.
fn resolve(value: &Value, item: &Value) -> Value {
    match value {
        Value::String(s) => match expression_path(s) {
            Some(path) => lookup(item, path),
            None => value.clone(),
        },
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve(v, item)))
                .collect(),
        ),
        Value::Array(values) => Value::Array(values.iter().map(|v| resolve(v, item)).collect()),
        other => other.clone(),
    }
}

/// Extract the dotted path out of `={{ $json.a.b }}`.
fn expression_path(raw: &str) -> Option<&str> {
    let body = raw
        .strip_prefix(EXPRESSION_PREFIX)?
        .trim()
        .strip_prefix("{{")?
        .strip_suffix("}}")?
        .trim();
    match body {
        "$json" => Some(""),
        _ => body.strip_prefix("$json."),
    }
}

fn lookup(item: &Value, path: &str) -> Value {
    if path.is_empty() {
        return item.clone();
    }
    path.split('.')
        .try_fold(item, |current, segment| match current {
            Value::Array(values) => segment.parse::<usize>().ok().and_then(|i| values.get(i)),
            _ => current.get(segment),
        })
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> NodeParameters {
        NodeParameters::from_value(value)
    }

    #[test]
    fn plain_values_are_shared_by_every_item() {
        let p = params(json!({ "city": "Springfield" }));
        let items = vec![json!({}), json!({})];
        assert_eq!(p.get("city", 0, &items), Some(json!("Springfield")));
        assert_eq!(p.get("city", 1, &items), Some(json!("Springfield")));
    }

    #[test]
    fn expressions_vary_per_item() {
        let p = params(json!({ "name": "={{ $json.person.name }}" }));
        let items = vec![
            json!({ "person": { "name": "Jane Doe" } }),
            json!({ "person": { "name": "John Roe" } }),
        ];
        assert_eq!(p.get_string("name", 0, &items, ""), "Jane Doe");
        assert_eq!(p.get_string("name", 1, &items, ""), "John Roe");
    }

    #[test]
    fn collections_resolve_recursively() {
        let p = params(json!({ "additionalFields": { "email": "={{$json.email}}", "company": "Acme" } }));
        let items = vec![json!({ "email": "jane@example.com" })];
        assert_eq!(
            p.get("additionalFields", 0, &items),
            Some(json!({ "email": "jane@example.com", "company": "Acme" }))
        );
    }

    #[test]
    fn missing_or_null_falls_back_to_default() {
        let p = params(json!({ "country": "={{ $json.country }}" }));
        let items = vec![json!({})];
        assert_eq!(p.get("country", 0, &items), None);
        assert_eq!(p.get_string("country", 0, &items, "US"), "US");
        assert_eq!(p.get_string("address2", 0, &items, ""), "");
    }

    #[test]
    fn array_segments_index_into_lists() {
        let p = params(json!({ "id": "={{ $json.ids.1 }}" }));
        let items = vec![json!({ "ids": [10, 20] })];
        assert_eq!(p.get("id", 0, &items), Some(json!(20)));
    }
}
