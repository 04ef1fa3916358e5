//! Field-keyed extraction results.
//!
//! A [`FieldMap`] is what every extraction tier produces: a map from
//! normalized field name to the JSON value found for it. Lookups normalize
//! the requested name the same way, so `"Yes Facts"`, `"yes_facts"` and
//! `"yes facts:"` all address the same entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Normalize a field name: trim, lowercase, underscores to spaces, and a
/// trailing colon removed.
pub fn normalize_field_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase().replace('_', " ");
    lowered.trim_end_matches(':').trim().to_string()
}

/// Normalize free text for the presence check (lowercase, underscores to
/// spaces).
pub(crate) fn normalize_text(text: &str) -> String {
    text.to_lowercase().replace('_', " ")
}

/// Map of normalized field name to extracted value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    fields: BTreeMap<String, Value>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed JSON object, normalizing every key.
    pub fn from_object(object: serde_json::Map<String, Value>) -> Self {
        let mut map = Self::new();
        for (key, value) in object {
            map.insert(&key, value);
        }
        map
    }

    /// Insert a value under the normalized form of `key`.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(normalize_field_name(key), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(&normalize_field_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Required field names that have no entry.
    pub fn missing<'a, S: AsRef<str>>(&self, required: &'a [S]) -> Vec<&'a str> {
        required
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.contains(name))
            .collect()
    }

    pub fn is_complete<S: AsRef<str>>(&self, required: &[S]) -> bool {
        self.missing(required).is_empty()
    }

    /// Serialize back into a single JSON object.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_else(|_| "{}".to_string())
    }

    /// Field value as text. Numbers and booleans are stringified; line
    /// pattern values such as `"Cost savings",` are unquoted.
    pub fn get_text(&self, name: &str) -> Option<String> {
        match coerce(self.get(name)?) {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Field value as a list of strings.
    ///
    /// Accepts a JSON array of scalars, or a string that itself holds a JSON
    /// array (what the line-pattern tier yields). `null` reads as empty.
    pub fn get_list(&self, name: &str) -> Option<Vec<String>> {
        match coerce(self.get(name)?) {
            Value::Array(items) => Some(items.iter().filter_map(scalar_to_string).collect()),
            Value::Null => Some(Vec::new()),
            Value::String(s) if s.trim().is_empty() => Some(Vec::new()),
            Value::String(s) => Some(vec![s]),
            _ => None,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reinterpret a verbatim line-pattern value as JSON when it is one.
fn coerce(value: &Value) -> Value {
    if let Value::String(raw) = value {
        let trimmed = raw.trim().trim_end_matches(',').trim_end();
        if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
            return parsed;
        }
        return Value::String(trimmed.to_string());
    }
    value.clone()
}
