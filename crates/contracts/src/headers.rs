//! Message header map
//!
//! String-keyed metadata entries carried alongside a payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single header value
///
/// Most headers are plain text; structured service results are carried as
/// JSON so sinks can consume them without knowing the concrete ack type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Plain text value
    Text(String),
    /// Structured JSON value
    Json(serde_json::Value),
}

impl HeaderValue {
    /// Text content, if this is a text header
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Json(_) => None,
        }
    }

    /// JSON content, if this is a structured header
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Text(_) => None,
            Self::Json(v) => Some(v),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<serde_json::Value> for HeaderValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Named metadata entries of a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headers(HashMap<String, HeaderValue>);

impl Headers {
    /// Create an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<HeaderValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Get a header value by key
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.0.get(key)
    }

    /// Get a text header by key
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(HeaderValue::as_text)
    }

    /// Get a text header by key, treating empty strings as absent
    pub fn non_empty_text(&self, key: &str) -> Option<&str> {
        self.text(key).filter(|s| !s.is_empty())
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<HeaderValue>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lookup() {
        let mut headers = Headers::new();
        headers.insert("stream", "orders");

        assert_eq!(headers.text("stream"), Some("orders"));
        assert_eq!(headers.text("missing"), None);
    }

    #[test]
    fn test_empty_text_is_treated_as_absent() {
        let mut headers = Headers::new();
        headers.insert("partition-key", "");

        assert_eq!(headers.text("partition-key"), Some(""));
        assert_eq!(headers.non_empty_text("partition-key"), None);
    }

    #[test]
    fn test_json_header() {
        let mut headers = Headers::new();
        headers.insert("service-result", serde_json::json!({"failed_count": 0}));

        let value = headers.get("service-result").unwrap();
        assert!(value.as_text().is_none());
        assert_eq!(value.as_json().unwrap()["failed_count"], 0);
    }
}
