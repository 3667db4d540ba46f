use std::collections::BTreeMap;

use crate::{Error, Result};

/// Message headers: case-sensitive string keys and values.
///
/// Inserting a key twice keeps the last value. Lookups through
/// [`get`](Self::get) fail with [`Error::MissingHeader`] for keys that were
/// never set, so a handler reading an unconfigured header surfaces the
/// mistake instead of working with a made-up value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] if `key` was never set.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingHeader(key.to_owned()))
    }

    /// Look up a header without treating absence as an error.
    pub fn find(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Headers {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        headers.extend(iter);
        headers
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_an_error() {
        let headers = Headers::new();
        assert_eq!(
            headers.get("Key1"),
            Err(Error::MissingHeader("Key1".into()))
        );
        assert_eq!(headers.find("Key1"), None);
    }

    #[test]
    fn last_write_wins() {
        let mut headers = Headers::new();
        assert_eq!(headers.insert("Key1", "first"), None);
        assert_eq!(headers.insert("Key1", "second"), Some("first".into()));
        assert_eq!(headers.get("Key1"), Ok("second"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let headers: Headers = [("Key1", "Header1")].into_iter().collect();
        assert!(headers.contains("Key1"));
        assert!(!headers.contains("key1"));
        assert!(headers.get("KEY1").is_err());
    }
}
