// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Call metadata and its mapping to transport headers
//!
//! Metadata is the key/value side channel travelling with every request and
//! response. On the wire each entry becomes one HTTP header named
//! `krpc-{key}`; headers outside that namespace are invisible to the
//! protocol.

use std::collections::HashMap;

/// Header namespace reserved for metadata entries.
pub const METADATA_PREFIX: &str = "krpc-";

/// Key/value pairs transmitted alongside a request or response.
///
/// A `Metadata` value is created per call and treated as immutable: handlers
/// and interceptors produce new values with [`Metadata::with`] or
/// [`Metadata::merged_with`] instead of mutating in place. Equality is by
/// content; insertion order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    values: HashMap<String, String>,
}

impl Metadata {
    /// Create an empty metadata value
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return a copy with `key` set to `value`
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = self.values.clone();
        values.insert(key.into(), value.into());
        Self { values }
    }

    /// Return a copy with every entry of `other` added, overwriting
    /// colliding keys
    pub fn merged_with(&self, other: &Metadata) -> Self {
        let mut values = self.values.clone();
        for (key, value) in other.iter() {
            values.insert(key.to_owned(), value.to_owned());
        }
        Self { values }
    }

    /// Emit one `krpc-{key}` header per entry
    pub fn to_http_headers(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .map(|(key, value)| (format!("{}{}", METADATA_PREFIX, key), value.clone()))
            .collect()
    }

    /// Build metadata from transport headers, keeping only the `krpc-`
    /// namespace and stripping the prefix. Foreign headers are ignored.
    pub fn from_http_headers(headers: &HashMap<String, String>) -> Self {
        headers
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix(METADATA_PREFIX)
                    .map(|key| (key.to_owned(), value.clone()))
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
