//! Structured fields attached to a logger snapshot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

/// A value that can be attached to a log record.
///
/// Conversion to JSON is deferred until a record is written, so a value that
/// fails to serialize only affects the records that carry it.
pub trait FieldValue: Send + Sync {
    fn to_json(&self) -> serde_json::Result<Value>;
}

impl<T> FieldValue for T
where
    T: Serialize + Send + Sync,
{
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Key/value context carried by a [`Logger`](super::Logger).
///
/// Cloning is shallow: values are reference counted and shared between clones.
#[derive(Clone, Default)]
pub struct Fields {
    entries: HashMap<String, Arc<dyn FieldValue>>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl FieldValue + 'static) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl FieldValue + 'static) {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Copy every entry of `other` into `self`; `other` wins on collision.
    pub fn merge(&mut self, other: &Fields) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), Arc::clone(value));
        }
    }

    /// The JSON form of a single value, if present and serializable.
    pub fn get_json(&self, key: &str) -> Option<Value> {
        self.entries.get(key).and_then(|value| value.to_json().ok())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize every entry whose key is not listed in `skip`.
    ///
    /// Fails as a whole if any single value fails.
    pub fn to_json_map(&self, skip: &[&str]) -> serde_json::Result<Map<String, Value>> {
        let mut map = Map::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            if skip.contains(&key.as_str()) {
                continue;
            }
            map.insert(key.clone(), value.to_json()?);
        }
        Ok(map)
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Fields").field("keys", &keys).finish()
    }
}

/// Build a [`Fields`] map from `key => value` pairs.
///
/// ```
/// use blog_service::fields;
///
/// let fields = fields! { "request_id" => "abc", "attempt" => 2 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::logger::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::logger::Fields::new();
        $(fields.insert($key, $value);)+
        fields
    }};
}
