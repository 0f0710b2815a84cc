//! Structural cache keys for loaders whose keys are not plain scalars

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

/// A loader key identified by its canonical JSON serialization
///
/// Two keys are equal when they serialize to the same JSON document once
/// object members are sorted, so criteria built in a different field order
/// (or carrying floats and nested maps) still share one cache entry.
#[derive(Clone)]
pub struct JsonKey<T> {
    value: T,
    canonical: Arc<str>,
}

impl<T: Serialize> JsonKey<T> {
    /// Wrap `value`, computing its canonical form once
    pub fn new(value: T) -> serde_json::Result<Self> {
        let canonical = serde_json::to_string(&canonicalize(serde_json::to_value(&value)?))?;
        Ok(Self {
            value,
            canonical: canonical.into(),
        })
    }
}

impl<T> JsonKey<T> {
    /// The canonical JSON text this key is compared by
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The wrapped value
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for JsonKey<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> PartialEq for JsonKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl<T> Eq for JsonKey<T> {}

impl<T> Hash for JsonKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl<T> fmt::Debug for JsonKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JsonKey").field(&self.canonical).finish()
    }
}

/// Rebuild objects with their members in sorted order
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut members: Vec<_> = map.into_iter().collect();
            members.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = members
                .into_iter()
                .map(|(name, member)| (name, canonicalize(member)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
