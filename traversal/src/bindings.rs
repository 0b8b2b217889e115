//! Label bindings carried by traversers.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use weft_core::Value;

/// An immutable label -> value map.
///
/// Bindings are shared between forked traversers; `bind` returns a new map
/// and never mutates one that another traverser may hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bindings {
    map: Arc<BTreeMap<String, Value>>,
}

impl Bindings {
    /// Create new empty bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding by label.
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.map.get(label)
    }

    /// Check if a label is bound.
    pub fn contains(&self, label: &str) -> bool {
        self.map.contains_key(label)
    }

    /// True if every label in `labels` is bound.
    pub fn contains_all<'a>(&self, labels: impl IntoIterator<Item = &'a String>) -> bool {
        labels.into_iter().all(|label| self.contains(label))
    }

    /// Copy with an additional (or replaced) binding.
    pub fn bind(&self, label: impl Into<String>, value: Value) -> Self {
        let mut map = (*self.map).clone();
        map.insert(label.into(), value);
        Self { map: Arc::new(map) }
    }

    /// Copy restricted to the given labels.
    pub fn retain(&self, labels: &BTreeSet<String>) -> Self {
        let map = self
            .map
            .iter()
            .filter(|(label, _)| labels.contains(*label))
            .map(|(label, value)| (label.clone(), value.clone()))
            .collect();
        Self { map: Arc::new(map) }
    }

    /// All bound labels.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|s| s.as_str())
    }

    /// Get the number of bindings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over bindings in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Snapshot as a plain map.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        (*self.map).clone()
    }
}

impl FromIterator<(String, Value)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            map: Arc::new(iter.into_iter().collect()),
        }
    }
}
