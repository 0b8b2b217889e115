//! Indexes for efficient graph lookups.

use std::collections::{BTreeSet, HashMap};
use weft_core::{EdgeId, Value, VertexId};

/// Label index: label -> Set<VertexId>
#[derive(Debug, Default)]
pub struct LabelIndex {
    index: HashMap<String, BTreeSet<VertexId>>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &str, vertex: VertexId) {
        self.index.entry(label.to_string()).or_default().insert(vertex);
    }

    pub fn get(&self, label: &str) -> impl Iterator<Item = VertexId> + '_ {
        self.index
            .get(label)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

/// Simplified value for property indexing.
/// Only exact matches are indexed (floats, elements and composites are not).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexValue {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
}

impl IndexValue {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(IndexValue::Null),
            Value::Bool(b) => Some(IndexValue::Bool(*b)),
            Value::Int(i) => Some(IndexValue::Int(*i)),
            Value::String(s) => Some(IndexValue::String(s.clone())),
            _ => None,
        }
    }
}

/// Property index: (key, value) -> Set<VertexId>
#[derive(Debug, Default)]
pub struct PropertyIndex {
    exact: HashMap<(String, IndexValue), BTreeSet<VertexId>>,
}

impl PropertyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: &Value, vertex: VertexId) {
        if let Some(indexed) = IndexValue::from_value(value) {
            self.exact
                .entry((key.to_string(), indexed))
                .or_default()
                .insert(vertex);
        }
    }

    pub fn remove(&mut self, key: &str, value: &Value, vertex: VertexId) {
        if let Some(indexed) = IndexValue::from_value(value) {
            let entry = (key.to_string(), indexed);
            if let Some(set) = self.exact.get_mut(&entry) {
                set.remove(&vertex);
                if set.is_empty() {
                    self.exact.remove(&entry);
                }
            }
        }
    }

    /// Returns `None` when the value kind is not indexable.
    pub fn find_exact(&self, key: &str, value: &Value) -> Option<Vec<VertexId>> {
        let indexed = IndexValue::from_value(value)?;
        Some(
            self.exact
                .get(&(key.to_string(), indexed))
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default(),
        )
    }
}

/// Adjacency index: VertexId -> { outbound: [(label, EdgeId)], inbound: ... }
///
/// Entries keep insertion order, which is ascending edge id order.
#[derive(Debug, Default)]
pub struct AdjacencyIndex {
    outbound: HashMap<VertexId, Vec<(String, EdgeId)>>,
    inbound: HashMap<VertexId, Vec<(String, EdgeId)>>,
}

impl AdjacencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, edge: EdgeId, label: &str, out_v: VertexId, in_v: VertexId) {
        self.outbound
            .entry(out_v)
            .or_default()
            .push((label.to_string(), edge));
        self.inbound
            .entry(in_v)
            .or_default()
            .push((label.to_string(), edge));
    }

    /// Edges leaving a vertex, restricted to `labels` unless empty.
    pub fn edges_from<'a>(
        &'a self,
        vertex: VertexId,
        labels: &'a [String],
    ) -> impl Iterator<Item = EdgeId> + 'a {
        Self::filtered(self.outbound.get(&vertex), labels)
    }

    /// Edges arriving at a vertex, restricted to `labels` unless empty.
    pub fn edges_to<'a>(
        &'a self,
        vertex: VertexId,
        labels: &'a [String],
    ) -> impl Iterator<Item = EdgeId> + 'a {
        Self::filtered(self.inbound.get(&vertex), labels)
    }

    fn filtered<'a>(
        entries: Option<&'a Vec<(String, EdgeId)>>,
        labels: &'a [String],
    ) -> impl Iterator<Item = EdgeId> + 'a {
        entries
            .into_iter()
            .flat_map(|list| list.iter())
            .filter(move |(label, _)| labels.is_empty() || labels.iter().any(|l| l == label))
            .map(|(_, edge)| *edge)
    }
}
