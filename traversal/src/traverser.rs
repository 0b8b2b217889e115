//! Traversers and bulk-merging traverser sets.

use crate::Bindings;
use std::collections::HashMap;
use weft_core::Value;

/// A unit of flow through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Traverser {
    /// Current value.
    pub value: Value,
    /// Labels bound on the way here.
    pub bindings: Bindings,
    /// How many identical traversers this one stands for.
    pub bulk: u64,
    /// Loop counter for `repeat`.
    pub loops: u32,
}

impl Traverser {
    /// A fresh traverser with no bindings and bulk 1.
    pub fn new(value: impl Into<Value>) -> Self {
        Self::with_bindings(value.into(), Bindings::new())
    }

    /// A traverser with the given bindings and bulk 1.
    pub fn with_bindings(value: Value, bindings: Bindings) -> Self {
        Self {
            value,
            bindings,
            bulk: 1,
            loops: 0,
        }
    }

    /// Fork with a new value, keeping bindings, bulk and loops.
    pub fn split(&self, value: Value) -> Self {
        Self {
            value,
            bindings: self.bindings.clone(),
            bulk: self.bulk,
            loops: self.loops,
        }
    }

    /// Bind `label` to the current value.
    pub fn bind_current(mut self, label: &str) -> Self {
        self.bindings = self.bindings.bind(label, self.value.clone());
        self
    }

    /// Replace the bulk.
    pub fn with_bulk(mut self, bulk: u64) -> Self {
        self.bulk = bulk;
        self
    }

    fn merge_key(&self) -> (Value, Bindings, u32) {
        (self.value.clone(), self.bindings.clone(), self.loops)
    }
}

/// An insertion-ordered collection of traversers.
///
/// Adding a traverser equal in value, bindings and loops to one already held
/// sums the bulks instead of storing a second entry.
#[derive(Debug, Clone, Default)]
pub struct TraverserSet {
    traversers: Vec<Traverser>,
    index: HashMap<(Value, Bindings, u32), usize>,
}

impl TraverserSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, traverser: Traverser) {
        let key = traverser.merge_key();
        match self.index.get(&key) {
            Some(&slot) => self.traversers[slot].bulk += traverser.bulk,
            None => {
                self.index.insert(key, self.traversers.len());
                self.traversers.push(traverser);
            }
        }
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.traversers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traversers.is_empty()
    }

    /// Sum of all bulks.
    pub fn total_bulk(&self) -> u64 {
        self.traversers.iter().map(|t| t.bulk).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Traverser> {
        self.traversers.iter()
    }
}

impl IntoIterator for TraverserSet {
    type Item = Traverser;
    type IntoIter = std::vec::IntoIter<Traverser>;

    fn into_iter(self) -> Self::IntoIter {
        self.traversers.into_iter()
    }
}

impl FromIterator<Traverser> for TraverserSet {
    fn from_iter<T: IntoIterator<Item = Traverser>>(iter: T) -> Self {
        let mut set = TraverserSet::new();
        for traverser in iter {
            set.add(traverser);
        }
        set
    }
}
