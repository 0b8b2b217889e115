//! The step arena.
//!
//! Steps live in a vector of slots and link to each other by index, so
//! rewrites never invalidate references held elsewhere. A removed step's slot
//! is left empty and its id is never reused.

use crate::{Step, TraversalError, TraversalResult};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identity of a step within its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(usize);

impl StepId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct StepNode {
    step: Step,
    labels: BTreeSet<String>,
    prev: Option<StepId>,
    next: Option<StepId>,
}

/// An ordered, doubly linked sequence of steps.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    nodes: Vec<Option<StepNode>>,
    head: Option<StepId>,
    tail: Option<StepId>,
    len: usize,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Steps in evaluation order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.iter().map(|(step, _)| step)
    }

    /// Steps with their labels, in evaluation order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            pipeline: self,
            cursor: self.head,
        }
    }

    /// Step ids in evaluation order.
    pub fn step_ids(&self) -> Vec<StepId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.node(id).and_then(|n| n.next);
        }
        ids
    }

    /// Current position of a step, if it is still in the pipeline.
    pub fn position_of(&self, id: StepId) -> Option<usize> {
        self.step_ids().iter().position(|candidate| *candidate == id)
    }

    pub fn step_at(&self, position: usize) -> Option<&Step> {
        let id = self.id_at(position)?;
        self.node(id).map(|n| &n.step)
    }

    pub fn step_at_mut(&mut self, position: usize) -> Option<&mut Step> {
        let id = self.id_at(position)?;
        self.node_mut(id).map(|n| &mut n.step)
    }

    pub fn first(&self) -> Option<&Step> {
        self.head.and_then(|id| self.node(id)).map(|n| &n.step)
    }

    pub fn last(&self) -> Option<&Step> {
        self.tail.and_then(|id| self.node(id)).map(|n| &n.step)
    }

    pub fn last_mut(&mut self) -> Option<&mut Step> {
        let id = self.tail?;
        self.node_mut(id).map(|n| &mut n.step)
    }

    /// Labels attached to the step at `position`.
    pub fn labels_at(&self, position: usize) -> Option<&BTreeSet<String>> {
        let id = self.id_at(position)?;
        self.node(id).map(|n| &n.labels)
    }

    pub fn add_label(&mut self, position: usize, label: impl Into<String>) -> TraversalResult<()> {
        let len = self.len;
        let id = self
            .id_at(position)
            .ok_or(TraversalError::position(position, len))?;
        if let Some(node) = self.node_mut(id) {
            node.labels.insert(label.into());
        }
        Ok(())
    }

    /// Attach a label to the last step. Returns false on an empty pipeline.
    pub fn label_last(&mut self, label: impl Into<String>) -> bool {
        let Some(id) = self.tail else {
            return false;
        };
        match self.node_mut(id) {
            Some(node) => {
                node.labels.insert(label.into());
                true
            }
            None => false,
        }
    }

    /// Append a step.
    pub fn push(&mut self, step: Step) -> StepId {
        let id = StepId(self.nodes.len());
        self.nodes.push(Some(StepNode {
            step,
            labels: BTreeSet::new(),
            prev: self.tail,
            next: None,
        }));
        let tail = self.tail;
        match tail.and_then(|t| self.node_mut(t)) {
            Some(node) => node.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Insert a step so that it ends up at `position` (0..=len).
    pub fn insert(&mut self, position: usize, step: Step) -> TraversalResult<StepId> {
        if position > self.len {
            return Err(TraversalError::position(position, self.len));
        }
        if position == self.len {
            return Ok(self.push(step));
        }
        let next = self
            .id_at(position)
            .ok_or(TraversalError::position(position, self.len))?;
        let prev = self.node(next).and_then(|n| n.prev);

        let id = StepId(self.nodes.len());
        self.nodes.push(Some(StepNode {
            step,
            labels: BTreeSet::new(),
            prev,
            next: Some(next),
        }));
        if let Some(node) = self.node_mut(next) {
            node.prev = Some(id);
        }
        match prev.and_then(|p| self.node_mut(p)) {
            Some(node) => node.next = Some(id),
            None => self.head = Some(id),
        }
        self.len += 1;
        Ok(id)
    }

    /// Remove the step at `position`, returning it with its labels.
    pub fn remove(&mut self, position: usize) -> TraversalResult<(Step, BTreeSet<String>)> {
        let len = self.len;
        let id = self
            .id_at(position)
            .ok_or(TraversalError::position(position, len))?;
        let node = self
            .nodes
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(TraversalError::position(position, len))?;

        match node.prev.and_then(|p| self.node_mut(p)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.node_mut(n)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }
        self.len -= 1;
        Ok((node.step, node.labels))
    }

    /// Swap in a new step at `position`, keeping its labels.
    pub fn replace(&mut self, position: usize, step: Step) -> TraversalResult<Step> {
        let len = self.len;
        let slot = self
            .step_at_mut(position)
            .ok_or(TraversalError::position(position, len))?;
        Ok(std::mem::replace(slot, step))
    }

    /// Labels a traverser is guaranteed to carry when it reaches `position`.
    pub fn labels_before(&self, position: usize) -> BTreeSet<String> {
        self.scope_at(&BTreeSet::new(), position)
    }

    /// Like [`Pipeline::labels_before`], for traversers that enter the
    /// pipeline already carrying `upstream`.
    ///
    /// `count` starts fresh traversers, so it clears everything before it;
    /// `match` adds its pattern labels (or keeps only its retained set).
    pub fn scope_at(&self, upstream: &BTreeSet<String>, position: usize) -> BTreeSet<String> {
        let mut bound = upstream.clone();
        for (step, labels) in self.iter().take(position) {
            match step {
                Step::Count => bound.clear(),
                Step::Match(m) => {
                    bound.extend(m.output_labels());
                    if let Some(retained) = m.retained() {
                        bound.retain(|label| retained.contains(label));
                    }
                }
                _ => {}
            }
            bound.extend(labels.iter().cloned());
        }
        bound
    }

    /// True if the first step is a source.
    pub fn is_rooted(&self) -> bool {
        self.first()
            .is_some_and(|step| step.kind() == crate::StepKind::Source)
    }

    /// Validate every match step against the labels bound upstream of it,
    /// including inside nested pipelines.
    pub fn validate(&self, upstream: &BTreeSet<String>) -> TraversalResult<()> {
        for (position, (step, _)) in self.iter().enumerate() {
            let mut scope = self.scope_at(upstream, position);
            if let Step::Match(m) = step {
                m.plan(&scope)?;
                scope.extend(m.output_labels());
            }
            for child in step.children() {
                child.validate(&scope)?;
            }
        }
        Ok(())
    }

    fn id_at(&self, position: usize) -> Option<StepId> {
        if position >= self.len {
            return None;
        }
        let mut cursor = self.head;
        for _ in 0..position {
            cursor = cursor.and_then(|id| self.node(id)).and_then(|n| n.next);
        }
        cursor
    }

    fn node(&self, id: StepId) -> Option<&StepNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: StepId) -> Option<&mut StepNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }
}

/// Iterator over `(step, labels)` pairs.
pub struct Iter<'a> {
    pipeline: &'a Pipeline,
    cursor: Option<StepId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Step, &'a BTreeSet<String>);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pipeline.node(self.cursor?)?;
        self.cursor = node.next;
        Some((&node.step, &node.labels))
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (step, labels)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", step)?;
            if !labels.is_empty() {
                let labels: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
                write!(f, "@[{}]", labels.join(","))?;
            }
        }
        Ok(())
    }
}
