//! Step execution.
//!
//! This module contains the per-traverser logic for every step that does not
//! keep state across traversers. Stateful steps (dedup, limit, count, barrier,
//! match) are driven by the executor.

use crate::{
    Bindings, ElementPredicate, Pipeline, Projection, Step, TraversalError, TraversalIter,
    TraversalResult, Traverser, WhereFilter,
};
use tracing::debug;
use weft_core::{Direction, ElementId, Value};
use weft_graph::Graph;

/// Step executor context.
#[derive(Clone, Copy)]
pub(crate) struct OperatorContext<'g> {
    pub graph: &'g dyn Graph,
}

impl<'g> OperatorContext<'g> {
    /// Create a new operator context.
    pub fn new(graph: &'g dyn Graph) -> Self {
        Self { graph }
    }

    /// Execute a stateless step against one traverser.
    pub fn execute_step(&self, step: &Step, traverser: Traverser) -> TraversalResult<Vec<Traverser>> {
        match step {
            Step::Vertices(ids) => self.execute_vertices(ids, &traverser),
            Step::Edges(ids) => self.execute_edges(ids, &traverser),
            Step::Inject(values) => Ok(values.iter().map(|v| traverser.split(v.clone())).collect()),

            Step::Adjacent { direction, labels } => {
                self.execute_adjacent(*direction, labels, &traverser, false)
            }
            Step::Incident { direction, labels } => {
                self.execute_adjacent(*direction, labels, &traverser, true)
            }
            Step::EdgeVertex(direction) => self.execute_edge_vertex(*direction, &traverser),
            Step::Values(keys) => self.execute_values(keys, &traverser),

            Step::Id => {
                let element = element_of(&traverser.value, "id()")?;
                let raw = match element {
                    ElementId::Vertex(v) => v.raw(),
                    ElementId::Edge(e) => e.raw(),
                };
                Ok(vec![traverser.split(Value::from(raw))])
            }
            Step::Label => {
                let element = element_of(&traverser.value, "label()")?;
                let label = self.graph.label(element)?;
                Ok(vec![traverser.split(Value::String(label))])
            }
            Step::Select { labels, by } => self.execute_select(labels, by, traverser),
            Step::Constant(value) => Ok(vec![traverser.split(value.clone())]),
            Step::Identity => Ok(vec![traverser]),

            Step::Has(predicate) => self.keep_if(self.execute_has(predicate, &traverser)?, traverser),
            Step::Is(predicate) => {
                let passes = predicate.test(&traverser.value);
                self.keep_if(passes, traverser)
            }
            Step::Where(filter) => {
                let passes = self.execute_where(filter, &traverser)?;
                self.keep_if(passes, traverser)
            }
            Step::Not(body) => {
                let passes = !self.exists(body, &traverser.value, &traverser.bindings)?;
                self.keep_if(passes, traverser)
            }
            Step::And(bodies) => {
                let mut passes = true;
                for body in bodies {
                    if !self.exists(body, &traverser.value, &traverser.bindings)? {
                        passes = false;
                        break;
                    }
                }
                self.keep_if(passes, traverser)
            }
            Step::Or(bodies) => {
                let mut passes = false;
                for body in bodies {
                    if self.exists(body, &traverser.value, &traverser.bindings)? {
                        passes = true;
                        break;
                    }
                }
                self.keep_if(passes, traverser)
            }
            Step::SubgraphFilter(filter) => {
                let passes = filter.admits(self.graph, &traverser.value)?;
                self.keep_if(passes, traverser)
            }

            Step::Repeat { body, times } => self.execute_repeat(body, *times, traverser),

            Step::Dedup { .. } | Step::Limit(_) | Step::Count | Step::Barrier | Step::Match(_) => {
                Err(TraversalError::type_error(format!(
                    "{} keeps state and cannot run per traverser",
                    step
                )))
            }
        }
    }

    fn keep_if(&self, passes: bool, traverser: Traverser) -> TraversalResult<Vec<Traverser>> {
        Ok(if passes { vec![traverser] } else { Vec::new() })
    }

    fn execute_vertices(
        &self,
        ids: &[weft_core::VertexId],
        traverser: &Traverser,
    ) -> TraversalResult<Vec<Traverser>> {
        if ids.is_empty() {
            return Ok(self
                .graph
                .vertex_ids()
                .map(|id| traverser.split(Value::Vertex(id)))
                .collect());
        }

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            match self.graph.vertex(*id) {
                Ok(vertex) => results.push(traverser.split(Value::Vertex(vertex.id))),
                Err(err) if err.is_not_found() => debug!(id = %id, "V() skipping missing vertex"),
                Err(err) => return Err(err.into()),
            }
        }
        Ok(results)
    }

    fn execute_edges(
        &self,
        ids: &[weft_core::EdgeId],
        traverser: &Traverser,
    ) -> TraversalResult<Vec<Traverser>> {
        if ids.is_empty() {
            return Ok(self
                .graph
                .edge_ids()
                .map(|id| traverser.split(Value::Edge(id)))
                .collect());
        }

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            match self.graph.edge(*id) {
                Ok(edge) => results.push(traverser.split(Value::Edge(edge.id))),
                Err(err) if err.is_not_found() => debug!(id = %id, "E() skipping missing edge"),
                Err(err) => return Err(err.into()),
            }
        }
        Ok(results)
    }

    fn execute_adjacent(
        &self,
        direction: Direction,
        labels: &[String],
        traverser: &Traverser,
        edges: bool,
    ) -> TraversalResult<Vec<Traverser>> {
        let vertex = traverser.value.as_vertex().ok_or_else(|| {
            TraversalError::type_error(format!(
                "navigation expects a vertex, got {}",
                traverser.value.type_name()
            ))
        })?;

        Ok(self
            .graph
            .adjacent(vertex, direction, labels)?
            .map(|adjacency| {
                let value = if edges {
                    Value::Edge(adjacency.edge.id)
                } else {
                    Value::Vertex(adjacency.vertex)
                };
                traverser.split(value)
            })
            .collect())
    }

    fn execute_edge_vertex(
        &self,
        direction: Direction,
        traverser: &Traverser,
    ) -> TraversalResult<Vec<Traverser>> {
        let id = traverser.value.as_edge().ok_or_else(|| {
            TraversalError::type_error(format!(
                "edge endpoint step expects an edge, got {}",
                traverser.value.type_name()
            ))
        })?;
        let edge = self.graph.edge(id)?;
        Ok(edge
            .vertices(direction)
            .into_iter()
            .map(|v| traverser.split(Value::Vertex(v)))
            .collect())
    }

    fn execute_values(&self, keys: &[String], traverser: &Traverser) -> TraversalResult<Vec<Traverser>> {
        let element = element_of(&traverser.value, "values()")?;
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.graph.property(element, key)? {
                results.push(traverser.split(value));
            }
        }
        Ok(results)
    }

    fn execute_select(
        &self,
        labels: &[String],
        by: &[Projection],
        traverser: Traverser,
    ) -> TraversalResult<Vec<Traverser>> {
        let mut selected = Vec::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            let Some(bound) = traverser.bindings.get(label) else {
                return Ok(Vec::new());
            };
            let projected = if by.is_empty() {
                Some(bound.clone())
            } else {
                self.project(&by[i % by.len()], bound, &traverser.bindings)?
            };
            match projected {
                Some(value) => selected.push((label.clone(), value)),
                None => return Ok(Vec::new()),
            }
        }

        let value = if selected.len() == 1 {
            selected.remove(0).1
        } else {
            Value::Map(selected.into_iter().collect())
        };
        Ok(vec![traverser.split(value)])
    }

    fn execute_has(&self, predicate: &ElementPredicate, traverser: &Traverser) -> TraversalResult<bool> {
        Ok(predicate.test_value(self.graph, &traverser.value)?)
    }

    fn execute_where(&self, filter: &WhereFilter, traverser: &Traverser) -> TraversalResult<bool> {
        let bindings = &traverser.bindings;
        match filter {
            WhereFilter::Traversal { start, body, end } => {
                let Some(seed) = resolve(start.as_deref(), traverser) else {
                    return Ok(false);
                };
                let expected = match end {
                    Some(end) => match bindings.get(end) {
                        Some(value) => Some(value),
                        None => return Ok(false),
                    },
                    None => None,
                };
                let start = Traverser::with_bindings(seed.clone(), bindings.clone());
                for output in TraversalIter::with_starts(body, self.graph, vec![start])? {
                    let output = output?;
                    if expected.map_or(true, |value| *value == output.value) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            WhereFilter::Compare { start, op, other } => {
                let (Some(left), Some(right)) = (resolve(start.as_deref(), traverser), bindings.get(other))
                else {
                    return Ok(false);
                };
                Ok(op.test(left, right))
            }
        }
    }

    fn execute_repeat(&self, body: &Pipeline, times: u32, traverser: Traverser) -> TraversalResult<Vec<Traverser>> {
        let mut current = vec![traverser];
        for _ in 0..times {
            let mut next = Vec::new();
            for output in TraversalIter::with_starts(body, self.graph, current)? {
                let mut output = output?;
                output.loops += 1;
                next.push(output);
            }
            if next.is_empty() {
                return Ok(next);
            }
            current = next;
        }
        for traverser in &mut current {
            traverser.loops = 0;
        }
        Ok(current)
    }

    /// True if `body` started from `value` yields anything.
    pub fn exists(&self, body: &Pipeline, value: &Value, bindings: &Bindings) -> TraversalResult<bool> {
        let start = Traverser::with_bindings(value.clone(), bindings.clone());
        match TraversalIter::with_starts(body, self.graph, vec![start])?.next() {
            Some(Ok(_)) => Ok(true),
            Some(Err(err)) => Err(err),
            None => Ok(false),
        }
    }

    /// Apply a `by` modulator. `None` means the value has no key and is dropped.
    pub fn project(
        &self,
        projection: &Projection,
        value: &Value,
        bindings: &Bindings,
    ) -> TraversalResult<Option<Value>> {
        match projection {
            Projection::Identity => Ok(Some(value.clone())),
            Projection::Id => {
                let element = element_of(value, "by(id)")?;
                Ok(Some(match element {
                    ElementId::Vertex(v) => Value::from(v.raw()),
                    ElementId::Edge(e) => Value::from(e.raw()),
                }))
            }
            Projection::Label => {
                let element = element_of(value, "by(label)")?;
                Ok(Some(Value::String(self.graph.label(element)?)))
            }
            Projection::Property(key) => {
                let element = element_of(value, "by(property)")?;
                Ok(self.graph.property(element, key)?)
            }
            Projection::Traversal(body) => {
                let start = Traverser::with_bindings(value.clone(), bindings.clone());
                match TraversalIter::with_starts(body, self.graph, vec![start])?.next() {
                    Some(output) => Ok(Some(output?.value)),
                    None => Ok(None),
                }
            }
        }
    }

    /// Key under which `dedup` compares a traverser.
    pub fn dedup_key(
        &self,
        labels: &[String],
        by: Option<&Projection>,
        traverser: &Traverser,
    ) -> TraversalResult<Option<Value>> {
        let projection = by.unwrap_or(&Projection::Identity);
        if labels.is_empty() {
            return self.project(projection, &traverser.value, &traverser.bindings);
        }

        let mut key = Vec::with_capacity(labels.len());
        for label in labels {
            let Some(bound) = traverser.bindings.get(label) else {
                return Ok(None);
            };
            match self.project(projection, bound, &traverser.bindings)? {
                Some(value) => key.push(value),
                None => return Ok(None),
            }
        }
        Ok(Some(Value::List(key)))
    }
}

fn element_of(value: &Value, step: &str) -> TraversalResult<ElementId> {
    value.as_element().ok_or_else(|| {
        TraversalError::type_error(format!("{} expects an element, got {}", step, value.type_name()))
    })
}

/// The binding of `label`, or the current value when no label is given.
fn resolve<'t>(label: Option<&str>, traverser: &'t Traverser) -> Option<&'t Value> {
    match label {
        Some(label) => traverser.bindings.get(label),
        None => Some(&traverser.value),
    }
}
