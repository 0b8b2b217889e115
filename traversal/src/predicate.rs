//! Value predicates, element predicates and projections.

use crate::{Pipeline, TraversalError, TraversalResult};
use regex_lite::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use weft_core::{ElementId, GraphError, GraphResult, Value};
use weft_graph::Graph;

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Apply the operator. Incomparable values only satisfy `Neq`.
    pub fn test(&self, left: &Value, right: &Value) -> bool {
        let ord = left.compare(right);
        match self {
            CompareOp::Eq => ord == Some(Ordering::Equal),
            CompareOp::Neq => ord != Some(Ordering::Equal),
            CompareOp::Gt => ord == Some(Ordering::Greater),
            CompareOp::Gte => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
            CompareOp::Lt => ord == Some(Ordering::Less),
            CompareOp::Lte => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Neq => "neq",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled regular expression that remembers its source.
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    regex: Regex,
}

impl TextPattern {
    pub fn new(source: &str) -> TraversalResult<Self> {
        let regex = Regex::new(source)
            .map_err(|err| TraversalError::invalid_predicate(format!("regex '{}': {}", source, err)))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A predicate over a single value.
#[derive(Debug, Clone)]
pub enum P {
    Compare(CompareOp, Value),
    Within(Vec<Value>),
    Without(Vec<Value>),
    /// Lower bound inclusive, upper bound exclusive.
    Between(Value, Value),
    Regex(TextPattern),
    And(Box<P>, Box<P>),
    Or(Box<P>, Box<P>),
    Not(Box<P>),
}

impl P {
    pub fn eq(value: impl Into<Value>) -> Self {
        P::Compare(CompareOp::Eq, value.into())
    }

    pub fn neq(value: impl Into<Value>) -> Self {
        P::Compare(CompareOp::Neq, value.into())
    }

    pub fn gt(value: impl Into<Value>) -> Self {
        P::Compare(CompareOp::Gt, value.into())
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        P::Compare(CompareOp::Gte, value.into())
    }

    pub fn lt(value: impl Into<Value>) -> Self {
        P::Compare(CompareOp::Lt, value.into())
    }

    pub fn lte(value: impl Into<Value>) -> Self {
        P::Compare(CompareOp::Lte, value.into())
    }

    pub fn within<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        P::Within(values.into_iter().map(Into::into).collect())
    }

    pub fn without<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        P::Without(values.into_iter().map(Into::into).collect())
    }

    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        P::Between(low.into(), high.into())
    }

    pub fn regex(pattern: &str) -> TraversalResult<Self> {
        Ok(P::Regex(TextPattern::new(pattern)?))
    }

    pub fn and(self, other: P) -> Self {
        P::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: P) -> Self {
        P::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        P::Not(Box::new(self))
    }

    /// Test a value.
    pub fn test(&self, value: &Value) -> bool {
        match self {
            P::Compare(op, expected) => op.test(value, expected),
            P::Within(values) => values.iter().any(|v| CompareOp::Eq.test(value, v)),
            P::Without(values) => !values.iter().any(|v| CompareOp::Eq.test(value, v)),
            P::Between(low, high) => {
                CompareOp::Gte.test(value, low) && CompareOp::Lt.test(value, high)
            }
            P::Regex(pattern) => value.as_str().is_some_and(|s| pattern.is_match(s)),
            P::And(a, b) => a.test(value) && b.test(value),
            P::Or(a, b) => a.test(value) || b.test(value),
            P::Not(inner) => !inner.test(value),
        }
    }
}

impl fmt::Display for P {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            P::Compare(op, v) => write!(f, "{}({})", op, v),
            P::Within(vs) => write!(f, "within({})", join(vs)),
            P::Without(vs) => write!(f, "without({})", join(vs)),
            P::Between(lo, hi) => write!(f, "between({}, {})", lo, hi),
            P::Regex(p) => write!(f, "regex({})", p.source()),
            P::And(a, b) => write!(f, "and({}, {})", a, b),
            P::Or(a, b) => write!(f, "or({}, {})", a, b),
            P::Not(inner) => write!(f, "not({})", inner),
        }
    }
}

pub(crate) fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Signature of a caller-supplied element test.
pub type ElementTest = dyn Fn(&dyn Graph, ElementId) -> GraphResult<bool> + Send + Sync;

/// A predicate over a vertex or edge, evaluated through the graph.
#[derive(Clone)]
pub enum ElementPredicate {
    /// Admits everything.
    Any,
    HasLabel(Vec<String>),
    HasId(Vec<ElementId>),
    /// Property `key` is present and satisfies the predicate.
    Property { key: String, predicate: P },
    And(Vec<ElementPredicate>),
    Or(Vec<ElementPredicate>),
    Not(Box<ElementPredicate>),
    Custom { name: String, test: Arc<ElementTest> },
}

impl ElementPredicate {
    pub fn has_label<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        ElementPredicate::HasLabel(labels.into_iter().map(Into::into).collect())
    }

    pub fn has_id<I: Into<ElementId>>(ids: impl IntoIterator<Item = I>) -> Self {
        ElementPredicate::HasId(ids.into_iter().map(Into::into).collect())
    }

    pub fn property(key: impl Into<String>, predicate: P) -> Self {
        ElementPredicate::Property {
            key: key.into(),
            predicate,
        }
    }

    pub fn custom(
        name: impl Into<String>,
        test: impl Fn(&dyn Graph, ElementId) -> GraphResult<bool> + Send + Sync + 'static,
    ) -> Self {
        ElementPredicate::Custom {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    pub fn and(self, other: ElementPredicate) -> Self {
        ElementPredicate::And(vec![self, other])
    }

    pub fn or(self, other: ElementPredicate) -> Self {
        ElementPredicate::Or(vec![self, other])
    }

    pub fn negate(self) -> Self {
        ElementPredicate::Not(Box::new(self))
    }

    /// Test an element.
    pub fn test(&self, graph: &dyn Graph, element: ElementId) -> GraphResult<bool> {
        match self {
            ElementPredicate::Any => Ok(true),
            ElementPredicate::HasLabel(labels) => {
                let label = graph.label(element)?;
                Ok(labels.iter().any(|l| *l == label))
            }
            ElementPredicate::HasId(ids) => Ok(ids.contains(&element)),
            ElementPredicate::Property { key, predicate } => Ok(graph
                .property(element, key)?
                .is_some_and(|value| predicate.test(&value))),
            ElementPredicate::And(parts) => {
                for part in parts {
                    if !part.test(graph, element)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ElementPredicate::Or(parts) => {
                for part in parts {
                    if part.test(graph, element)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ElementPredicate::Not(inner) => Ok(!inner.test(graph, element)?),
            ElementPredicate::Custom { test, .. } => test(graph, element),
        }
    }

    /// Test a traverser value. Non-element values never match.
    pub fn test_value(&self, graph: &dyn Graph, value: &Value) -> GraphResult<bool> {
        match value.as_element() {
            Some(element) => self.test(graph, element),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for ElementPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for ElementPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementPredicate::Any => write!(f, "any"),
            ElementPredicate::HasLabel(labels) => write!(f, "hasLabel({})", labels.join(",")),
            ElementPredicate::HasId(ids) => write!(f, "hasId({})", join(ids)),
            ElementPredicate::Property { key, predicate } => write!(f, "has({}, {})", key, predicate),
            ElementPredicate::And(parts) => write!(f, "and({})", join(parts)),
            ElementPredicate::Or(parts) => write!(f, "or({})", join(parts)),
            ElementPredicate::Not(inner) => write!(f, "not({})", inner),
            ElementPredicate::Custom { name, .. } => write!(f, "{}", name),
        }
    }
}

/// Visibility rules for a subgraph: which vertices and edges exist.
///
/// An edge is visible only if it passes the edge predicate and both of its
/// endpoints are visible. Elements that do not exist are not visible.
#[derive(Debug, Clone)]
pub struct VisibilityFilter {
    pub vertices: ElementPredicate,
    pub edges: ElementPredicate,
}

impl VisibilityFilter {
    pub fn new(vertices: ElementPredicate, edges: ElementPredicate) -> Self {
        Self { vertices, edges }
    }

    pub fn vertex_visible(&self, graph: &dyn Graph, id: weft_core::VertexId) -> GraphResult<bool> {
        absent_as_hidden(self.vertices.test(graph, id.into()))
    }

    pub fn edge_visible(&self, graph: &dyn Graph, id: weft_core::EdgeId) -> GraphResult<bool> {
        let edge = match graph.edge(id) {
            Ok(edge) => edge,
            Err(err) if err.is_not_found() => return Ok(false),
            Err(err) => return Err(err),
        };
        Ok(absent_as_hidden(self.edges.test(graph, id.into()))?
            && self.vertex_visible(graph, edge.out_v)?
            && self.vertex_visible(graph, edge.in_v)?)
    }

    /// Non-element values are always admitted.
    pub fn admits(&self, graph: &dyn Graph, value: &Value) -> GraphResult<bool> {
        match value {
            Value::Vertex(id) => self.vertex_visible(graph, *id),
            Value::Edge(id) => self.edge_visible(graph, *id),
            _ => Ok(true),
        }
    }
}

impl fmt::Display for VisibilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vertices={}, edges={}", self.vertices, self.edges)
    }
}

fn absent_as_hidden(result: GraphResult<bool>) -> GraphResult<bool> {
    match result {
        Err(GraphError::VertexNotFound(_)) | Err(GraphError::EdgeNotFound(_)) => Ok(false),
        other => other,
    }
}

/// How a `select`/`dedup` modulator turns a value into a key.
#[derive(Debug, Clone)]
pub enum Projection {
    Identity,
    Id,
    Label,
    Property(String),
    /// First output of a sub-traversal started from the value.
    Traversal(Pipeline),
}

impl Projection {
    pub fn property(key: impl Into<String>) -> Self {
        Projection::Property(key.into())
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Identity => write!(f, "identity"),
            Projection::Id => write!(f, "id"),
            Projection::Label => write!(f, "label"),
            Projection::Property(key) => write!(f, "{}", key),
            Projection::Traversal(p) => write!(f, "[{}]", p),
        }
    }
}
